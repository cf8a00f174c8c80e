//! Training engine: split, fit, predict and evaluate

use crate::error::{PipelineError, Result};
use crate::export::MetricsRecord;
use crate::preprocessing::{
    classify_columns, CategoricalStage, ColumnPartition, ComposedState, FeatureComposer,
};
use super::config::TrainingConfig;
use super::linear_models::LinearRegression;
use super::metrics::{evaluate, RegressionMetrics};
use super::split::train_test_split;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Fitted transform state and regression coefficients as one unit.
///
/// Immutable once produced by [`TrainEngine::fit`]; maps any raw table that
/// carries the fitted feature columns to one prediction per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    target_column: String,
    id_column: Option<String>,
    partition: ColumnPartition,
    composer: FeatureComposer,
    state: ComposedState,
    model: LinearRegression,
}

impl FittedPipeline {
    /// Predict the target for every row of `df`.
    ///
    /// Target, identifier and any extra columns are ignored; a missing fitted
    /// feature column is an error.
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.composer.apply(&self.state, df)?;
        self.model.predict(&x)
    }

    pub fn partition(&self) -> &ColumnPartition {
        &self.partition
    }

    /// Composed feature names, aligned with [`coefficients`](Self::coefficients)
    pub fn feature_names(&self) -> &[String] {
        self.state.feature_names()
    }

    pub fn transform_state(&self) -> &ComposedState {
        &self.state
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        self.model.coefficients()
    }

    pub fn intercept(&self) -> f64 {
        self.model.intercept()
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn id_column(&self) -> Option<&str> {
        self.id_column.as_deref()
    }

    pub fn polynomial_degree(&self) -> Option<u32> {
        self.composer.polynomial().map(|p| p.degree())
    }
}

/// Outcome of a full split → fit → evaluate run
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub pipeline: FittedPipeline,
    pub metrics: MetricsRecord,
    pub evaluation: RegressionMetrics,
    pub n_train: usize,
    pub n_test: usize,
    pub training_time_secs: f64,
}

/// Orchestrates the split, preprocessing fit and regression fit
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fit the full pipeline on a training table
    pub fn fit(&self, train: &DataFrame) -> Result<FittedPipeline> {
        let target = &self.config.target_column;
        if train.column(target).is_err() {
            return Err(PipelineError::MissingColumn(target.clone()));
        }
        if train.height() == 0 {
            return Err(PipelineError::DegenerateFit(
                "training split has zero rows".to_string(),
            ));
        }

        let y = self.extract_target(train)?;
        let features = self.feature_frame(train)?;
        let partition = classify_columns(&features)?;
        debug!(
            numeric = ?partition.numeric(),
            categorical = ?partition.categorical(),
            "Classified feature columns"
        );

        let mut composer =
            FeatureComposer::new(CategoricalStage::new(self.config.categorical_fill_value.clone()));
        if let Some(degree) = self.config.polynomial_degree {
            composer = composer.with_polynomial(degree)?;
        }

        let (state, x) = composer.fit_apply(&features, &partition)?;
        let model = LinearRegression::fit(&x, &y)?;

        info!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            "Fitted linear regression"
        );

        Ok(FittedPipeline {
            target_column: target.clone(),
            id_column: self.config.id_column.clone(),
            partition,
            composer,
            state,
            model,
        })
    }

    /// Split, fit on the training rows and evaluate on the held-out rows
    pub fn run(&self, df: &DataFrame) -> Result<TrainingRun> {
        let start = Instant::now();

        if df.column(&self.config.target_column).is_err() {
            return Err(PipelineError::MissingColumn(self.config.target_column.clone()));
        }

        let split = train_test_split(df, self.config.test_size, self.config.random_state)?;
        info!(
            n_train = split.train.height(),
            n_test = split.test.height(),
            seed = self.config.random_state,
            "Split dataset"
        );

        let pipeline = self.fit(&split.train)?;

        let y_test = self.extract_target(&split.test)?.to_vec();
        let y_pred = pipeline.predict(&split.test)?.to_vec();
        let evaluation = evaluate(&y_test, &y_pred)?;

        let metrics = MetricsRecord {
            dataset_size: split.train.height(),
            rmse: evaluation.rmse,
            r2_score: evaluation.r2,
        };
        info!(rmse = metrics.rmse, r2 = metrics.r2_score, "Evaluated on held-out rows");

        Ok(TrainingRun {
            pipeline,
            metrics,
            evaluation,
            n_train: split.train.height(),
            n_test: split.test.height(),
            training_time_secs: start.elapsed().as_secs_f64(),
        })
    }

    /// Drop target and identifier columns
    fn feature_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        let excluded = [Some(self.config.target_column.as_str()), self.config.id_column.as_deref()];
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| !excluded.contains(&Some(name.as_str())))
            .collect();
        Ok(df.select(names)?)
    }

    fn extract_target(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let target = &self.config.target_column;
        let column = df
            .column(target)
            .map_err(|_| PipelineError::MissingColumn(target.clone()))?;
        let casted = column.cast(&DataType::Float64)?;

        casted
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| {
                v.filter(|x| x.is_finite()).ok_or_else(|| {
                    PipelineError::DegenerateFit(format!(
                        "target column '{}' contains missing values",
                        target
                    ))
                })
            })
            .collect()
    }
}
