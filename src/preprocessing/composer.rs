//! Composition of the numeric and categorical stages into one design matrix

use crate::error::{PipelineError, Result};
use crate::feature_engineering::{PolynomialExpansion, PolynomialState};
use super::{
    categorical::{CategoricalStage, CategoricalState},
    numeric::{NumericStage, NumericState},
    ColumnPartition, ColumnStage,
};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fitted state of every composed stage, plus the output column layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedState {
    pub numeric: NumericState,
    pub categorical: CategoricalState,
    pub polynomial: Option<PolynomialState>,
    feature_names: Vec<String>,
}

impl ComposedState {
    /// Output column names in matrix order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Width of the block derived from numeric columns
    pub fn numeric_width(&self) -> usize {
        match &self.polynomial {
            Some(poly) => poly.n_features_out(),
            None => self.numeric.columns.len(),
        }
    }
}

/// Numeric stage, then optional polynomial expansion of its output, then the
/// categorical stage; the blocks are concatenated column-wise in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureComposer {
    numeric: NumericStage,
    categorical: CategoricalStage,
    polynomial: Option<PolynomialExpansion>,
}

impl Default for FeatureComposer {
    fn default() -> Self {
        Self::new(CategoricalStage::default())
    }
}

impl FeatureComposer {
    pub fn new(categorical: CategoricalStage) -> Self {
        Self {
            numeric: NumericStage::new(),
            categorical,
            polynomial: None,
        }
    }

    /// Expand the numeric block with all monomials up to `degree`
    pub fn with_polynomial(mut self, degree: u32) -> Result<Self> {
        self.polynomial = Some(PolynomialExpansion::new(degree)?);
        Ok(self)
    }

    pub fn polynomial(&self) -> Option<&PolynomialExpansion> {
        self.polynomial.as_ref()
    }

    /// Fit every stage on the training table
    pub fn fit(&self, df: &DataFrame, partition: &ColumnPartition) -> Result<ComposedState> {
        let numeric = self.numeric.fit(df, &partition.numeric())?;
        let categorical = self.categorical.fit(df, &partition.categorical())?;

        let numeric_names = self.numeric.output_names(&numeric);
        let polynomial = self.polynomial.as_ref().map(|p| p.fit(&numeric_names));

        let mut feature_names = match &polynomial {
            Some(poly) => poly.feature_names.clone(),
            None => numeric_names,
        };
        feature_names.extend(self.categorical.output_names(&categorical));

        debug!(
            n_numeric = numeric.columns.len(),
            n_categorical = categorical.columns.len(),
            n_features = feature_names.len(),
            "Fitted feature composer"
        );

        Ok(ComposedState {
            numeric,
            categorical,
            polynomial,
            feature_names,
        })
    }

    /// Apply the fitted stages, in fit order, to any table
    pub fn apply(&self, state: &ComposedState, df: &DataFrame) -> Result<Array2<f64>> {
        let mut numeric_block = self.numeric.apply(&state.numeric, df)?;

        match (&self.polynomial, &state.polynomial) {
            (Some(expansion), Some(poly_state)) => {
                numeric_block = expansion.apply(poly_state, numeric_block.view())?;
            }
            (None, None) => {}
            _ => {
                return Err(PipelineError::ConfigError(
                    "polynomial stage does not match its fitted state".to_string(),
                ))
            }
        }

        let categorical_block = self.categorical.apply(&state.categorical, df)?;
        let matrix = concatenate(Axis(1), &[numeric_block.view(), categorical_block.view()])?;

        if matrix.ncols() != state.n_features() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", state.n_features()),
                actual: format!("{} features", matrix.ncols()),
            });
        }
        Ok(matrix)
    }

    /// Fit on a table and transform it in one step
    pub fn fit_apply(
        &self,
        df: &DataFrame,
        partition: &ColumnPartition,
    ) -> Result<(ComposedState, Array2<f64>)> {
        let state = self.fit(df, partition)?;
        let matrix = self.apply(&state, df)?;
        Ok((state, matrix))
    }
}
