//! Numeric stage: mean imputation followed by min-max scaling

use crate::error::{PipelineError, Result};
use super::{columns_to_array2, numeric_values, ColumnStage};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fitted parameters for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnState {
    pub name: String,
    /// Fill value for missing entries
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericColumnState {
    /// Impute then rescale a single value
    pub fn transform_value(&self, value: Option<f64>) -> f64 {
        let v = value.unwrap_or(self.mean);
        let range = self.max - self.min;
        if range == 0.0 {
            0.0
        } else {
            (v - self.min) / range
        }
    }
}

/// Fitted state of the numeric stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericState {
    pub columns: Vec<NumericColumnState>,
}

/// Mean imputer + min-max scaler over the numeric columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericStage;

impl NumericStage {
    pub fn new() -> Self {
        Self
    }

    fn fit_column(df: &DataFrame, name: &str) -> Result<NumericColumnState> {
        let observed: Vec<f64> = numeric_values(df, name)?.into_iter().flatten().collect();

        if observed.is_empty() {
            return Err(PipelineError::DegenerateFit(format!(
                "numeric column '{}' has no non-missing training values",
                name
            )));
        }

        let mean = observed.iter().sum::<f64>() / observed.len() as f64;
        let min = observed.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = observed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Ok(NumericColumnState {
            name: name.to_string(),
            mean,
            min,
            max,
        })
    }
}

impl ColumnStage for NumericStage {
    type State = NumericState;

    fn fit(&self, df: &DataFrame, columns: &[String]) -> Result<NumericState> {
        let columns = columns
            .iter()
            .map(|name| Self::fit_column(df, name))
            .collect::<Result<Vec<_>>>()?;

        debug!(n_columns = columns.len(), "Fitted numeric stage");
        Ok(NumericState { columns })
    }

    fn apply(&self, state: &NumericState, df: &DataFrame) -> Result<Array2<f64>> {
        let scaled: Vec<Vec<f64>> = state
            .columns
            .iter()
            .map(|col| {
                let values = numeric_values(df, &col.name)?;
                Ok(values.into_iter().map(|v| col.transform_value(v)).collect())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(columns_to_array2(df.height(), &scaled))
    }

    fn output_names(&self, state: &NumericState) -> Vec<String> {
        state.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mean_ignores_missing() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), &[Some(1.0), None, Some(3.0), Some(4.0)]),
        ])
        .unwrap();

        let state = NumericStage.fit(&df, &names(&["a"])).unwrap();
        let col = &state.columns[0];
        // Mean of [1, 3, 4] = 8/3
        assert!((col.mean - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(col.min, 1.0);
        assert_eq!(col.max, 4.0);
    }

    #[test]
    fn test_training_output_in_unit_interval() {
        let df = df!(
            "a" => &[10.0, 20.0, 15.0, 30.0],
            "b" => &[5i64, -5, 0, 2],
        )
        .unwrap();
        let cols = names(&["a", "b"]);

        let state = NumericStage.fit(&df, &cols).unwrap();
        let x = NumericStage.apply(&state, &df).unwrap();

        assert_eq!(x.dim(), (4, 2));
        for column in x.columns() {
            assert!(column.iter().all(|&v| (0.0..=1.0).contains(&v)));
            assert!(column.iter().any(|&v| v == 0.0));
            assert!(column.iter().any(|&v| v == 1.0));
        }
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let df = df!("a" => &[7.0, 7.0, 7.0]).unwrap();
        let state = NumericStage.fit(&df, &names(&["a"])).unwrap();
        let x = NumericStage.apply(&state, &df).unwrap();

        assert!(x.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_missing_filled_with_training_mean() {
        let train = df!("a" => &[0.0, 10.0]).unwrap();
        let state = NumericStage.fit(&train, &names(&["a"])).unwrap();

        let test = DataFrame::new(vec![Column::new("a".into(), &[None::<f64>])]).unwrap();
        let x = NumericStage.apply(&state, &test).unwrap();
        // mean 5 -> (5 - 0) / 10
        assert!((x[[0, 0]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_range_does_not_fail() {
        let train = df!("a" => &[0.0, 10.0]).unwrap();
        let state = NumericStage.fit(&train, &names(&["a"])).unwrap();

        let test = df!("a" => &[-10.0, 20.0]).unwrap();
        let x = NumericStage.apply(&state, &test).unwrap();
        assert_eq!(x[[0, 0]], -1.0);
        assert_eq!(x[[1, 0]], 2.0);
    }

    #[test]
    fn test_fully_missing_column_is_degenerate() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), &[None::<f64>, None]),
        ])
        .unwrap();

        let err = NumericStage.fit(&df, &names(&["a"])).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateFit(_)));
    }

    #[test]
    fn test_apply_missing_column_fails() {
        let train = df!("a" => &[1.0, 2.0]).unwrap();
        let state = NumericStage.fit(&train, &names(&["a"])).unwrap();

        let other = df!("b" => &[1.0, 2.0]).unwrap();
        let err = NumericStage.apply(&state, &other).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(_)));
    }
}
