//! Categorical stage: placeholder imputation followed by one-hot encoding

use crate::error::Result;
use super::{columns_to_array2, string_values, ColumnStage};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Fitted vocabulary for one categorical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalColumnState {
    pub name: String,
    /// Distinct training values, sorted
    pub vocabulary: Vec<String>,
}

impl CategoricalColumnState {
    /// Position of a category in the vocabulary, `None` if unseen
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|probe| probe.as_str().cmp(category))
            .ok()
    }
}

/// Fitted state of the categorical stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalState {
    /// Value substituted for missing entries before encoding
    pub placeholder: String,
    pub columns: Vec<CategoricalColumnState>,
}

impl CategoricalState {
    /// Total number of indicator columns
    pub fn width(&self) -> usize {
        self.columns.iter().map(|c| c.vocabulary.len()).sum()
    }
}

/// Constant imputer + one-hot encoder over the categorical columns.
///
/// Categories absent from the training vocabulary encode as an all-zero slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalStage {
    fill_value: String,
}

impl Default for CategoricalStage {
    fn default() -> Self {
        Self::new("none")
    }
}

impl CategoricalStage {
    pub fn new(fill_value: impl Into<String>) -> Self {
        Self {
            fill_value: fill_value.into(),
        }
    }

    pub fn fill_value(&self) -> &str {
        &self.fill_value
    }
}

impl ColumnStage for CategoricalStage {
    type State = CategoricalState;

    fn fit(&self, df: &DataFrame, columns: &[String]) -> Result<CategoricalState> {
        let columns = columns
            .iter()
            .map(|name| {
                let vocabulary: BTreeSet<String> = string_values(df, name)?
                    .into_iter()
                    .map(|v| v.unwrap_or_else(|| self.fill_value.clone()))
                    .collect();
                Ok(CategoricalColumnState {
                    name: name.clone(),
                    vocabulary: vocabulary.into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let state = CategoricalState {
            placeholder: self.fill_value.clone(),
            columns,
        };
        debug!(
            n_columns = state.columns.len(),
            n_indicators = state.width(),
            "Fitted categorical stage"
        );
        Ok(state)
    }

    fn apply(&self, state: &CategoricalState, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let mut indicators: Vec<Vec<f64>> = Vec::with_capacity(state.width());

        for col in &state.columns {
            let values = string_values(df, &col.name)?;
            let mut block = vec![vec![0.0; n_rows]; col.vocabulary.len()];

            for (row, value) in values.iter().enumerate() {
                let category = value.as_deref().unwrap_or(state.placeholder.as_str());
                if let Some(idx) = col.index_of(category) {
                    block[idx][row] = 1.0;
                }
            }
            indicators.extend(block);
        }

        Ok(columns_to_array2(n_rows, &indicators))
    }

    fn output_names(&self, state: &CategoricalState) -> Vec<String> {
        state
            .columns
            .iter()
            .flat_map(|col| {
                col.vocabulary
                    .iter()
                    .map(move |category| format!("{}_{}", col.name, category))
            })
            .collect()
    }
}
