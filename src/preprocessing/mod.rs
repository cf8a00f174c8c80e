//! Feature preprocessing module
//!
//! Provides the fit/apply stages that turn a raw feature table into a
//! numeric design matrix:
//! - Column classification by dtype
//! - Mean imputation and min-max scaling of numeric columns
//! - Placeholder imputation and one-hot encoding of categorical columns
//! - Composition of the stage outputs, with optional polynomial expansion

mod categorical;
mod composer;
mod numeric;

pub use categorical::{CategoricalColumnState, CategoricalStage, CategoricalState};
pub use composer::{ComposedState, FeatureComposer};
pub use numeric::{NumericColumnState, NumericStage, NumericState};

use crate::error::{PipelineError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of a feature column, resolved once by [`classify_columns`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// A feature column and its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Partition of the feature columns into numeric and categorical sets.
///
/// Column order follows the table the partition was computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPartition {
    columns: Vec<ColumnSpec>,
}

impl ColumnPartition {
    /// All classified columns in table order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Names of the numeric columns
    pub fn numeric(&self) -> Vec<String> {
        self.names_of(ColumnKind::Numeric)
    }

    /// Names of the categorical columns
    pub fn categorical(&self) -> Vec<String> {
        self.names_of(ColumnKind::Categorical)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn names_of(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Map a polars dtype to a column kind
fn kind_of(dtype: &DataType) -> Option<ColumnKind> {
    match dtype {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 |
        DataType::Float32 | DataType::Float64 | DataType::Null => Some(ColumnKind::Numeric),
        DataType::String | DataType::Boolean |
        DataType::Categorical(_, _) | DataType::Enum(_, _) => Some(ColumnKind::Categorical),
        _ => None,
    }
}

/// Partition the columns of a feature table by dtype.
///
/// The table must already exclude the target and identifier columns. Any
/// dtype that is neither numeric nor string-like is rejected.
pub fn classify_columns(features: &DataFrame) -> Result<ColumnPartition> {
    let columns = features
        .get_columns()
        .iter()
        .map(|col| {
            let kind = kind_of(col.dtype()).ok_or_else(|| PipelineError::UnsupportedColumnType {
                column: col.name().to_string(),
                dtype: col.dtype().to_string(),
            })?;
            Ok(ColumnSpec {
                name: col.name().to_string(),
                kind,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ColumnPartition { columns })
}

/// A preprocessing stage with an explicit fit/apply contract.
///
/// `fit` learns an immutable state from training data only; `apply` maps any
/// later table through that state to a block of the design matrix whose width
/// never depends on the table being applied.
pub trait ColumnStage {
    type State;

    /// Learn stage parameters from the given training columns
    fn fit(&self, df: &DataFrame, columns: &[String]) -> Result<Self::State>;

    /// Transform a table into a row-aligned matrix block
    fn apply(&self, state: &Self::State, df: &DataFrame) -> Result<Array2<f64>>;

    /// Names of the output columns, in matrix order
    fn output_names(&self, state: &Self::State) -> Vec<String>;
}

/// Read a column as `f64`, treating nulls and NaN as missing.
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::Float64)?;
    let values = casted
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read a column as strings, nulls as `None`.
pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::String)?;
    let values = casted
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Build a row-major matrix from column vectors of equal length
pub(crate) fn columns_to_array2(n_rows: usize, columns: &[Vec<f64>]) -> Array2<f64> {
    Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| columns[c][r])
}
