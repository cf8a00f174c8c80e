//! House price pipeline - preprocessing and regression for tabular sale data
//!
//! This crate trains a sale price regressor on a table of house records:
//! - Column classification into numeric and categorical features
//! - Mean imputation and min-max scaling of numeric columns
//! - Constant imputation and one-hot encoding of categorical columns
//! - Optional polynomial expansion of the numeric block
//! - Seeded train/test split, ordinary least squares, RMSE and R²
//! - Atomic persistence of the fitted pipeline and its metrics
//!
//! # Modules
//!
//! - [`preprocessing`] - Column classification and fitted transform stages
//! - [`feature_engineering`] - Polynomial feature expansion
//! - [`training`] - Split, fit and evaluation
//! - [`export`] - Artifact persistence
//! - [`utils`] - Data loading
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod feature_engineering;
pub mod training;

// Persistence and IO
pub mod export;
pub mod utils;

// Services
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PipelineError, Result};

    // Preprocessing
    pub use crate::preprocessing::{
        classify_columns, CategoricalStage, ColumnKind, ColumnPartition, ColumnStage,
        FeatureComposer, NumericStage,
    };

    // Feature engineering
    pub use crate::feature_engineering::PolynomialExpansion;

    // Training
    pub use crate::training::{
        evaluate, train_test_split, FittedPipeline, LinearRegression, RegressionMetrics,
        TrainEngine, TrainingConfig, TrainingRun,
    };

    // Export
    pub use crate::export::{MetricsRecord, ResultSink};

    // Data loading
    pub use crate::utils::DataLoader;
}
