//! Model training module
//!
//! Provides the end-to-end training flow:
//! - Seeded train/test splitting
//! - Ordinary least squares linear regression
//! - RMSE and R² evaluation
//! - The [`TrainEngine`] orchestrator and its [`FittedPipeline`] output

mod config;
mod engine;
mod split;
pub mod linear_models;
pub mod metrics;

pub use config::{ParamsFile, TrainingConfig};
pub use engine::{FittedPipeline, TrainEngine, TrainingRun};
pub use linear_models::LinearRegression;
pub use metrics::{evaluate, r2_score, rmse, RegressionMetrics};
pub use split::{train_test_split, TrainTestSplit};
