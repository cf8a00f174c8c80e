//! Training configuration

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a training run.
///
/// Passed explicitly to [`TrainEngine::new`](super::TrainEngine::new); nothing
/// is read from the environment or from ambient files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Column holding the regression target
    pub target_column: String,

    /// Identifier column excluded from features, if the table has one
    pub id_column: Option<String>,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the train/test shuffle
    pub random_state: u64,

    /// Degree of the polynomial expansion over numeric features
    pub polynomial_degree: Option<u32>,

    /// Placeholder used for missing categorical entries
    pub categorical_fill_value: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: "SalePrice".to_string(),
            id_column: Some("Id".to_string()),
            test_size: 0.2,
            random_state: 42,
            polynomial_degree: None,
            categorical_fill_value: "none".to_string(),
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the target column
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    /// Builder method to set (or clear) the identifier column
    pub fn with_id_column(mut self, id_column: Option<String>) -> Self {
        self.id_column = id_column;
        self
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the split seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to enable polynomial expansion
    pub fn with_polynomial_degree(mut self, degree: u32) -> Self {
        self.polynomial_degree = Some(degree);
        self
    }

    /// Builder method to set the categorical placeholder
    pub fn with_categorical_fill_value(mut self, value: impl Into<String>) -> Self {
        self.categorical_fill_value = value.into();
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must lie strictly between 0 and 1".to_string(),
            });
        }
        if self.polynomial_degree == Some(0) {
            return Err(PipelineError::InvalidParameter {
                name: "polynomial_degree".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.target_column.is_empty() {
            return Err(PipelineError::ConfigError(
                "target column name is empty".to_string(),
            ));
        }
        if self.id_column.as_deref() == Some(self.target_column.as_str()) {
            return Err(PipelineError::ConfigError(format!(
                "identifier column and target column are both '{}'",
                self.target_column
            )));
        }
        Ok(())
    }

    /// Build a configuration from a YAML params file.
    ///
    /// Values missing from the file keep their defaults.
    pub fn from_params_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let params: ParamsFile = serde_yaml::from_str(&text)?;
        Ok(params.into_config(Self::default()))
    }
}

/// On-disk layout of the params file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamsFile {
    #[serde(default)]
    pub training: TrainingSection,
    #[serde(default)]
    pub model_poly: Option<PolynomialSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingSection {
    pub test_size: Option<f64>,
    pub random_state: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolynomialSection {
    pub degree: u32,
}

impl ParamsFile {
    /// Overlay the file's values onto `base`
    pub fn into_config(self, mut base: TrainingConfig) -> TrainingConfig {
        if let Some(test_size) = self.training.test_size {
            base.test_size = test_size;
        }
        if let Some(seed) = self.training.random_state {
            base.random_state = seed;
        }
        if let Some(poly) = self.model_poly {
            base.polynomial_degree = Some(poly.degree);
        }
        base
    }
}
