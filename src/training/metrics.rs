//! Regression evaluation metrics

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Scores of a set of predictions against held-out targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    pub n_samples: usize,
}

fn check_inputs(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(PipelineError::EmptyInput(
            "cannot evaluate zero predictions".to_string(),
        ));
    }
    Ok(())
}

/// `sqrt(mean((pred - actual)^2))`
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;
    let mse = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (p - t) * (p - t))
        .sum::<f64>()
        / y_true.len() as f64;
    Ok(mse.sqrt())
}

/// `1 - SS_res / SS_tot`, or `0.0` when the targets have zero variance
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p) * (t - p)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();

    if ss_tot == 0.0 {
        return Ok(0.0);
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Compute every regression metric at once
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<RegressionMetrics> {
    Ok(RegressionMetrics {
        rmse: rmse(y_true, y_pred)?,
        r2: r2_score(y_true, y_pred)?,
        n_samples: y_true.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [1.0, 2.0, 3.0];
        let m = evaluate(&y, &y).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.n_samples, 3);
    }

    #[test]
    fn test_rmse_value() {
        let rmse = rmse(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
        assert!((rmse - 12.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_r2_of_mean_prediction_is_zero() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let pred = [2.5; 4];
        assert!(r2_score(&y, &pred).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_r2_can_be_negative() {
        let y = [1.0, 2.0, 3.0];
        let pred = [3.0, 2.0, 1.0];
        assert!(r2_score(&y, &pred).unwrap() < 0.0);
    }

    #[test]
    fn test_zero_variance_target() {
        let y = [5.0, 5.0, 5.0];
        let pred = [4.0, 5.0, 6.0];
        let r2 = r2_score(&y, &pred).unwrap();
        assert_eq!(r2, 0.0);
        assert!(!r2.is_nan());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            evaluate(&[1.0, 2.0], &[1.0]),
            Err(PipelineError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(evaluate(&[], &[]), Err(PipelineError::EmptyInput(_))));
    }
}
