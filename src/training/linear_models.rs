//! Ordinary least squares linear regression

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Pivots below this fraction of the largest diagonal entry are treated as
/// rank deficiency.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Ridge added to the normal equations when they are rank deficient
const FALLBACK_RIDGE: f64 = 1e-8;

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Returns `None` when a pivot falls below the relative tolerance.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let max_diag = a.diag().iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let tol = PIVOT_TOLERANCE * max_diag;

    // Cholesky decomposition: A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= tol {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Solve least squares via normal equations: (X^T X) w = X^T y.
///
/// Collinear designs (one-hot blocks next to an intercept, constant columns)
/// make X^T X singular; those are retried with a tiny ridge, which selects
/// the small-norm solution without visibly changing the fit.
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
    let n_features = x.ncols();
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    if let Some(result) = cholesky_solve(&xtx, &xty) {
        return Ok(result);
    }

    let mean_diag = xtx.diag().iter().map(|v| v.abs()).sum::<f64>() / n_features.max(1) as f64;
    let ridge = (FALLBACK_RIDGE * mean_diag).max(f64::EPSILON);
    warn!(ridge, n_features, "Normal equations are rank deficient, retrying with ridge");

    let mut xtx_reg = xtx;
    for i in 0..n_features {
        xtx_reg[[i, i]] += ridge;
    }

    cholesky_solve(&xtx_reg, &xty).ok_or_else(|| {
        PipelineError::ComputationError(
            "Matrix is singular, cannot solve least squares".to_string(),
        )
    })
}

/// Linear regression model with intercept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    coefficients: Array1<f64>,
    /// Fitted intercept (bias)
    intercept: f64,
}

impl LinearRegression {
    /// Fit by ordinary least squares on centered data
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        let x_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
            PipelineError::DegenerateFit("cannot fit regression on zero rows".to_string())
        })?;
        let y_mean = y.mean().unwrap_or(0.0);

        let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let coefficients = solve_least_squares(&x_centered, &y_centered)?;
        let intercept = y_mean - coefficients.dot(&x_mean);

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
