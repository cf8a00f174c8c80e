//! Polynomial feature expansion

use crate::error::{PipelineError, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Generates every monomial of the input columns with total degree `1..=degree`.
///
/// No bias column is produced; the regression supplies its own intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialExpansion {
    degree: u32,
}

/// Fitted term list of a polynomial expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialState {
    pub n_features_in: usize,
    /// Each term is a non-decreasing list of input column indices
    pub terms: Vec<Vec<usize>>,
    pub feature_names: Vec<String>,
}

impl PolynomialState {
    pub fn n_features_out(&self) -> usize {
        self.terms.len()
    }
}

impl PolynomialExpansion {
    pub fn new(degree: u32) -> Result<Self> {
        if degree == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "degree".to_string(),
                value: degree.to_string(),
                reason: "polynomial degree must be at least 1".to_string(),
            });
        }
        Ok(Self { degree })
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Fix the term list for the given input columns
    pub fn fit(&self, input_names: &[String]) -> PolynomialState {
        let n = input_names.len();
        let mut terms = Vec::new();
        for d in 1..=self.degree as usize {
            combinations_with_replacement(n, d, &mut terms);
        }

        let feature_names = terms.iter().map(|t| term_name(t, input_names)).collect();

        PolynomialState {
            n_features_in: n,
            terms,
            feature_names,
        }
    }

    /// Expand a matrix whose columns match the fitted inputs
    pub fn apply(&self, state: &PolynomialState, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != state.n_features_in {
            return Err(PipelineError::ShapeError {
                expected: format!("{} columns", state.n_features_in),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut result = Array2::<f64>::zeros((x.nrows(), state.terms.len()));
        for (i, row) in x.rows().into_iter().enumerate() {
            for (j, term) in state.terms.iter().enumerate() {
                result[[i, j]] = term.iter().map(|&k| row[k]).product::<f64>();
            }
        }
        Ok(result)
    }
}

/// Append all non-decreasing index tuples of length `k` over `0..n`, in
/// lexicographic order.
fn combinations_with_replacement(n: usize, k: usize, out: &mut Vec<Vec<usize>>) {
    if n == 0 || k == 0 {
        return;
    }
    let mut current = vec![0usize; k];
    loop {
        out.push(current.clone());

        // rightmost position that can still be incremented
        let Some(pos) = (0..k).rev().find(|&p| current[p] < n - 1) else {
            return;
        };
        let next = current[pos] + 1;
        for slot in current.iter_mut().skip(pos) {
            *slot = next;
        }
    }
}

/// `a`, `a^2`, `a b`, `a^2 b`, ...
fn term_name(term: &[usize], names: &[String]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < term.len() {
        let idx = term[i];
        let power = term[i..].iter().take_while(|&&k| k == idx).count();
        if power == 1 {
            parts.push(names[idx].clone());
        } else {
            parts.push(format!("{}^{}", names[idx], power));
        }
        i += power;
    }
    parts.join(" ")
}
