//! Feature engineering module
//!
//! Generated features derived from already-preprocessed columns.

mod polynomial;

pub use polynomial::{PolynomialExpansion, PolynomialState};
