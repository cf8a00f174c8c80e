//! Seeded train/test partitioning of a table

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Disjoint train/test partitions of a table
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: DataFrame,
    pub test: DataFrame,
    /// Row positions in the source table, in shuffled order
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffle the row indices with a seeded RNG and hold out
/// `ceil(n * test_fraction)` rows for testing.
///
/// The same table, fraction and seed always produce the same partition.
pub fn train_test_split(df: &DataFrame, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must lie strictly between 0 and 1".to_string(),
        });
    }

    let n_samples = df.height();
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_samples as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n_samples);
    let (test_indices, train_indices) = indices.split_at(n_test);

    Ok(TrainTestSplit {
        train: take_rows(df, train_indices)?,
        test: take_rows(df, test_indices)?,
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}
