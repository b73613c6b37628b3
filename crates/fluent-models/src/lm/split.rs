//! Seeded train/test row split

use ndarray::{ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::base::{Matrix, ModelError, Result};

/// Row indices of a shuffled train/test partition
///
/// Rows `0..n` are shuffled with a seeded RNG; the first `ceil(fraction·n)`
/// shuffled rows form the test set and the remainder the training set.
/// Both sets always keep at least one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl TrainTestSplit {
    pub fn new(n_rows: usize, test_fraction: f64, seed: u64) -> Result<Self> {
        if n_rows < 2 {
            return Err(ModelError::InsufficientData {
                n_samples: n_rows,
                n_required: 2,
            });
        }
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(ModelError::config(format!(
                "test fraction must be strictly between 0 and 1, got {}",
                test_fraction
            )));
        }

        let mut rows: Vec<usize> = (0..n_rows).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let n_test = ((test_fraction * n_rows as f64).ceil() as usize).clamp(1, n_rows - 1);
        let train = rows.split_off(n_test);

        Ok(Self { train, test: rows })
    }

    pub fn train_indices(&self) -> &[usize] {
        &self.train
    }

    pub fn test_indices(&self) -> &[usize] {
        &self.test
    }

    /// Select the training and test rows of `data`
    pub fn apply(&self, data: ArrayView2<f64>) -> (Matrix, Matrix) {
        (
            data.select(Axis(0), &self.train),
            data.select(Axis(0), &self.test),
        )
    }
}
