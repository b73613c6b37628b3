//! Linear least squares
//!
//! This module provides the pieces the model selector is built from:
//! - Ordinary Least Squares with an intercept ([`OlsFit`])
//! - The seeded train/test row split ([`TrainTestSplit`])
//! - The coefficient of determination used as the selection score

pub mod ols;
pub mod split;


pub use ols::OlsFit;
pub use split::TrainTestSplit;

use ndarray::{ArrayView1, ArrayView2, Axis};

/// Residual and total sums of squares of `predicted` against `observed`
pub fn sums_of_squares(observed: ArrayView1<f64>, predicted: ArrayView1<f64>) -> (f64, f64) {
    let n = observed.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let mean = observed.sum() / n as f64;
    let ss_res = observed
        .iter()
        .zip(predicted.iter())
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    let ss_tot = observed.iter().map(|y| (y - mean).powi(2)).sum();
    (ss_res, ss_tot)
}

/// Coefficient of determination `1 − SS_res/SS_tot`, 0 when `SS_tot` is 0
pub fn r_squared(observed: ArrayView1<f64>, predicted: ArrayView1<f64>) -> f64 {
    let (ss_res, ss_tot) = sums_of_squares(observed, predicted);
    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// R² of every target column, in column order
pub fn r_squared_per_target(observed: ArrayView2<f64>, predicted: ArrayView2<f64>) -> Vec<f64> {
    observed
        .axis_iter(Axis(1))
        .zip(predicted.axis_iter(Axis(1)))
        .map(|(y, p)| r_squared(y, p))
        .collect()
}

/// Arithmetic mean of per-target scores; 0 for no targets
pub fn mean_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}
