//! Ordinary Least Squares (OLS) with an intercept
//!
//! The intercept is handled by centring: inputs and targets are centred on
//! their column means, each centred input column is scaled to unit norm,
//! and the slopes solve the centred problem through an SVD. The intercept
//! is recovered as `ȳ − x̄·β`.
//!
//! A singular value at or below `σ_max · max(n, p) · ε` means the centred
//! design is rank deficient; such fits fail instead of returning an
//! arbitrary minimum-norm solution.

use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::base::{linear_combination, Matrix, ModelError, Result, Vector};

/// Fitted OLS coefficients for one or more targets
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Slopes (targets × features)
    coefficients: Matrix,
    /// One intercept per target
    intercepts: Vector,
    /// Rows used for the fit
    n_samples: usize,
}

impl OlsFit {
    /// Fit `y ≈ b + X·β` for every column of `y`
    pub fn fit(x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Self> {
        let (n, p) = x.dim();
        let k = y.ncols();

        if y.nrows() != n {
            return Err(ModelError::fit(
                format!("design has {} rows but targets have {}", n, y.nrows()),
                "validate inputs",
            ));
        }
        if p == 0 || k == 0 {
            return Err(ModelError::fit(
                "at least one feature and one target are required",
                "validate inputs",
            ));
        }
        if n < p + 1 {
            return Err(ModelError::InsufficientData {
                n_samples: n,
                n_required: p + 1,
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::fit(
                "design or targets contain non-finite values",
                "validate inputs",
            ));
        }

        let x_mean = column_means(x);
        let y_mean = column_means(y);

        let mut design = &x - &x_mean;
        let rhs = &y - &y_mean;

        let mut scales = Array1::zeros(p);
        for (j, mut column) in design.axis_iter_mut(Axis(1)).enumerate() {
            let norm = column.dot(&column).sqrt();
            if norm == 0.0 {
                return Err(ModelError::SingularMatrix(format!(
                    "feature column {} is constant",
                    j
                )));
            }
            column /= norm;
            scales[j] = norm;
        }

        let svd = SVD::try_new(
            DMatrix::from_fn(n, p, |i, j| design[(i, j)]),
            true,
            true,
            f64::EPSILON,
            0,
        )
        .ok_or_else(|| ModelError::fit("SVD did not converge", "decompose design"))?;

        let tolerance = svd.singular_values.max() * n.max(p) as f64 * f64::EPSILON;
        let rank = svd.singular_values.iter().filter(|&&s| s > tolerance).count();
        if rank < p {
            return Err(ModelError::SingularMatrix(format!(
                "centred design has rank {} but {} features",
                rank, p
            )));
        }

        let solution = svd
            .solve(&DMatrix::from_fn(n, k, |i, t| rhs[(i, t)]), tolerance)
            .map_err(|e| ModelError::fit(e, "solve least squares"))?;
        let coefficients = Array2::from_shape_fn((k, p), |(t, j)| solution[(j, t)] / scales[j]);

        let intercepts = Array1::from_shape_fn(k, |t| {
            y_mean[t] - x_mean.dot(&coefficients.row(t))
        });

        if coefficients.iter().chain(intercepts.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::fit(
                "solution contains non-finite values",
                "solve least squares",
            ));
        }

        Ok(Self {
            coefficients,
            intercepts,
            n_samples: n,
        })
    }

    /// Slopes (targets × features)
    pub fn coefficients(&self) -> &Matrix {
        &self.coefficients
    }

    /// One intercept per target
    pub fn intercepts(&self) -> &Vector {
        &self.intercepts
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.ncols()
    }

    pub fn n_targets(&self) -> usize {
        self.coefficients.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Predict every target for one expanded feature row
    pub fn predict_features(&self, features: &[f64]) -> Vec<f64> {
        self.coefficients
            .outer_iter()
            .zip(self.intercepts.iter())
            .map(|(row, &intercept)| linear_combination(intercept, row, features))
            .collect()
    }

    /// Predict every target for a design matrix (rows × features)
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Matrix> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::shape(format!(
                "expected {} feature columns, got {}",
                self.n_features(),
                x.ncols()
            )));
        }

        Ok(Array2::from_shape_fn((x.nrows(), self.n_targets()), |(i, t)| {
            linear_combination(self.intercepts[t], self.coefficients.row(t), x.row(i))
        }))
    }
}

fn column_means(m: ArrayView2<f64>) -> Vector {
    m.sum_axis(Axis(0)) / m.nrows() as f64
}
