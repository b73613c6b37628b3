//! Statistical summaries of a fit

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::lm::sums_of_squares;

/// In-sample fit statistics of one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// Target column
    pub target: String,
    /// R-squared
    pub r_squared: f64,
    /// Adjusted R-squared
    pub adj_r_squared: Option<f64>,
    /// Residual standard error
    pub residual_std_error: Option<f64>,
    /// F-statistic
    pub f_statistic: Option<f64>,
    /// F-statistic p-value
    pub f_p_value: Option<f64>,
    /// Number of observations
    pub n_observations: usize,
    /// Model degrees of freedom
    pub df_model: usize,
    /// Residual degrees of freedom
    pub df_residual: usize,
}

impl FitStatistics {
    /// Compute the statistics of `fitted` against `observed` for a model
    /// with `n_features` slope coefficients and an intercept
    pub fn compute(
        target: impl Into<String>,
        observed: ArrayView1<f64>,
        fitted: ArrayView1<f64>,
        n_features: usize,
    ) -> Self {
        let n = observed.len();
        let (ss_res, ss_tot) = sums_of_squares(observed, fitted);
        let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

        let df_model = n_features;
        let df_residual = n.saturating_sub(n_features + 1);

        let (adj_r_squared, residual_std_error) = if df_residual > 0 {
            let adj = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df_residual as f64;
            (Some(adj), Some((ss_res / df_residual as f64).sqrt()))
        } else {
            (None, None)
        };

        let f_statistic = if df_residual > 0 && df_model > 0 && ss_res > 0.0 && ss_tot > 0.0 {
            Some(((ss_tot - ss_res) / df_model as f64) / (ss_res / df_residual as f64))
        } else {
            None
        };

        let f_p_value = f_statistic.and_then(|f| {
            FisherSnedecor::new(df_model as f64, df_residual as f64)
                .ok()
                .map(|dist| 1.0 - dist.cdf(f))
        });

        Self {
            target: target.into(),
            r_squared,
            adj_r_squared,
            residual_std_error,
            f_statistic,
            f_p_value,
            n_observations: n,
            df_model,
            df_residual,
        }
    }
}
