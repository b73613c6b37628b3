//! Equation synthesis
//!
//! Renders a fitted model as `target(x) = <terms> <intercept>`:
//!
//! ```text
//! y(x) = 1.5*x - 0.25*x^2 + 3.0
//! ```
//!
//! The first term carries a sign only when negative (glued to the number),
//! later terms and the intercept are joined with ` + ` or ` - ` and print
//! the absolute value. Coefficients are rounded before the sign is chosen,
//! so a value that rounds to zero prints as `+ 0.0`.

use ndarray::ArrayView1;

use crate::base::FittedModel;
use crate::config::FitConfig;


/// Round to `decimals` places, normalising `-0.0` to `0.0`
///
/// Rounds the exact binary value, so `2.675` (stored just below) becomes
/// `2.67` rather than `2.68`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let rounded = format!("{:.*}", decimals as usize, value)
        .parse::<f64>()
        .unwrap_or(value);
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Print a number with at least one decimal place (`2.0`, `0.5`, `-1.25`)
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Builds equation strings and accuracy percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquationSynthesizer {
    coefficient_decimals: u32,
    accuracy_decimals: u32,
}

impl Default for EquationSynthesizer {
    fn default() -> Self {
        Self::new(4, 2)
    }
}

impl EquationSynthesizer {
    pub fn new(coefficient_decimals: u32, accuracy_decimals: u32) -> Self {
        Self {
            coefficient_decimals,
            accuracy_decimals,
        }
    }

    pub fn from_config(config: &FitConfig) -> Self {
        Self::new(config.coefficient_decimals, config.accuracy_decimals)
    }

    /// Render one target's equation over the given term names
    pub fn equation<S: AsRef<str>>(
        &self,
        target: &str,
        terms: &[S],
        coefficients: ArrayView1<f64>,
        intercept: f64,
    ) -> String {
        let mut out = format!("{}(x) = ", target);

        for (i, (term, &coefficient)) in terms.iter().zip(coefficients.iter()).enumerate() {
            let c = round_to(coefficient, self.coefficient_decimals);
            let magnitude = format_number(c.abs());
            match (i, c < 0.0) {
                (0, false) => out.push_str(&magnitude),
                (0, true) => {
                    out.push('-');
                    out.push_str(&magnitude);
                }
                (_, false) => {
                    out.push_str(" + ");
                    out.push_str(&magnitude);
                }
                (_, true) => {
                    out.push_str(" - ");
                    out.push_str(&magnitude);
                }
            }
            out.push('*');
            out.push_str(term.as_ref());
        }

        let b = round_to(intercept, self.coefficient_decimals);
        if terms.is_empty() {
            out.push_str(&format_number(b));
        } else {
            out.push_str(if b < 0.0 { " - " } else { " + " });
            out.push_str(&format_number(b.abs()));
        }
        out
    }

    /// One equation per target of a fitted model, over its term names
    pub fn equations(&self, model: &FittedModel) -> Vec<String> {
        self.equations_with_terms(model, &model.feature_names())
    }

    /// One equation per target, rendering the terms under other names
    pub fn equations_with_terms<S: AsRef<str>>(
        &self,
        model: &FittedModel,
        terms: &[S],
    ) -> Vec<String> {
        model
            .target_names()
            .iter()
            .zip(model.coefficients().outer_iter())
            .zip(model.intercepts().iter())
            .map(|((target, coefficients), &intercept)| {
                self.equation(target, terms, coefficients, intercept)
            })
            .collect()
    }

    /// Score as a percentage, rounded
    pub fn accuracy(&self, score: f64) -> f64 {
        round_to(score * 100.0, self.accuracy_decimals)
    }
}
