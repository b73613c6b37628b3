//! Polynomial feature expansion
//!
//! Builds every monomial of total degree `1..=degree` over the base
//! variables, without a constant column. Terms are ordered by total degree
//! and, within a degree, lexicographically over non-decreasing variable
//! index combinations; for `a, b` at degree 2 this yields
//! `a, b, a^2, a*b, b^2`. The order is part of a fitted model's contract:
//! coefficient `i` always belongs to term `i`.

use ndarray::{Array2, ArrayView2};

use super::term::{product_of_powers, validate_variable};
use super::{Factor, FeatureTerm, TermError, TermResult};

/// Expands base variables into polynomial feature columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureExpander {
    variables: Vec<String>,
    degree: usize,
    terms: Vec<FeatureTerm>,
    /// Per term, `(variable index, exponent)` in factor order
    plan: Vec<Vec<(usize, u32)>>,
}

impl FeatureExpander {
    /// Create an expander over the given variables
    pub fn new<S: AsRef<str>>(variables: &[S], degree: usize) -> TermResult<Self> {
        if variables.is_empty() {
            return Err(TermError::NoVariables);
        }
        if degree == 0 {
            return Err(TermError::InvalidDegree(degree));
        }

        let variables: Vec<String> = variables.iter().map(|v| v.as_ref().to_string()).collect();
        for (i, variable) in variables.iter().enumerate() {
            validate_variable(variable)?;
            if variables[..i].contains(variable) {
                return Err(TermError::DuplicateVariable(variable.clone()));
            }
        }

        let mut plan = Vec::new();
        for total in 1..=degree {
            let mut current = Vec::with_capacity(total);
            push_combinations(variables.len(), total, 0, &mut current, &mut plan);
        }

        let terms = plan
            .iter()
            .map(|factors| {
                let factors = factors
                    .iter()
                    .map(|&(idx, exponent)| Factor::new(variables[idx].as_str(), exponent))
                    .collect::<TermResult<Vec<_>>>()?;
                FeatureTerm::from_factors(factors)
            })
            .collect::<TermResult<Vec<_>>>()?;

        Ok(Self {
            variables,
            degree,
            terms,
            plan,
        })
    }

    /// Base variables in input order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Maximum total degree
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Expanded terms in column order
    pub fn terms(&self) -> &[FeatureTerm] {
        &self.terms
    }

    /// Rendered term names in column order
    pub fn feature_names(&self) -> Vec<String> {
        self.terms.iter().map(ToString::to_string).collect()
    }

    /// Number of expanded features
    pub fn n_features(&self) -> usize {
        self.terms.len()
    }

    /// Whether the expansion differs from the identity
    pub fn is_expanded(&self) -> bool {
        self.degree > 1
    }

    /// Expand a single row of base values
    pub fn expand_row(&self, base: &[f64]) -> TermResult<Vec<f64>> {
        if base.len() != self.variables.len() {
            return Err(TermError::DimensionMismatch {
                expected: self.variables.len(),
                actual: base.len(),
            });
        }

        Ok(self
            .plan
            .iter()
            .map(|factors| product_of_powers(factors.iter().map(|&(idx, e)| (base[idx], e))))
            .collect())
    }

    /// Expand a matrix of base values (rows × variables) into the design matrix
    pub fn expand(&self, base: ArrayView2<f64>) -> TermResult<Array2<f64>> {
        if base.ncols() != self.variables.len() {
            return Err(TermError::DimensionMismatch {
                expected: self.variables.len(),
                actual: base.ncols(),
            });
        }

        Ok(Array2::from_shape_fn(
            (base.nrows(), self.plan.len()),
            |(row, col)| {
                product_of_powers(
                    self.plan[col]
                        .iter()
                        .map(|&(idx, e)| (base[(row, idx)], e)),
                )
            },
        ))
    }
}

/// Enumerate non-decreasing index combinations of length `remaining`
/// starting at `start`, recording each as `(index, multiplicity)` pairs.
fn push_combinations(
    n_vars: usize,
    remaining: usize,
    start: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<(usize, u32)>>,
) {
    if remaining == 0 {
        let mut factors: Vec<(usize, u32)> = Vec::new();
        for &idx in current.iter() {
            match factors.last_mut() {
                Some((last, exponent)) if *last == idx => *exponent += 1,
                _ => factors.push((idx, 1)),
            }
        }
        out.push(factors);
        return;
    }

    for idx in start..n_vars {
        current.push(idx);
        push_combinations(n_vars, remaining - 1, idx, current, out);
        current.pop();
    }
}
