//! Feature term types
//!
//! This module defines the monomial that labels one column of a design
//! matrix and one coefficient of a fitted model.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{TermError, TermParser, TermResult, INTERACTION_SEPARATOR, POWER_SEPARATOR};

/// One `variable^exponent` factor of a term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Factor {
    /// Base variable name
    pub variable: String,
    /// Exponent, always at least 1
    pub exponent: u32,
}

impl Factor {
    /// Create a factor, validating the variable name and exponent
    pub fn new(variable: impl Into<String>, exponent: u32) -> TermResult<Self> {
        let variable = variable.into();
        validate_variable(&variable)?;

        if exponent == 0 || i32::try_from(exponent).is_err() {
            return Err(TermError::InvalidExponent {
                variable,
                exponent: exponent.to_string(),
            });
        }

        Ok(Self { variable, exponent })
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent == 1 {
            write!(f, "{}", self.variable)
        } else {
            write!(f, "{}{}{}", self.variable, POWER_SEPARATOR, self.exponent)
        }
    }
}

/// A monomial over base variables
///
/// Factors keep the order they were given in; a variable appears at most
/// once, repeated variables are merged by adding their exponents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureTerm {
    factors: Vec<Factor>,
}

impl FeatureTerm {
    /// Create a degree-1 term for a single variable
    pub fn variable(name: &str) -> TermResult<Self> {
        Self::power(name, 1)
    }

    /// Create a pure power `name^exponent`
    pub fn power(name: &str, exponent: u32) -> TermResult<Self> {
        Ok(Self {
            factors: vec![Factor::new(name, exponent)?],
        })
    }

    /// Create a term from factors
    pub fn from_factors(factors: Vec<Factor>) -> TermResult<Self> {
        if factors.is_empty() {
            return Err(TermError::EmptyTerm);
        }

        let mut merged: Vec<Factor> = Vec::with_capacity(factors.len());
        for factor in factors {
            match merged.iter_mut().find(|f| f.variable == factor.variable) {
                Some(existing) => {
                    let exponent = existing.exponent.saturating_add(factor.exponent);
                    *existing = Factor::new(factor.variable, exponent)?;
                }
                None => merged.push(factor),
            }
        }

        Ok(Self { factors: merged })
    }

    /// Parse a rendered term such as `a^2*b`
    pub fn parse(input: &str) -> TermResult<Self> {
        TermParser::parse(input)
    }

    /// Factors in order
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Total degree (sum of exponents)
    pub fn degree(&self) -> u32 {
        self.factors.iter().map(|f| f.exponent).sum()
    }

    /// Whether the term is a bare variable (one factor, exponent 1)
    pub fn is_bare(&self) -> bool {
        self.factors.len() == 1 && self.factors[0].exponent == 1
    }

    /// Whether the term multiplies more than one variable
    pub fn is_interaction(&self) -> bool {
        self.factors.len() > 1
    }

    /// Variables of this term in factor order
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.factors.iter().map(|f| f.variable.as_str())
    }

    /// Evaluate the term, looking each variable's value up by name
    pub fn evaluate_with<F>(&self, mut value_of: F) -> f64
    where
        F: FnMut(&str) -> f64,
    {
        product_of_powers(
            self.factors
                .iter()
                .map(|f| (value_of(&f.variable), f.exponent)),
        )
    }
}

/// Multiply `value^exponent` pairs left to right, starting from 1.0.
///
/// Both the design-matrix builder and the stateless predictor go through
/// this function so the two agree bit for bit.
pub(crate) fn product_of_powers<I>(factors: I) -> f64
where
    I: IntoIterator<Item = (f64, u32)>,
{
    factors
        .into_iter()
        .fold(1.0, |acc, (value, exponent)| acc * value.powi(exponent as i32))
}

pub(crate) fn validate_variable(name: &str) -> TermResult<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.trim() != name {
        Some("name has surrounding whitespace")
    } else if name.contains(INTERACTION_SEPARATOR) {
        Some("name contains the interaction separator")
    } else if name.contains(POWER_SEPARATOR) {
        Some("name contains the power separator")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TermError::InvalidVariable {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

impl fmt::Display for FeatureTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, factor) in self.factors.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", INTERACTION_SEPARATOR)?;
            }
            write!(f, "{}", factor)?;
        }
        Ok(())
    }
}

impl FromStr for FeatureTerm {
    type Err = TermError;

    fn from_str(s: &str) -> TermResult<Self> {
        TermParser::parse(s)
    }
}

impl Serialize for FeatureTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeatureTerm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
