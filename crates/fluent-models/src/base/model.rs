//! Fitted model and its shape

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use fluent_core::terms::{FeatureExpander, FeatureTerm};

use super::{Matrix, ModelError, Result, Vector};
use crate::lm::OlsFit;

/// Structural kind of a fitted model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelShape {
    /// One input variable, terms `x, x^2, …, x^degree`
    Polynomial { variable: String, degree: usize },
    /// Several input variables, one bare term each
    Linear { variables: Vec<String> },
    /// Several input variables expanded to every monomial up to `degree`
    Interaction { variables: Vec<String>, degree: usize },
}

impl ModelShape {
    /// Shape of an expansion over `variables` at `degree`
    pub fn of_expansion(variables: &[String], degree: usize) -> Self {
        match variables {
            [variable] => ModelShape::Polynomial {
                variable: variable.clone(),
                degree,
            },
            _ if degree <= 1 => ModelShape::Linear {
                variables: variables.to_vec(),
            },
            _ => ModelShape::Interaction {
                variables: variables.to_vec(),
                degree,
            },
        }
    }

    /// Maximum total degree of the terms
    pub fn degree(&self) -> usize {
        match self {
            ModelShape::Polynomial { degree, .. } | ModelShape::Interaction { degree, .. } => {
                *degree
            }
            ModelShape::Linear { .. } => 1,
        }
    }

    /// Whether the terms come from a polynomial expansion
    ///
    /// A single-variable model counts as polynomial at every degree,
    /// including 1.
    pub fn is_polynomial(&self) -> bool {
        !matches!(self, ModelShape::Linear { .. })
    }

    /// Base variables in input order
    pub fn variables(&self) -> Vec<&str> {
        match self {
            ModelShape::Polynomial { variable, .. } => vec![variable.as_str()],
            ModelShape::Linear { variables } | ModelShape::Interaction { variables, .. } => {
                variables.iter().map(String::as_str).collect()
            }
        }
    }
}

/// `intercept + Σ cᵢ·fᵢ`, accumulated left to right.
///
/// Every prediction path goes through here, so a registry replay and a
/// stateless evaluation of the same coefficients agree bit for bit.
pub fn linear_combination<'c, 'f, C, F>(intercept: f64, coefficients: C, features: F) -> f64
where
    C: IntoIterator<Item = &'c f64>,
    F: IntoIterator<Item = &'f f64>,
{
    coefficients
        .into_iter()
        .zip(features)
        .fold(intercept, |acc, (c, f)| acc + c * f)
}

/// A least-squares fit together with the expansion that produced its design
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    shape: ModelShape,
    expander: FeatureExpander,
    fit: OlsFit,
    target_names: Vec<String>,
}

impl FittedModel {
    /// Bind a fit to its expansion and target names
    pub fn new(expander: FeatureExpander, fit: OlsFit, target_names: Vec<String>) -> Result<Self> {
        if fit.n_features() != expander.n_features() {
            return Err(ModelError::fit(
                format!(
                    "fit has {} coefficients per target but the expansion has {} terms",
                    fit.n_features(),
                    expander.n_features()
                ),
                "bind model",
            ));
        }
        if fit.n_targets() != target_names.len() {
            return Err(ModelError::fit(
                format!(
                    "fit has {} targets but {} target names were given",
                    fit.n_targets(),
                    target_names.len()
                ),
                "bind model",
            ));
        }

        Ok(Self {
            shape: ModelShape::of_expansion(expander.variables(), expander.degree()),
            expander,
            fit,
            target_names,
        })
    }

    pub fn shape(&self) -> &ModelShape {
        &self.shape
    }

    pub fn expander(&self) -> &FeatureExpander {
        &self.expander
    }

    /// Base input variables, in the order rows must supply them
    pub fn base_variables(&self) -> &[String] {
        self.expander.variables()
    }

    /// Feature terms, one per coefficient column
    pub fn terms(&self) -> &[FeatureTerm] {
        self.expander.terms()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.expander.feature_names()
    }

    /// Coefficients (targets × features)
    pub fn coefficients(&self) -> &Matrix {
        self.fit.coefficients()
    }

    /// One intercept per target
    pub fn intercepts(&self) -> &Vector {
        self.fit.intercepts()
    }

    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    pub fn n_targets(&self) -> usize {
        self.target_names.len()
    }

    pub fn is_multi_output(&self) -> bool {
        self.n_targets() > 1
    }

    /// Whether base values go through a non-identity expansion
    pub fn is_expanded(&self) -> bool {
        self.expander.is_expanded()
    }

    /// Predict every target for one row of base values
    pub fn predict_row(&self, base: &[f64]) -> Result<Vec<f64>> {
        let features = self.expander.expand_row(base)?;
        Ok(self.fit.predict_features(&features))
    }

    /// Predict every target for a matrix of base values (rows × variables)
    pub fn predict(&self, inputs: ArrayView2<f64>) -> Result<Matrix> {
        let design = self.expander.expand(inputs)?;
        self.fit.predict(design.view())
    }
}
