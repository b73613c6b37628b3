//! Prediction from a registered model or from bare coefficients
//!
//! A request either names a registered model, in which case its rows are
//! projected onto the model's base variables and replayed through the
//! stored expansion, or it carries coefficients, intercepts and feature
//! names, in which case the computation is rebuilt from those alone:
//! every feature name is parsed back into a [`FeatureTerm`], base values
//! are bound to the variables the terms mention, and each prediction is
//! `intercept + Σ cᵢ·termᵢ`.
//!
//! A registered model that has been evicted falls back to the bare
//! coefficients when the request carries them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fluent_core::terms::FeatureTerm;

use crate::base::{linear_combination, FittedModel, ModelError, Result};
use crate::registry::ModelRegistry;

#[cfg(test)]
mod tests;

/// Name of the variable a polynomial without feature names is written in
pub const DEFAULT_VARIABLE: &str = "x";

/// One row of raw input values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    /// A single value
    Scalar(f64),
    /// Values in variable (or feature) order
    Values(Vec<f64>),
    /// Values keyed by variable name
    Named(IndexMap<String, f64>),
}

impl From<f64> for RawInput {
    fn from(value: f64) -> Self {
        RawInput::Scalar(value)
    }
}

impl From<Vec<f64>> for RawInput {
    fn from(values: Vec<f64>) -> Self {
        RawInput::Values(values)
    }
}

/// Slope coefficients as sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoefficientSet {
    Scalar(f64),
    /// One target
    Single(Vec<f64>),
    /// Targets × features
    PerTarget(Vec<Vec<f64>>),
}

impl CoefficientSet {
    fn into_rows(self) -> Vec<Vec<f64>> {
        match self {
            CoefficientSet::Scalar(c) => vec![vec![c]],
            CoefficientSet::Single(row) => vec![row],
            CoefficientSet::PerTarget(rows) => rows,
        }
    }
}

/// Intercepts as sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterceptSet {
    Scalar(f64),
    PerTarget(Vec<f64>),
}

impl InterceptSet {
    fn into_vec(self) -> Vec<f64> {
        match self {
            InterceptSet::Scalar(b) => vec![b],
            InterceptSet::PerTarget(values) => values,
        }
    }
}

/// A prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionRequest {
    /// Rows to predict
    pub x_values: Vec<RawInput>,
    pub coefficients: Option<CoefficientSet>,
    pub intercept: Option<InterceptSet>,
    /// Without feature names, treat a scalar row as `x, x^2, …`
    pub is_polynomial: bool,
    /// Degree the client believes the model has; informational
    pub degree: usize,
    /// Return one vector per row even for a single target
    pub multi_output: bool,
    /// Rendered feature terms, one per coefficient
    pub feature_names: Option<Vec<String>>,
    /// Registered model to replay
    pub model_id: Option<String>,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            x_values: Vec::new(),
            coefficients: None,
            intercept: None,
            is_polynomial: false,
            degree: 1,
            multi_output: false,
            feature_names: None,
            model_id: None,
        }
    }
}

impl PredictionRequest {
    /// Request a prediction from a registered model
    pub fn for_model(model_id: impl Into<String>, x_values: Vec<RawInput>) -> Self {
        Self {
            model_id: Some(model_id.into()),
            x_values,
            ..Self::default()
        }
    }

    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ModelError::shape(format!("malformed prediction request: {}", e)))
    }
}

/// Predictions in request row order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Predictions {
    /// One value per row
    Single(Vec<f64>),
    /// One value per target per row
    Multi(Vec<Vec<f64>>),
}

impl Predictions {
    fn from_rows(rows: Vec<Vec<f64>>, multi: bool) -> Self {
        if multi {
            Predictions::Multi(rows)
        } else {
            Predictions::Single(rows.into_iter().filter_map(|r| r.first().copied()).collect())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Predictions::Single(values) => values.len(),
            Predictions::Multi(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_single(&self) -> Option<&[f64]> {
        match self {
            Predictions::Single(values) => Some(values),
            Predictions::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&[Vec<f64>]> {
        match self {
            Predictions::Multi(rows) => Some(rows),
            Predictions::Single(_) => None,
        }
    }
}

/// Resolves prediction requests against a registry
#[derive(Debug, Clone, Copy)]
pub struct PredictionEvaluator<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> PredictionEvaluator<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate a request, replaying a registered model when it names one
    pub fn evaluate(&self, request: &PredictionRequest) -> Result<Predictions> {
        let Some(id) = request.model_id.as_deref() else {
            return evaluate_stateless(request);
        };

        match self.registry.get(id) {
            Some(model) => evaluate_registered(&model, request),
            None if request.coefficients.is_some() => {
                warn!(model_id = %id, "Model not registered, evaluating supplied coefficients");
                evaluate_stateless(request)
            }
            None => Err(ModelError::ModelNotFound(id.to_string())),
        }
    }
}

/// Replay a fitted model on the rows of a request
pub fn evaluate_registered(model: &FittedModel, request: &PredictionRequest) -> Result<Predictions> {
    let base = model.base_variables();
    let reorder = request
        .feature_names
        .as_deref()
        .and_then(|names| column_order(names, base));

    let rows = request
        .x_values
        .iter()
        .map(|row| {
            let values = project_row(row, base, reorder.as_deref())?;
            model.predict_row(&values)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Predictions::from_rows(rows, model.is_multi_output()))
}

/// Evaluate a request from its coefficients, intercepts and feature names
pub fn evaluate_stateless(request: &PredictionRequest) -> Result<Predictions> {
    let model = StatelessModel::from_request(request)?;
    let rows = request
        .x_values
        .iter()
        .map(|row| model.predict_row(row))
        .collect::<Result<Vec<_>>>()?;

    Ok(Predictions::from_rows(rows, model.multi_output))
}

/// For every base variable, its position among the bare names of
/// `feature_names`; `None` unless every base variable is present.
fn column_order(feature_names: &[String], base: &[String]) -> Option<Vec<usize>> {
    let mut bare: Vec<String> = Vec::new();
    for term in feature_names.iter().filter_map(|name| FeatureTerm::parse(name).ok()) {
        if let (true, Some(factor)) = (term.is_bare(), term.factors().first()) {
            if !bare.contains(&factor.variable) {
                bare.push(factor.variable.clone());
            }
        }
    }

    base.iter()
        .map(|variable| bare.iter().position(|name| name == variable))
        .collect()
}

/// Bind a raw row to the registered base variables
fn project_row(row: &RawInput, base: &[String], order: Option<&[usize]>) -> Result<Vec<f64>> {
    let values = match row {
        RawInput::Named(map) => return bind_named(map, base),
        RawInput::Scalar(value) => vec![*value],
        RawInput::Values(values) => values.clone(),
    };

    Ok(match order {
        Some(order) => order
            .iter()
            .map(|&i| values.get(i).copied().unwrap_or(0.0))
            .collect(),
        None => (0..base.len())
            .map(|i| values.get(i).copied().unwrap_or(0.0))
            .collect(),
    })
}

/// Values of `base` looked up by name; absent variables are 0
fn bind_named(map: &IndexMap<String, f64>, base: &[String]) -> Result<Vec<f64>> {
    if let Some(unknown) = map.keys().find(|key| !base.contains(key)) {
        return Err(ModelError::shape(format!(
            "unknown variable '{}', expected one of {:?}",
            unknown, base
        )));
    }
    Ok(base
        .iter()
        .map(|name| map.get(name).copied().unwrap_or(0.0))
        .collect())
}

/// How the features of a stateless request are derived from a row
#[derive(Debug)]
enum FeatureLayout {
    /// Parsed terms over their variables, bare terms first
    Terms {
        terms: Vec<FeatureTerm>,
        base: Vec<String>,
    },
    /// The row is the feature vector
    Positional,
}

/// Coefficients and intercepts rebuilt from a request
#[derive(Debug)]
struct StatelessModel {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    layout: FeatureLayout,
    multi_output: bool,
}

impl StatelessModel {
    fn from_request(request: &PredictionRequest) -> Result<Self> {
        let coefficient_set = request
            .coefficients
            .clone()
            .ok_or_else(|| ModelError::shape("coefficients are required without a model id"))?;
        let is_per_target = matches!(coefficient_set, CoefficientSet::PerTarget(_));
        let coefficients = coefficient_set.into_rows();

        let n_features = coefficients.first().map_or(0, Vec::len);
        if coefficients.is_empty() || n_features == 0 {
            return Err(ModelError::shape("at least one coefficient is required"));
        }
        if let Some(row) = coefficients.iter().find(|row| row.len() != n_features) {
            return Err(ModelError::shape(format!(
                "every target needs {} coefficients, got a target with {}",
                n_features,
                row.len()
            )));
        }

        let intercepts = request
            .intercept
            .clone()
            .ok_or_else(|| ModelError::shape("an intercept is required"))?
            .into_vec();
        if intercepts.len() != coefficients.len() {
            return Err(ModelError::shape(format!(
                "{} coefficient rows but {} intercepts",
                coefficients.len(),
                intercepts.len()
            )));
        }

        let layout = match request.feature_names.as_deref() {
            Some(names) if !names.is_empty() => {
                if names.len() != n_features {
                    return Err(ModelError::shape(format!(
                        "{} feature names for {} coefficients",
                        names.len(),
                        n_features
                    )));
                }
                let terms = names
                    .iter()
                    .map(|name| FeatureTerm::parse(name))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                FeatureLayout::terms(terms)
            }
            _ if request.is_polynomial => {
                if request.degree != n_features {
                    debug!(
                        degree = request.degree,
                        n_features, "Request degree differs from coefficient count"
                    );
                }
                let terms = (1..=n_features)
                    .map(|k| {
                        let exponent = u32::try_from(k).unwrap_or(u32::MAX);
                        FeatureTerm::power(DEFAULT_VARIABLE, exponent)
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                FeatureLayout::terms(terms)
            }
            _ => FeatureLayout::Positional,
        };

        Ok(Self {
            multi_output: request.multi_output || (is_per_target && coefficients.len() > 1),
            coefficients,
            intercepts,
            layout,
        })
    }

    fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }

    fn features(&self, row: &RawInput) -> Result<Vec<f64>> {
        let n_features = self.n_features();
        match &self.layout {
            FeatureLayout::Terms { terms, base } => {
                let values = match row {
                    RawInput::Named(map) => bind_named(map, base)?,
                    RawInput::Scalar(value) => pad(&[*value], base.len()),
                    RawInput::Values(values) if values.len() <= base.len() => {
                        pad(values, base.len())
                    }
                    RawInput::Values(values) if values.len() == n_features => {
                        return Ok(values.clone());
                    }
                    RawInput::Values(values) => {
                        return Err(ModelError::shape(format!(
                            "row has {} values, expected at most {} variables or exactly {} features",
                            values.len(),
                            base.len(),
                            n_features
                        )));
                    }
                };

                Ok(terms
                    .iter()
                    .map(|term| {
                        term.evaluate_with(|name| {
                            base.iter()
                                .position(|b| b == name)
                                .map_or(0.0, |i| values[i])
                        })
                    })
                    .collect())
            }
            FeatureLayout::Positional => match row {
                RawInput::Named(_) => Err(ModelError::shape(
                    "named values need feature names to bind to",
                )),
                RawInput::Scalar(value) => Ok(pad(&[*value], n_features)),
                RawInput::Values(values) if values.len() <= n_features => {
                    Ok(pad(values, n_features))
                }
                RawInput::Values(values) => Err(ModelError::shape(format!(
                    "row has {} values but the model has {} coefficients",
                    values.len(),
                    n_features
                ))),
            },
        }
    }

    fn predict_row(&self, row: &RawInput) -> Result<Vec<f64>> {
        let features = self.features(row)?;
        Ok(self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(coefficients, &intercept)| linear_combination(intercept, coefficients, &features))
            .collect())
    }
}

impl FeatureLayout {
    /// Base order is the first-seen order of the bare terms; variables that
    /// only occur inside powers or products follow in first-seen order.
    fn terms(terms: Vec<FeatureTerm>) -> Self {
        let bare = terms.iter().filter(|t| t.is_bare());
        let nested = terms.iter().filter(|t| !t.is_bare());

        let mut base: Vec<String> = Vec::new();
        for variable in bare.chain(nested).flat_map(|t| t.variables()) {
            if !base.iter().any(|b| b == variable) {
                base.push(variable.to_string());
            }
        }
        FeatureLayout::Terms { terms, base }
    }
}

/// Copy `values` and pad with zeros up to `len`
fn pad(values: &[f64], len: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    if out.len() < len {
        out.resize(len, 0.0);
    }
    out
}
