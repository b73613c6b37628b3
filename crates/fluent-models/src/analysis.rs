//! Top-level fit and predict operations
//!
//! [`Analyzer`] ties the pipeline together: sanitize the selected columns,
//! pick a model, render its equations and keep it in the registry so later
//! requests can replay it.

use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use fluent_core::data::{DataError, SanitizationReport, Sanitizer, Table};

use crate::base::{FitStatistics, FittedModel, ModelError, ModelShape, Result};
use crate::config::AnalyzerConfig;
use crate::equation::EquationSynthesizer;
use crate::predict::{
    CoefficientSet, InterceptSet, PredictionEvaluator, PredictionRequest, Predictions, RawInput,
};
use crate::registry::ModelRegistry;
use crate::select::{ModelSelector, ScoreSource, Selection};

/// Variable name of the single-input manual path
pub const MANUAL_VARIABLE: &str = "x";

/// Numeric description of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    /// Coefficients (targets × features)
    pub coefficients: Vec<Vec<f64>>,
    /// One intercept per target
    pub intercepts: Vec<f64>,
    pub is_polynomial: bool,
    pub degree: usize,
    /// Rendered feature terms, one per coefficient column
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
    pub multi_output: bool,
    /// Registry identifier, when the model was registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub shape: ModelShape,
}

impl ModelSummary {
    /// Summarise a model, naming its terms by `feature_names`
    fn new(model: &FittedModel, feature_names: Vec<String>, model_id: Option<String>) -> Self {
        Self {
            coefficients: model
                .coefficients()
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
            intercepts: model.intercepts().to_vec(),
            is_polynomial: model.shape().is_polynomial(),
            degree: model.shape().degree(),
            feature_names,
            target_names: model.target_names().to_vec(),
            multi_output: model.is_multi_output(),
            model_id,
            shape: model.shape().clone(),
        }
    }

    /// A request that evaluates this model on `rows`
    ///
    /// The request carries the model id when there is one and always
    /// carries the coefficients, so it still evaluates after the registry
    /// has dropped the model.
    pub fn prediction_request(&self, rows: Vec<RawInput>) -> PredictionRequest {
        let (coefficients, intercept) = if self.multi_output {
            (
                CoefficientSet::PerTarget(self.coefficients.clone()),
                InterceptSet::PerTarget(self.intercepts.clone()),
            )
        } else {
            (
                CoefficientSet::Single(self.coefficients.first().cloned().unwrap_or_default()),
                InterceptSet::Scalar(self.intercepts.first().copied().unwrap_or_default()),
            )
        };

        PredictionRequest {
            x_values: rows,
            coefficients: Some(coefficients),
            intercept: Some(intercept),
            is_polynomial: self.is_polynomial,
            degree: self.degree,
            multi_output: self.multi_output,
            feature_names: Some(self.feature_names.clone()),
            model_id: self.model_id.clone(),
        }
    }
}

/// Result of fitting columns of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableAnalysis {
    /// One equation per target
    pub functions: Vec<String>,
    /// One accuracy percentage per target
    pub accuracies: Vec<f64>,
    /// Rows used for the fit
    pub data_points: usize,
    /// Input columns that survived sanitization
    pub x_columns: Vec<String>,
    pub y_columns: Vec<String>,
    pub sanitization: SanitizationReport,
    pub model: ModelSummary,
    /// In-sample statistics per target
    pub statistics: Vec<FitStatistics>,
    pub score_source: ScoreSource,
}

/// Input of one manually entered point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointX {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl PointX {
    pub fn width(&self) -> usize {
        match self {
            PointX::Scalar(_) => 1,
            PointX::Vector(values) => values.len(),
        }
    }

    fn values(&self) -> &[f64] {
        match self {
            PointX::Scalar(value) => std::slice::from_ref(value),
            PointX::Vector(values) => values,
        }
    }
}

/// A manually entered point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: PointX,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: impl Into<PointX>, y: f64) -> Self {
        Self { x: x.into(), y }
    }
}

impl From<f64> for PointX {
    fn from(value: f64) -> Self {
        PointX::Scalar(value)
    }
}

impl From<Vec<f64>> for PointX {
    fn from(values: Vec<f64>) -> Self {
        PointX::Vector(values)
    }
}

/// Result of fitting manually entered points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointAnalysis {
    pub function: String,
    /// Accuracy percentage
    pub accuracy: f64,
    pub data_points: usize,
    pub model: ModelSummary,
    pub statistics: FitStatistics,
    pub score_source: ScoreSource,
}

/// Fits models, renders them and answers prediction requests
#[derive(Debug)]
pub struct Analyzer {
    config: AnalyzerConfig,
    selector: ModelSelector,
    equations: EquationSynthesizer,
    registry: Arc<ModelRegistry>,
}

impl Default for Analyzer {
    fn default() -> Self {
        let config = AnalyzerConfig::default();
        Self {
            selector: ModelSelector::new(config.fit.clone()),
            equations: EquationSynthesizer::from_config(&config.fit),
            registry: Arc::new(ModelRegistry::new()),
            config,
        }
    }
}

impl Analyzer {
    /// Create an analyzer with its own registry
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(ModelRegistry::from_config(&config.registry)?);
        Self::with_registry(config, registry)
    }

    /// Create an analyzer sharing an existing registry
    pub fn with_registry(config: AnalyzerConfig, registry: Arc<ModelRegistry>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            selector: ModelSelector::new(config.fit.clone()),
            equations: EquationSynthesizer::from_config(&config.fit),
            registry,
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Fit `targets` on `inputs` of a table
    ///
    /// A single surviving input at degree 1 goes through the degree search;
    /// anything else is one expansion at the requested degree, clamped to
    /// `[1, max_table_degree]`. Every model except a single-input,
    /// single-target search result is registered.
    pub fn analyze_table<S: AsRef<str>>(
        &self,
        table: &Table,
        inputs: &[S],
        targets: &[S],
        degree: usize,
    ) -> Result<TableAnalysis> {
        let data = Sanitizer::new(table).sanitize(inputs, targets)?;
        let degree = self.config.fit.clamp_table_degree(degree);

        let searched = data.input_names.len() == 1 && degree == 1;
        let selection = if searched {
            self.selector.search_degree(
                &data.input_names[0],
                data.inputs.view(),
                data.targets.view(),
            )?
        } else {
            self.selector.fit_fixed(
                &data.input_names,
                degree,
                data.inputs.view(),
                data.targets.view(),
            )?
        };

        let Selection {
            expander,
            fit,
            target_scores,
            source,
            ..
        } = selection;
        let model = FittedModel::new(expander, fit, data.target_names.clone())?;

        let functions = self.equations.equations(&model);
        let accuracies = target_scores
            .iter()
            .map(|&score| self.equations.accuracy(score))
            .collect();
        let statistics = fit_statistics(&model, data.inputs.view(), data.targets.view())?;
        let feature_names = model.feature_names();

        let register = !(searched && model.n_targets() == 1);
        let model_id = register.then(|| self.registry.insert(model.clone()));

        info!(
            inputs = ?data.input_names,
            targets = ?data.target_names,
            degree = model.shape().degree(),
            rows = data.nrows(),
            registered = register,
            "Fitted table model"
        );

        Ok(TableAnalysis {
            functions,
            accuracies,
            data_points: data.nrows(),
            model: ModelSummary::new(&model, feature_names, model_id),
            x_columns: data.input_names,
            y_columns: data.target_names,
            sanitization: data.report,
            statistics,
            score_source: source,
        })
    }

    /// Fit manually entered points
    ///
    /// Scalar inputs go through the degree search over `x`; vector inputs
    /// are fitted linearly with their columns named `a, b, …`. Manual
    /// models are never registered.
    pub fn analyze_points(&self, points: &[DataPoint], target_name: &str) -> Result<PointAnalysis> {
        if points.len() < 2 {
            return Err(ModelError::InsufficientData {
                n_samples: points.len(),
                n_required: 2,
            });
        }

        let width = points[0].x.width();
        if width == 0 {
            return Err(DataError::NoColumnsSelected { role: "X" }.into());
        }
        if let Some(point) = points.iter().find(|p| p.x.width() != width) {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} input values per point", width),
                actual: format!("{} input values", point.x.width()),
            }
            .into());
        }

        let inputs = Array2::from_shape_fn((points.len(), width), |(i, j)| points[i].x.values()[j]);
        let targets = Array2::from_shape_fn((points.len(), 1), |(i, _)| points[i].y);

        let (selection, feature_names) = if width == 1 {
            let selection =
                self.selector
                    .search_degree(MANUAL_VARIABLE, inputs.view(), targets.view())?;
            let names = selection.expander.feature_names();
            (selection, names)
        } else {
            let aliases = letter_aliases(width);
            let selection =
                self.selector
                    .fit_fixed(&aliases, 1, inputs.view(), targets.view())?;
            (selection, aliases)
        };

        let Selection {
            expander,
            fit,
            score,
            source,
            ..
        } = selection;
        let model = FittedModel::new(expander, fit, vec![target_name.to_string()])?;

        let function = self
            .equations
            .equations_with_terms(&model, &feature_names)
            .into_iter()
            .next()
            .unwrap_or_default();
        let statistics = fit_statistics(&model, inputs.view(), targets.view())?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::fit("no statistics for the target", "summarize"))?;

        info!(
            width,
            degree = model.shape().degree(),
            points = points.len(),
            "Fitted manual model"
        );

        Ok(PointAnalysis {
            function,
            accuracy: self.equations.accuracy(score),
            data_points: points.len(),
            model: ModelSummary::new(&model, feature_names, None),
            statistics,
            score_source: source,
        })
    }

    /// Evaluate a prediction request against this analyzer's registry
    pub fn predict(&self, request: &PredictionRequest) -> Result<Predictions> {
        PredictionEvaluator::new(&self.registry).evaluate(request)
    }
}

/// Letter names for `n` columns: `a..z`, then `a1..z1`, `a2..z2`, …
pub fn letter_aliases(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let letter = char::from(b'a' + (i % 26) as u8);
            match i / 26 {
                0 => letter.to_string(),
                round => format!("{}{}", letter, round),
            }
        })
        .collect()
}

fn fit_statistics(
    model: &FittedModel,
    inputs: ArrayView2<f64>,
    targets: ArrayView2<f64>,
) -> Result<Vec<FitStatistics>> {
    let fitted = model.predict(inputs)?;
    let n_features = model.terms().len();

    Ok(model
        .target_names()
        .iter()
        .zip(targets.axis_iter(Axis(1)))
        .zip(fitted.axis_iter(Axis(1)))
        .map(|((name, observed), predicted)| {
            FitStatistics::compute(name.as_str(), observed, predicted, n_features)
        })
        .collect())
}
