//! Fluent models
//!
//! Regression model synthesis and formula-driven prediction:
//!
//! - [`select`]: degree search and fixed polynomial expansions over
//!   ordinary least squares ([`lm`])
//! - [`equation`]: canonical signed equation strings
//! - [`registry`]: bounded in-memory store of fitted models
//! - [`predict`]: prediction from a registered model or from bare
//!   coefficients and feature names
//! - [`analysis`]: the [`Analyzer`] tying these together
//!
//! ```
//! use fluent_core::data::Table;
//! use fluent_models::{Analyzer, PredictionRequest, Predictions};
//!
//! let table = Table::from_rows(
//!     ["x", "y"],
//!     vec![vec!["1", "2"], vec!["2", "4"], vec!["3", "6"], vec!["4", "8"]],
//! )?;
//!
//! let analyzer = Analyzer::default();
//! let analysis = analyzer.analyze_table(&table, &["x"], &["y"], 1)?;
//! assert_eq!(analysis.functions, vec!["y(x) = 2.0*x + 0.0"]);
//!
//! let request = analysis.model.prediction_request(vec![5.0.into()]);
//! let predictions = analyzer.predict(&request)?;
//! assert!(matches!(predictions, Predictions::Single(ref v) if (v[0] - 10.0).abs() < 1e-9));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod base;
pub mod config;
pub mod equation;
pub mod error;
pub mod lm;
pub mod predict;
pub mod registry;
pub mod select;

pub use analysis::{Analyzer, DataPoint, ModelSummary, PointAnalysis, PointX, TableAnalysis};
pub use base::{FitStatistics, FittedModel, ModelShape, Result};
pub use config::{AnalyzerConfig, FitConfig, RegistryConfig};
pub use equation::EquationSynthesizer;
pub use error::ModelError;
pub use lm::{OlsFit, TrainTestSplit};
pub use predict::{PredictionEvaluator, PredictionRequest, Predictions, RawInput};
pub use registry::ModelRegistry;
pub use select::{ModelSelector, ScoreSource, Selection};
