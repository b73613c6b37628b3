//! Core types for fitted models
//!
//! This module defines the fitted model that the selector produces, the
//! registry stores and the predictor replays, together with the per-target
//! fit statistics reported alongside it.

pub use model::{linear_combination, FittedModel, ModelShape};
pub use statistics::FitStatistics;

pub use crate::error::ModelError;
pub use fluent_core::data::{Matrix, Vector};

pub mod model;
pub mod statistics;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
