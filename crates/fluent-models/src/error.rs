//! Model-related error types

use thiserror::Error;

use fluent_core::data::DataError;
use fluent_core::terms::TermError;

/// Model-related errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Column selection or coercion failed
    #[error("Sanitization error: {0}")]
    Sanitization(DataError),

    /// Feature term construction, parsing or expansion failed
    #[error("Feature term error: {0}")]
    Term(#[from] TermError),

    /// Too few rows to fit the requested model
    #[error("Not enough data: {n_samples} rows, at least {n_required} required")]
    InsufficientData {
        /// Number of usable rows
        n_samples: usize,
        /// Number of rows the model needs
        n_required: usize,
    },

    /// Numerical fit failure
    #[error("Model fit failed: {message} (operation: {operation})")]
    ModelFit {
        /// Error message
        message: String,
        /// Operation that failed
        operation: String,
    },

    /// Singular design matrix encountered
    #[error("Singular design matrix: {0}")]
    SingularMatrix(String),

    /// Input rows cannot be reconciled with the model's features
    #[error("Prediction shape error: {message}")]
    PredictionShape {
        /// What did not line up
        message: String,
    },

    /// Model identifier not present in the registry
    #[error("Model '{0}' not found; it may have expired, supply coefficients instead")]
    ModelNotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Configuration error message
        message: String,
    },
}

impl ModelError {
    /// Create a fit error
    pub fn fit(message: impl Into<String>, operation: impl Into<String>) -> Self {
        ModelError::ModelFit {
            message: message.into(),
            operation: operation.into(),
        }
    }

    /// Create a prediction shape error
    pub fn shape(message: impl Into<String>) -> Self {
        ModelError::PredictionShape {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ModelError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether the error is a numerical fit failure
    pub fn is_fit_failure(&self) -> bool {
        matches!(
            self,
            ModelError::ModelFit { .. } | ModelError::SingularMatrix(_)
        )
    }
}

impl From<DataError> for ModelError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::InsufficientRows { rows, required } => ModelError::InsufficientData {
                n_samples: rows,
                n_required: required,
            },
            other => ModelError::Sanitization(other),
        }
    }
}
