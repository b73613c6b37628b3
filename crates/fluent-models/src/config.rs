//! Analyzer configuration
//!
//! All structs deserialize with `#[serde(default)]`, so a partial JSON
//! document only overrides the fields it names.

use serde::{Deserialize, Serialize};

use crate::base::{ModelError, Result};

/// Highest degree any configuration may request
pub const MAX_SUPPORTED_DEGREE: usize = 10;

/// Model fitting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Upper clamp for the requested degree on the table path
    pub max_table_degree: usize,
    /// Highest degree tried by the single-variable degree search
    pub max_search_degree: usize,
    /// Scores are held out only when the row count exceeds this
    pub holdout_min_rows: usize,
    /// Fraction of rows held out for scoring
    pub test_fraction: f64,
    /// Seed of the train/test shuffle
    pub split_seed: u64,
    /// Decimal places of coefficients in equations
    pub coefficient_decimals: u32,
    /// Decimal places of accuracy percentages
    pub accuracy_decimals: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_table_degree: 2,
            max_search_degree: 3,
            holdout_min_rows: 50,
            test_fraction: 0.2,
            split_seed: 42,
            coefficient_decimals: 4,
            accuracy_decimals: 2,
        }
    }
}

impl FitConfig {
    /// Set the table-path degree clamp
    pub fn with_max_table_degree(mut self, degree: usize) -> Self {
        self.max_table_degree = degree;
        self
    }

    /// Set the highest searched degree
    pub fn with_max_search_degree(mut self, degree: usize) -> Self {
        self.max_search_degree = degree;
        self
    }

    /// Set the row count above which scores are held out
    pub fn with_holdout_min_rows(mut self, rows: usize) -> Self {
        self.holdout_min_rows = rows;
        self
    }

    /// Set the shuffle seed
    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    /// Clamp a requested degree into `[1, max_table_degree]`
    pub fn clamp_table_degree(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_table_degree)
    }

    /// Check that every field is in range
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SUPPORTED_DEGREE).contains(&self.max_table_degree) {
            return Err(ModelError::config(format!(
                "max_table_degree must be in 1..={}, got {}",
                MAX_SUPPORTED_DEGREE, self.max_table_degree
            )));
        }
        if !(1..=MAX_SUPPORTED_DEGREE).contains(&self.max_search_degree) {
            return Err(ModelError::config(format!(
                "max_search_degree must be in 1..={}, got {}",
                MAX_SUPPORTED_DEGREE, self.max_search_degree
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ModelError::config(format!(
                "test_fraction must be strictly between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        if self.coefficient_decimals > 15 || self.accuracy_decimals > 15 {
            return Err(ModelError::config("decimal places must not exceed 15"));
        }
        Ok(())
    }
}

/// Model registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of retained models; the least recently used is evicted
    pub capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl RegistryConfig {
    /// Check that every field is in range
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ModelError::config("registry capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Fitting configuration
    pub fit: FitConfig,
    /// Registry configuration
    pub registry: RegistryConfig,
}

impl AnalyzerConfig {
    /// Parse a configuration from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ModelError::config(format!("failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check both sections
    pub fn validate(&self) -> Result<()> {
        self.fit.validate()?;
        self.registry.validate()
    }
}
