//! Configuration types for the training pipeline.
//!
//! This module provides [`TrainingConfig`] and its builder, as well as the
//! [`Algorithm`] enum.
//!
//! # Example
//!
//! ```
//! use realty_learning::{Algorithm, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .algorithm(Algorithm::LinearRegression)
//!     .test_size(0.2)
//!     .random_seed(10)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::LearningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regression algorithms available to the model search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Algorithm {
    /// Ordinary least squares with an intercept.
    LinearRegression,

    /// L1-penalised least squares. Tried once per configured alpha.
    Lasso,
}

impl Algorithm {
    /// # Examples
    ///
    /// ```
    /// use realty_learning::Algorithm;
    ///
    /// assert_eq!(Algorithm::LinearRegression.as_str(), "linear_regression");
    /// assert_eq!(Algorithm::Lasso.as_str(), "lasso");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::LinearRegression => "linear_regression",
            Algorithm::Lasso => "lasso",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = LearningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear_regression" | "linear" => Ok(Algorithm::LinearRegression),
            "lasso" => Ok(Algorithm::Lasso),
            other => Err(LearningError::InvalidConfig(format!(
                "unknown algorithm '{other}' (expected linear_regression or lasso)"
            ))),
        }
    }
}

/// Configuration for the training pipeline.
///
/// Use [`TrainingConfig::builder()`] to construct a validated configuration.
///
/// # Validation
///
/// The builder checks on [`build()`](TrainingConfigBuilder::build):
/// - `test_size` and `cv_test_size` are in `(0.0, 1.0)`
/// - `cv_splits` is at least 1
/// - `lasso_alphas` is non-empty and every alpha is finite and positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of the cleaned rows held out for the final test score (default: 0.2).
    pub test_size: f64,

    /// Seed of the train/test shuffle (default: 10).
    pub random_seed: u64,

    /// Number of shuffle-split rounds per candidate (default: 5).
    pub cv_splits: u32,

    /// Fraction held out in each shuffle-split round (default: 0.2).
    pub cv_test_size: f64,

    /// Seed of the shuffle-split rounds (default: 0).
    pub cv_seed: u64,

    /// Force a single algorithm instead of searching (default: `None`).
    ///
    /// Forcing [`Algorithm::Lasso`] still searches over `lasso_alphas`.
    pub algorithm: Option<Algorithm>,

    /// Penalties tried for Lasso (default: `[1.0, 2.0]`).
    pub lasso_alphas: Vec<f64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_seed: 10,
            cv_splits: 5,
            cv_test_size: 0.2,
            cv_seed: 0,
            algorithm: None,
            lasso_alphas: vec![1.0, 2.0],
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), LearningError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(LearningError::InvalidConfig(
                "test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        if !(self.cv_test_size > 0.0 && self.cv_test_size < 1.0) {
            return Err(LearningError::InvalidConfig(
                "cv_test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        if self.cv_splits == 0 {
            return Err(LearningError::InvalidConfig(
                "cv_splits must be at least 1".to_string(),
            ));
        }

        if self.lasso_alphas.is_empty() {
            return Err(LearningError::InvalidConfig(
                "lasso_alphas must not be empty".to_string(),
            ));
        }

        if let Some(alpha) = self
            .lasso_alphas
            .iter()
            .find(|a| !a.is_finite() || **a <= 0.0)
        {
            return Err(LearningError::InvalidConfig(format!(
                "lasso_alphas must be positive, got {alpha}"
            )));
        }

        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
///
/// All setters return `self` to allow method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the test size fraction (default: 0.2).
    #[must_use]
    pub fn test_size(mut self, size: f64) -> Self {
        self.config.test_size = size;
        self
    }

    /// Set the train/test shuffle seed (default: 10).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the number of shuffle-split rounds (default: 5).
    #[must_use]
    pub fn cv_splits(mut self, splits: u32) -> Self {
        self.config.cv_splits = splits;
        self
    }

    #[must_use]
    pub fn cv_test_size(mut self, size: f64) -> Self {
        self.config.cv_test_size = size;
        self
    }

    #[must_use]
    pub fn cv_seed(mut self, seed: u64) -> Self {
        self.config.cv_seed = seed;
        self
    }

    /// Skip the search and train only this algorithm.
    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = Some(algorithm);
        self
    }

    #[must_use]
    pub fn lasso_alphas(mut self, alphas: impl Into<Vec<f64>>) -> Self {
        self.config.lasso_alphas = alphas.into();
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] naming the first invalid field.
    pub fn build(self) -> Result<TrainingConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
