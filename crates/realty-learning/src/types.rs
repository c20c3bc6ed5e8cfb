//! Common types used throughout the realty-learning crate.
//!
//! - [`TrainingResult`]: Complete result from [`TrainingPipeline::train()`](crate::TrainingPipeline::train)
//! - [`Metrics`]: R² scores of the chosen model
//! - [`ModelComparison`]: Cross-validation scores of one search candidate
//! - [`ModelInfo`]: Metadata about a trained model

use crate::config::Algorithm;
use serde::{Deserialize, Serialize};

/// Result of a training pipeline run.
///
/// Returned by [`TrainingPipeline::train()`](crate::TrainingPipeline::train)
/// alongside the fitted [`TrainedModel`](crate::TrainedModel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TrainingResult {
    /// Name of the chosen candidate, e.g. `"linear_regression"` or `"lasso(alpha=1)"`.
    pub best_model_name: String,

    pub algorithm: Algorithm,

    /// Penalty of the chosen candidate. `None` for linear regression.
    pub alpha: Option<f64>,

    /// Scores of the chosen candidate.
    pub metrics: Metrics,

    /// Fitted coefficient per feature column, in schema order.
    pub coefficients: Vec<(String, f64)>,

    /// Every candidate that finished cross-validation, in search order.
    pub model_comparison: Vec<ModelComparison>,

    /// Wall-clock time from start to finish.
    pub training_time_seconds: f64,

    /// Non-fatal issues, such as candidates that failed to fit.
    pub warnings: Vec<String>,
}

/// R² scores of a fitted model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Metrics {
    /// R² on the held-out test split.
    pub test_r2: f64,

    /// R² on the training split the model was fitted on.
    pub train_r2: f64,

    /// R² of each shuffle-split round.
    pub cv_scores: Vec<f64>,

    /// Mean of `cv_scores`.
    pub cv_mean: f64,

    pub n_train: usize,
    pub n_test: usize,
}

/// Cross-validation result of one candidate in the model search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ModelComparison {
    pub name: String,
    pub algorithm: Algorithm,
    pub alpha: Option<f64>,
    pub cv_scores: Vec<f64>,
    pub cv_mean: f64,
}

/// Metadata about a trained model.
///
/// Returned by [`TrainedModel::get_info()`](crate::TrainedModel::get_info).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ModelInfo {
    pub best_model_name: String,
    pub algorithm: Algorithm,

    /// Feature columns the model expects, in order.
    pub feature_names: Vec<String>,

    /// Locations with their own indicator column.
    pub locations: Vec<String>,

    /// Label of the reference location, predicted with all indicators at zero.
    pub other_label: String,

    pub metrics: Metrics,

    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
}
