//! Progress reporting types for the training pipeline.
//!
//! This module defines [`TrainingStage`], [`ProgressUpdate`] and the
//! [`ProgressCallback`] type alias.
//!
//! # Example
//!
//! ```
//! use realty_learning::{ProgressUpdate, TrainingPipeline};
//!
//! let pipeline = TrainingPipeline::builder()
//!     .on_progress(|update: ProgressUpdate| {
//!         println!(
//!             "{:>5.1}% {:<12} {}",
//!             update.progress * 100.0,
//!             update.stage.as_str(),
//!             update.message
//!         );
//!         if let (Some(name), Some((done, total))) = (&update.current_model, update.models_completed) {
//!             println!("        candidate {name} ({done} of {total} scored)");
//!         }
//!     })
//!     .build();
//! ```

use std::str::FromStr;
use std::sync::Arc;

/// The current stage of the training pipeline.
///
/// Training progresses through these stages in order:
///
/// 1. [`Initializing`](Self::Initializing) - Validating configuration
/// 2. [`Cleaning`](Self::Cleaning) - Running the listing cleaning pipeline
/// 3. [`Splitting`](Self::Splitting) - Shuffled train/test split
/// 4. [`ModelSearch`](Self::ModelSearch) - Cross-validating every candidate
/// 5. [`Training`](Self::Training) - Fitting the chosen candidate
/// 6. [`Evaluation`](Self::Evaluation) - Scoring on the held-out split
/// 7. [`Complete`](Self::Complete) - Training finished successfully
///
/// Terminal states: [`Complete`](Self::Complete), [`Failed`](Self::Failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TrainingStage {
    #[default]
    Initializing,

    /// The cleaning pipeline is running.
    ///
    /// Skipped when training starts from an already encoded dataset.
    Cleaning,

    Splitting,

    /// Shuffle-split cross-validation of each candidate model.
    ModelSearch,

    Training,

    Evaluation,

    /// Training completed successfully.
    Complete,

    /// Training failed. Check the message for details.
    Failed,
}

impl TrainingStage {
    /// Every stage, in pipeline order.
    pub const ALL: [TrainingStage; 8] = [
        TrainingStage::Initializing,
        TrainingStage::Cleaning,
        TrainingStage::Splitting,
        TrainingStage::ModelSearch,
        TrainingStage::Training,
        TrainingStage::Evaluation,
        TrainingStage::Complete,
        TrainingStage::Failed,
    ];

    /// Returns the snake_case name of the stage.
    ///
    /// # Examples
    ///
    /// ```
    /// use realty_learning::TrainingStage;
    ///
    /// assert_eq!(TrainingStage::Training.as_str(), "training");
    /// assert_eq!(TrainingStage::ModelSearch.as_str(), "model_search");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStage::Initializing => "initializing",
            TrainingStage::Cleaning => "cleaning",
            TrainingStage::Splitting => "splitting",
            TrainingStage::ModelSearch => "model_search",
            TrainingStage::Training => "training",
            TrainingStage::Evaluation => "evaluation",
            TrainingStage::Complete => "complete",
            TrainingStage::Failed => "failed",
        }
    }

    /// Returns `true` for [`Complete`](Self::Complete) and [`Failed`](Self::Failed).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainingStage::Complete | TrainingStage::Failed)
    }
}

/// Returned when a string names no [`TrainingStage`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown training stage '{0}' (expected one of: {names})", names = stage_names())]
pub struct ParseTrainingStageError(String);

impl ParseTrainingStageError {
    /// The rejected input.
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.0
    }
}

fn stage_names() -> String {
    TrainingStage::ALL
        .iter()
        .map(TrainingStage::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for TrainingStage {
    type Err = ParseTrainingStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseTrainingStageError(s.to_string()))
    }
}

/// A progress update from the training pipeline.
///
/// # Example
///
/// ```
/// use realty_learning::{ProgressUpdate, TrainingStage};
///
/// let update = ProgressUpdate {
///     stage: TrainingStage::ModelSearch,
///     progress: 0.5,
///     message: "Cross-validating lasso (alpha=1)".to_string(),
///     current_model: Some("lasso".to_string()),
///     models_completed: Some((1, 3)),
/// };
///
/// assert!(!update.stage.is_terminal());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressUpdate {
    pub stage: TrainingStage,

    /// Overall progress from 0.0 to 1.0, increasing monotonically.
    pub progress: f64,

    pub message: String,

    /// Candidate currently being evaluated or fitted, if any.
    pub current_model: Option<String>,

    /// Candidates evaluated so far and in total, during the model search.
    pub models_completed: Option<(u32, u32)>,
}

impl ProgressUpdate {
    pub(crate) fn new(stage: TrainingStage, progress: f64, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Type alias for a progress callback function.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use realty_learning::{ProgressCallback, ProgressUpdate, TrainingStage};
///
/// let callback: ProgressCallback = Arc::new(|update: ProgressUpdate| {
///     if update.stage == TrainingStage::Failed {
///         eprintln!("training failed: {}", update.message);
///     }
/// });
/// ```
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_stage_roundtrip() {
        for stage in TrainingStage::ALL {
            let parsed: TrainingStage = stage.as_str().parse().unwrap();
            assert_eq!(parsed, stage);
        }
    }

    #[test]
    fn test_training_stage_from_str_invalid() {
        let err = "explainability".parse::<TrainingStage>().unwrap_err();
        assert_eq!(err.invalid_value(), "explainability");
        assert!(err.to_string().contains("model_search"));
    }

    #[test]
    fn test_training_stage_is_terminal() {
        let terminal: Vec<_> = TrainingStage::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&TrainingStage::Complete, &TrainingStage::Failed]);
    }

    #[test]
    fn test_progress_update_clamps() {
        let update = ProgressUpdate::new(TrainingStage::Training, 1.7, "fitting");
        assert_eq!(update.progress, 1.0);
        assert_eq!(update.current_model, None);
    }
}
