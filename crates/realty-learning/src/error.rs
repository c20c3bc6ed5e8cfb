//! Error types for the realty-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Example
//!
//! ```no_run
//! use realty_learning::{LearningError, TrainingConfig};
//!
//! fn configure() -> Result<TrainingConfig, LearningError> {
//!     // Errors are automatically propagated with ?
//!     let config = TrainingConfig::builder().test_size(0.25).build()?;
//!     Ok(config)
//! }
//! ```

use realty_processing::ProcessingError;
use thiserror::Error;

/// The main error type for realty-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer.
    ///
    /// Check the error message for the offending field and the accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cleaned dataset cannot be used for training.
    ///
    /// Common causes:
    /// - Too few rows to split into train and test sets
    /// - The feature matrix and target have different lengths
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Fitting or scoring a model failed.
    ///
    /// During a model search this is only returned when every candidate failed.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// The specified model file was not found.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A prediction was requested for a location the model was not trained on.
    #[error("Unknown location '{0}'")]
    UnknownLocation(String),

    /// The cleaning pipeline failed.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// I/O error during model save/load operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The model artifact could not be serialized or parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LearningError {
    /// Stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::UnknownLocation(_) => "UNKNOWN_LOCATION",
            Self::Processing(e) => e.error_code(),
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Lift a processing error, surfacing lookup failures as
    /// [`UnknownLocation`](Self::UnknownLocation).
    pub(crate) fn from_lookup(err: ProcessingError) -> Self {
        match err {
            ProcessingError::UnknownLocation(location) => Self::UnknownLocation(location),
            other => Self::Processing(other),
        }
    }
}
