//! Custom error types for the listing cleaning pipeline.
//!
//! Only structural problems surface as errors. Rows that fail to parse are
//! dropped by the stage that sees them and never reach this type.
//!
//! Errors are serializable so a caller can hand them to a frontend or write
//! them into a JSON report as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// One or more required columns are absent from the input file.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The input file has a header but no data rows.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Every record was filtered out before the named stage could run.
    #[error("No records remaining after stage '{0}'")]
    NoRecordsRemaining(String),

    /// A location was requested that is not part of the encoded schema.
    #[error("Unknown location '{0}'")]
    UnknownLocation(String),

    /// A schema does not describe a valid feature layout.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::NoRecordsRemaining(_) => "NO_RECORDS_REMAINING",
            Self::UnknownLocation(_) => "UNKNOWN_LOCATION",
            Self::InvalidSchema(_) => "INVALID_SCHEMA",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a schema problem with the input file.
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::MissingColumns(_) => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }

    /// Check if this error is a prediction-time lookup failure.
    pub fn is_lookup_error(&self) -> bool {
        match self {
            Self::UnknownLocation(_) => true,
            Self::WithContext { source, .. } => source.is_lookup_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}
