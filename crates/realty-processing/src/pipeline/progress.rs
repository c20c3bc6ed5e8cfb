//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline is synchronous, so updates are delivered on the calling
//! thread between stages. Reporters still have to be `Send + Sync` so a
//! [`Pipeline`](crate::Pipeline) can be moved to a worker thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use realty_processing::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process_file("bengaluru_house_prices.csv")?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Reading the source file
    Loading,
    /// Dropping columns irrelevant to pricing
    Pruning,
    /// Removing rows with missing values
    NullFiltering,
    /// Parsing bedroom count and area
    FeatureNormalization,
    /// Computing price per unit area
    DerivedMetrics,
    /// Folding rare locations into the catch-all bucket
    LocationCategorization,
    /// Business-rule floor on area per bedroom
    AreaPerBedroomFilter,
    /// Per-location mean/std trim on price per area
    PricePerAreaFilter,
    /// Cross-bedroom price monotonicity per location
    BedroomPriceFilter,
    /// Bathroom/bedroom plausibility check
    BathroomFilter,
    /// One-hot encoding and matrix assembly
    Encoding,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Pruning => "Pruning Columns",
            Self::NullFiltering => "Dropping Incomplete Rows",
            Self::FeatureNormalization => "Normalizing Features",
            Self::DerivedMetrics => "Deriving Price per Area",
            Self::LocationCategorization => "Categorizing Locations",
            Self::AreaPerBedroomFilter => "Area per Bedroom Filter",
            Self::PricePerAreaFilter => "Price per Area Filter",
            Self::BedroomPriceFilter => "Bedroom Price Filter",
            Self::BathroomFilter => "Bathroom Filter",
            Self::Encoding => "Encoding Features",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// Weights of the processing stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Pruning => 0.03,
            Self::NullFiltering => 0.05,
            Self::FeatureNormalization => 0.15,
            Self::DerivedMetrics => 0.04,
            Self::LocationCategorization => 0.10,
            Self::AreaPerBedroomFilter => 0.06,
            Self::PricePerAreaFilter => 0.12,
            Self::BedroomPriceFilter => 0.12,
            Self::BathroomFilter => 0.06,
            Self::Encoding => 0.12,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Pruning => 0.15,
            Self::NullFiltering => 0.18,
            Self::FeatureNormalization => 0.23,
            Self::DerivedMetrics => 0.38,
            Self::LocationCategorization => 0.42,
            Self::AreaPerBedroomFilter => 0.52,
            Self::PricePerAreaFilter => 0.58,
            Self::BedroomPriceFilter => 0.70,
            Self::BathroomFilter => 0.82,
            Self::Encoding => 0.88,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Number of records still in the dataset after this stage, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_remaining: Option<usize>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            records_remaining: None,
        }
    }

    /// Creates a finished-stage update carrying the surviving record count.
    pub fn stage_done(stage: CleaningStage, records_remaining: usize) -> Self {
        let mut update = Self::new(
            stage,
            1.0,
            format!("{}: {} records remaining", stage.display_name(), records_remaining),
        );
        update.records_remaining = Some(records_remaining);
        update
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            records_remaining: None,
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            records_remaining: None,
        }
    }
}

/// Trait for receiving progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Called once per stage. Implementations should be cheap and non-blocking.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
