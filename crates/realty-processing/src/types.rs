//! Record types flowing through the pipeline and the summary it produces.
//!
//! A listing changes type as it gains information:
//! [`RawListing`] (text as read) → [`ParsedListing`] (numeric features) →
//! [`Listing`] (with price per area). Every stage after that consumes and
//! returns `Listing` values.

use crate::encoding::EncodedDataset;
use crate::pipeline::CleaningStage;
use serde::{Deserialize, Serialize};

/// A listing as it comes out of the null filter, all fields still text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    pub location: String,
    /// Size descriptor such as "2 BHK" or "4 Bedroom".
    pub size: String,
    /// Area as written: "1056", "2100 - 2850", "34.46Sq. Meter", ...
    pub total_sqft: String,
    pub bath: String,
    /// Price in units of `price_unit` (100,000 by default).
    pub price: String,
}

/// A listing with its numeric features parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedListing {
    pub location: String,
    pub bedrooms: u32,
    /// Area in square feet.
    pub area: f64,
    pub bathrooms: u32,
    pub price: f64,
}

/// A fully featured listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub location: String,
    pub bedrooms: u32,
    pub area: f64,
    pub bathrooms: u32,
    pub price: f64,
    pub price_per_area: f64,
}

impl Listing {
    /// Area per bedroom. Infinite for a zero-bedroom listing.
    pub fn area_per_bedroom(&self) -> f64 {
        self.area / f64::from(self.bedrooms)
    }
}

/// Row counts around one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: CleaningStage,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl StageReport {
    pub fn new(stage: CleaningStage, rows_before: usize, rows_after: usize) -> Self {
        Self {
            stage,
            rows_before,
            rows_after,
        }
    }

    /// Number of rows the stage dropped.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Summary of a pipeline run, suitable for a JSON report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Rows in the source file.
    pub rows_loaded: usize,
    /// Rows that reached the feature matrix.
    pub rows_final: usize,
    /// Columns removed by the pruner.
    pub columns_dropped: Vec<String>,
    /// Locations kept as their own category (excluding the catch-all bucket).
    pub frequent_locations: usize,
    /// Width of the final feature matrix.
    pub feature_count: usize,
    pub stages: Vec<StageReport>,
    pub duration_ms: u64,
}

impl CleaningSummary {
    /// Report for a given stage, if it ran.
    pub fn stage(&self, stage: CleaningStage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    /// Total rows dropped across all stages.
    pub fn rows_removed(&self) -> usize {
        self.rows_loaded.saturating_sub(self.rows_final)
    }
}

/// Output of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Cleaned listings in the same row order as the feature matrix.
    pub listings: Vec<Listing>,
    pub encoded: EncodedDataset,
    pub summary: CleaningSummary,
}
