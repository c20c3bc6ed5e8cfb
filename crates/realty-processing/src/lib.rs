//! Real-Estate Listing Cleaning Library
//!
//! Turns a raw listings CSV (location, size, area, bathrooms, price plus
//! arbitrary extra columns) into a numeric feature matrix ready for price
//! regression, built on Polars.
//!
//! # Overview
//!
//! The [`Pipeline`] runs these stages in order:
//!
//! - **Loading and pruning**: read every column as text, keep the five
//!   required columns, drop rows with nulls
//! - **Feature normalization**: bedroom count from `"2 BHK"`, area from
//!   `"1056"` or `"2100 - 2850"`, price per square foot
//! - **Location categorization**: rare locations fold into `"other"`
//! - **Outlier removal**: area per bedroom floor, per-location price band,
//!   cross-bedroom price monotonicity, bathroom plausibility
//! - **Encoding**: one-hot locations and an immutable [`Schema`]
//!
//! Unparseable rows are dropped and counted. Only structural problems
//! (missing columns, an empty file) are errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use realty_processing::{Pipeline, PipelineConfig, ReportGenerator};
//!
//! let result = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process_file("bengaluru_house_prices.csv")?;
//!
//! println!("Kept {} of {} rows", result.summary.rows_final, result.summary.rows_loaded);
//! ReportGenerator::new("output").write_outputs(&result)?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use realty_processing::{AreaUnitPolicy, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .location_min_count(10)                       // fold locations seen <= 10 times
//!     .min_area_per_bedroom(300.0)                  // sqft
//!     .area_unit_policy(AreaUnitPolicy::Convert)    // accept "34.46Sq. Meter"
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod encoding;
pub mod error;
pub mod features;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod statistics;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{AreaUnitPolicy, ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use encoding::{ColumnsMetadata, EncodedDataset, NUMERIC_FEATURES, Schema, encode};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use loader::{REQUIRED_COLUMNS, load_listings};
pub use pipeline::{
    CleaningStage, ClosureProgressReporter, OutlierHandler, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use reporting::{CleaningReport, ReportGenerator};
pub use statistics::GroupStats;
pub use types::{
    CleaningSummary, Listing, ParsedListing, PipelineResult, RawListing, StageReport,
};
