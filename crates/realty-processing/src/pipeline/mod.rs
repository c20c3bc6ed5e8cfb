//! Pipeline module.
//!
//! [`Pipeline`] drives the cleaning stages in order; [`OutlierHandler`]
//! holds the record-level filters and [`progress`] the reporting types.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::OutlierHandler;
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
