//! CSV ingestion.
//!
//! Every column is read as text. The `total_sqft` column mixes plain numbers,
//! ranges and unit-suffixed values, so numeric inference is left to the
//! feature normalizer instead of the CSV reader.

use crate::error::{ProcessingError, Result, ResultExt};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Columns the pipeline needs, in output order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["location", "size", "total_sqft", "bath", "price"];

/// Read a listings CSV with a header row.
///
/// Fails with [`ProcessingError::MissingColumns`] if any required column is
/// absent and with [`ProcessingError::EmptyDataset`] if the file has no data
/// rows. Both checks happen before any transformation.
pub fn load_listings(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Loading listings from {}", path.display());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    validate_schema(&df)?;
    info!("Loaded {} rows x {} columns", df.height(), df.width());
    Ok(df)
}

/// Check that `df` has every required column and at least one row.
pub fn validate_schema(df: &DataFrame) -> Result<()> {
    let present: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !present.contains(required))
        .map(|c| c.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ProcessingError::MissingColumns(missing));
    }
    if df.height() == 0 {
        return Err(ProcessingError::EmptyDataset);
    }
    Ok(())
}
