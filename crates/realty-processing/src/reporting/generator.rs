use crate::error::{Result, ResultExt};
use crate::types::{CleaningSummary, PipelineResult};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the exported feature matrix.
pub const DATASET_FILE: &str = "cleaned_dataset.csv";
/// File name of the column metadata.
pub const COLUMNS_FILE: &str = "columns.json";

/// Summary of a cleaning run for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Local time the report was generated.
    pub generated_at: String,
    pub input_file: String,
    /// Path of the exported dataset, if it was written.
    pub output_file: Option<String>,
    pub summary: CleaningSummary,
    /// Lower-cased matrix columns, as written to `columns.json`.
    pub data_columns: Vec<String>,
}

/// Writes datasets, metadata and reports into an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the encoded dataset and `columns.json`.
    ///
    /// Returns the path of the dataset file.
    pub fn write_outputs(&self, result: &PipelineResult) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let output_path = self.output_dir.join(DATASET_FILE);
        let mut df = result.encoded.to_dataframe()?;
        let mut file = File::create(&output_path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)
            .context(format!("Failed to write {}", output_path.display()))?;
        info!("Dataset saved: {}", output_path.display());

        self.write_columns(result)?;
        Ok(output_path)
    }

    /// Write `columns.json` for the encoded schema.
    pub fn write_columns(&self, result: &PipelineResult) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(COLUMNS_FILE);
        result.encoded.schema.to_metadata().write(&path)?;
        info!("Column metadata saved: {}", path.display());
        Ok(path)
    }

    pub fn build_report(
        input_file: &str,
        output_file: Option<&Path>,
        result: &PipelineResult,
    ) -> CleaningReport {
        CleaningReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(|p| p.display().to_string()),
            summary: result.summary.clone(),
            data_columns: result.encoded.schema.data_columns(),
        }
    }

    /// Write a report as `<base_name>_report.json`.
    pub fn write_report(&self, report: &CleaningReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{base_name}_report.json"));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
