//! Output files of a cleaning run.
//!
//! [`ReportGenerator`] writes into a single output directory:
//!
//! - `cleaned_dataset.csv`: the encoded feature matrix with the target last
//! - `columns.json`: the matrix column names, for the prediction service
//! - `<name>_report.json`: a [`CleaningReport`] with per-stage row counts
//!
//! The same [`CleaningReport`] is what the CLI prints with `--json`.

mod generator;

pub use generator::{COLUMNS_FILE, CleaningReport, DATASET_FILE, ReportGenerator};
