//! The cleaning pipeline and its builder.

use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::encoding::encode;
use crate::error::{ProcessingError, Result};
use crate::features::{add_price_per_area, categorize_locations, normalize_listings};
use crate::loader::{load_listings, validate_schema};
use crate::pipeline::OutlierHandler;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::types::{CleaningSummary, Listing, PipelineResult, StageReport};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The listing cleaning pipeline.
///
/// Runs every stage in a fixed order: prune, null filter, normalize, price
/// per area, location categorization, the three outlier passes, the
/// bathroom filter and finally encoding. Each stage is a pure function of
/// the previous stage's output.
///
/// # Example
///
/// ```rust,ignore
/// use realty_processing::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().location_min_count(10).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process_file("bengaluru_house_prices.csv")?;
///
/// println!("{} listings, {} features", result.summary.rows_final, result.summary.feature_count);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a CSV file and run the pipeline on it.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<PipelineResult> {
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Loading,
            0.0,
            format!("Loading {}", path.as_ref().display()),
        ));
        match load_listings(path) {
            Ok(df) => self.process(df),
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Run the pipeline on an already loaded frame.
    ///
    /// # Errors
    ///
    /// Fails before any transformation if a required column is missing or
    /// the frame is empty, and with [`ProcessingError::NoRecordsRemaining`]
    /// if the filters leave nothing to encode. Unparseable rows are dropped,
    /// not reported as errors.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Pipeline complete: {} listings, {} features",
                    result.summary.rows_final, result.summary.feature_count
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn finish_stage(
        &self,
        summary: &mut CleaningSummary,
        stage: CleaningStage,
        rows_before: usize,
        rows_after: usize,
    ) {
        let report = StageReport::new(stage, rows_before, rows_after);
        info!(
            "{}: {} -> {} rows ({} removed)",
            stage.display_name(),
            rows_before,
            rows_after,
            report.rows_removed()
        );
        if rows_before > 0 && rows_after == 0 {
            warn!("{} removed every remaining record", stage.display_name());
        }
        summary.stages.push(report);
        self.report_progress(ProgressUpdate::stage_done(stage, rows_after));
    }

    /// Apply a record-level stage and record its row counts.
    fn run_stage<F>(
        &self,
        summary: &mut CleaningSummary,
        stage: CleaningStage,
        listings: Vec<Listing>,
        apply: F,
    ) -> Vec<Listing>
    where
        F: FnOnce(&[Listing]) -> Vec<Listing>,
    {
        self.report_progress(ProgressUpdate::new(stage, 0.0, stage.display_name()));
        let out = apply(&listings);
        self.finish_stage(summary, stage, listings.len(), out.len());
        out
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let config = &self.config;

        validate_schema(&df)?;
        info!("Starting cleaning pipeline on {} rows", df.height());

        let mut summary = CleaningSummary {
            rows_loaded: df.height(),
            ..Default::default()
        };
        self.finish_stage(&mut summary, CleaningStage::Loading, df.height(), df.height());

        // frame-level stages
        self.report_progress(ProgressUpdate::new(CleaningStage::Pruning, 0.0, "Pruning columns"));
        let (df, dropped) = DataCleaner::prune_columns(&df)?;
        summary.columns_dropped = dropped;
        self.finish_stage(&mut summary, CleaningStage::Pruning, df.height(), df.height());

        self.report_progress(ProgressUpdate::new(
            CleaningStage::NullFiltering,
            0.0,
            "Dropping incomplete rows",
        ));
        let complete = DataCleaner::drop_incomplete_rows(&df)?;
        let raw = DataCleaner::extract_raw_listings(&complete)?;
        self.finish_stage(&mut summary, CleaningStage::NullFiltering, df.height(), raw.len());

        // record-level stages
        self.report_progress(ProgressUpdate::new(
            CleaningStage::FeatureNormalization,
            0.0,
            "Parsing size and area",
        ));
        let parsed = normalize_listings(&raw, config);
        self.finish_stage(
            &mut summary,
            CleaningStage::FeatureNormalization,
            raw.len(),
            parsed.len(),
        );

        let listings = add_price_per_area(&parsed, config.price_unit);
        self.finish_stage(
            &mut summary,
            CleaningStage::DerivedMetrics,
            parsed.len(),
            listings.len(),
        );

        let listings = self.run_stage(
            &mut summary,
            CleaningStage::LocationCategorization,
            listings,
            |l| categorize_locations(l, config.location_min_count, &config.other_label),
        );
        let listings = self.run_stage(
            &mut summary,
            CleaningStage::AreaPerBedroomFilter,
            listings,
            |l| OutlierHandler::remove_area_per_bedroom_outliers(l, config.min_area_per_bedroom),
        );
        let listings = self.run_stage(
            &mut summary,
            CleaningStage::PricePerAreaFilter,
            listings,
            OutlierHandler::remove_price_per_area_outliers,
        );
        let listings = self.run_stage(
            &mut summary,
            CleaningStage::BedroomPriceFilter,
            listings,
            |l| OutlierHandler::remove_bedroom_price_outliers(l, config.bedroom_comparison_min_count),
        );
        let listings = self.run_stage(
            &mut summary,
            CleaningStage::BathroomFilter,
            listings,
            |l| OutlierHandler::remove_bathroom_outliers(l, config.max_extra_bathrooms),
        );

        if listings.is_empty() {
            let emptied_by = summary
                .stages
                .iter()
                .find(|s| s.rows_after == 0)
                .map_or(CleaningStage::BathroomFilter, |s| s.stage);
            return Err(ProcessingError::NoRecordsRemaining(
                emptied_by.display_name().to_string(),
            ));
        }

        self.report_progress(ProgressUpdate::new(
            CleaningStage::Encoding,
            0.0,
            "Encoding locations",
        ));
        let encoded = encode(&listings, &config.other_label)?;
        self.finish_stage(
            &mut summary,
            CleaningStage::Encoding,
            listings.len(),
            encoded.n_rows(),
        );

        summary.frequent_locations = listings
            .iter()
            .map(|l| l.location.as_str())
            .filter(|l| *l != config.other_label)
            .collect::<BTreeSet<_>>()
            .len();
        summary.rows_final = encoded.n_rows();
        summary.feature_count = encoded.schema.width();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaning complete in {}ms: {} of {} rows kept, {} feature columns",
            summary.duration_ms, summary.rows_final, summary.rows_loaded, summary.feature_count
        );

        Ok(PipelineResult {
            listings,
            encoded,
            summary,
        })
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Shorthand for [`progress_reporter`](Self::progress_reporter) with a
    /// [`ClosureProgressReporter`].
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Twelve Whitefield listings at 4000..5100 per sqft and two rare
    /// locations that fold into the catch-all bucket.
    fn frame() -> DataFrame {
        let mut location = vec!["Whitefield"; 12];
        let mut size = vec!["2 BHK"; 12];
        let mut total_sqft = vec!["1000"; 12];
        let mut bath = vec!["2"; 12];
        let prices: Vec<String> = (0..12).map(|i| format!("{}", 40 + i)).collect();
        let mut price: Vec<&str> = prices.iter().map(String::as_str).collect();

        location.extend(["Kengeri", "Anekal"]);
        size.extend(["2 BHK", "3 Bedroom"]);
        total_sqft.extend(["1000", "1500"]);
        bath.extend(["2", "3"]);
        price.extend(["50", "90"]);

        df!(
            "availability" => vec!["Ready To Move"; 14],
            "location" => location,
            "size" => size,
            "total_sqft" => total_sqft,
            "bath" => bath,
            "price" => price
        )
        .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &PipelineConfig::default());
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            other_label: String::new(),
            ..Default::default()
        };
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_process_runs_every_stage() {
        let result = Pipeline::builder().build().unwrap().process(frame()).unwrap();
        let summary = &result.summary;

        // Whitefield: mean 4550, std ~345 keeps 4300..4800 (six rows)
        // other: 5000 and 6000, band (5000, 6000] keeps only 6000
        assert_eq!(summary.rows_loaded, 14);
        assert_eq!(summary.rows_final, 7);
        assert_eq!(summary.columns_dropped, vec!["availability".to_string()]);
        assert_eq!(summary.frequent_locations, 1);
        assert_eq!(summary.feature_count, 4);
        assert_eq!(
            summary.stage(CleaningStage::PricePerAreaFilter).map(|s| s.rows_removed()),
            Some(7)
        );
        assert_eq!(result.listings.len(), result.encoded.n_rows());
    }

    #[test]
    fn test_progress_callback_sees_stages_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        Pipeline::builder()
            .on_progress(move |update| {
                if update.stage_progress >= 1.0 {
                    sink.lock().unwrap().push(update.stage);
                }
            })
            .build()
            .unwrap()
            .process(frame())
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&CleaningStage::Loading));
        assert_eq!(seen.last(), Some(&CleaningStage::Complete));
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_missing_column_fails_before_processing() {
        let df = df!("location" => ["Hebbal"], "price" => ["50"]).unwrap();
        let failed = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&failed);

        let err = Pipeline::builder()
            .on_progress(move |update| {
                if update.stage == CleaningStage::Failed {
                    *flag.lock().unwrap() = true;
                }
            })
            .build()
            .unwrap()
            .process(df)
            .unwrap_err();

        assert!(err.is_schema_error());
        assert!(*failed.lock().unwrap());
    }

    #[test]
    fn test_everything_filtered_is_reported() {
        let df = df!(
            "location" => ["Hebbal"],
            "size" => ["2 BHK"],
            "total_sqft" => ["1200"],
            "bath" => ["2"],
            "price" => ["60"]
        )
        .unwrap();

        let err = Pipeline::builder().build().unwrap().process(df).unwrap_err();

        assert_eq!(err.error_code(), "NO_RECORDS_REMAINING");
        assert!(err.to_string().contains(CleaningStage::PricePerAreaFilter.display_name()));
    }
}
