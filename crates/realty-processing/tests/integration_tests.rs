//! Integration tests for the listing cleaning pipeline.
//!
//! These run the full pipeline over the CSV fixtures and check the
//! invariants every stage promises on its output.

use realty_processing::cleaner::DataCleaner;
use realty_processing::features::{add_price_per_area, categorize_locations, normalize_listings};
use realty_processing::statistics::mean;
use realty_processing::{
    AreaUnitPolicy, CleaningStage, ColumnsMetadata, Listing, OutlierHandler, Pipeline,
    PipelineConfig, PipelineResult, ProcessingError, ReportGenerator, load_listings,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run(filename: &str) -> PipelineResult {
    Pipeline::builder()
        .build()
        .unwrap()
        .process_file(fixtures_path().join(filename))
        .expect("pipeline should succeed")
}

fn rows_after(result: &PipelineResult, stage: CleaningStage) -> usize {
    result
        .summary
        .stage(stage)
        .map(|s| s.rows_after)
        .unwrap_or_else(|| panic!("stage {stage:?} did not run"))
}

/// Listings as they leave the per-location price filter, rebuilt from the
/// public stage functions.
fn price_filtered(filename: &str, config: &PipelineConfig) -> Vec<Listing> {
    let df = load_listings(fixtures_path().join(filename)).unwrap();
    let (df, _) = DataCleaner::prune_columns(&df).unwrap();
    let df = DataCleaner::drop_incomplete_rows(&df).unwrap();
    let raw = DataCleaner::extract_raw_listings(&df).unwrap();
    let listings = add_price_per_area(&normalize_listings(&raw, config), config.price_unit);
    let listings =
        categorize_locations(&listings, config.location_min_count, &config.other_label);
    let listings =
        OutlierHandler::remove_area_per_bedroom_outliers(&listings, config.min_area_per_bedroom);
    OutlierHandler::remove_price_per_area_outliers(&listings)
}

// ============================================================================
// Hand-Built Fixture
// ============================================================================

#[test]
fn test_small_fixture_stage_counts() {
    let result = run("small_listings.csv");

    assert_eq!(result.summary.rows_loaded, 20);
    // one null size, one unit-suffixed area, one size without a count
    assert_eq!(rows_after(&result, CleaningStage::FeatureNormalization), 17);
    // the 6 bedroom listing in 1020 sqft
    assert_eq!(rows_after(&result, CleaningStage::AreaPerBedroomFilter), 16);
    assert_eq!(rows_after(&result, CleaningStage::PricePerAreaFilter), 9);
    assert_eq!(rows_after(&result, CleaningStage::BedroomPriceFilter), 9);
    // 13 bathrooms in a 4 bedroom listing
    assert_eq!(rows_after(&result, CleaningStage::BathroomFilter), 8);
    assert_eq!(result.summary.rows_final, 8);
}

#[test]
fn test_small_fixture_drops_named_outliers() {
    let result = run("small_listings.csv");

    assert!(!result.listings.iter().any(|l| l.bedrooms == 6 && l.area == 1020.0));
    assert!(!result.listings.iter().any(|l| l.bedrooms == 4 && l.bathrooms == 13));
    // the "1800 - 2200" range survived as its midpoint
    assert!(result.listings.iter().any(|l| l.area == 2000.0 && l.bedrooms == 3));
}

#[test]
fn test_small_fixture_schema() {
    let result = run("small_listings.csv");
    let schema = &result.encoded.schema;

    assert_eq!(schema.columns(), &["total_sqft", "bath", "bhk", "Whitefield"]);
    assert_eq!(result.summary.frequent_locations, 1);
    assert_eq!(
        result.summary.columns_dropped,
        vec!["area_type", "availability", "society", "balcony"]
    );
}

#[test]
fn test_unit_conversion_policy_keeps_suffixed_areas() {
    let config = PipelineConfig::builder()
        .area_unit_policy(AreaUnitPolicy::Convert)
        .build()
        .unwrap();
    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process_file(fixtures_path().join("small_listings.csv"))
        .unwrap();

    assert_eq!(rows_after(&result, CleaningStage::FeatureNormalization), 18);
}

// ============================================================================
// Generated Sample
// ============================================================================

#[test]
fn test_sample_stage_counts() {
    let result = run("bengaluru_sample.csv");

    assert_eq!(result.summary.rows_loaded, 600);
    assert_eq!(rows_after(&result, CleaningStage::FeatureNormalization), 552);
    assert_eq!(rows_after(&result, CleaningStage::AreaPerBedroomFilter), 512);
    assert_eq!(rows_after(&result, CleaningStage::PricePerAreaFilter), 299);
    assert_eq!(rows_after(&result, CleaningStage::BedroomPriceFilter), 250);
    assert_eq!(result.summary.rows_final, 172);
    assert_eq!(result.encoded.schema.locations().len(), 13);
}

#[test]
fn test_sample_invariants() {
    let config = PipelineConfig::default();
    let result = run("bengaluru_sample.csv");

    for l in &result.listings {
        assert!(l.area / f64::from(l.bedrooms) >= config.min_area_per_bedroom);
        assert!(l.bathrooms < l.bedrooms + config.max_extra_bathrooms);
        assert!(l.price_per_area > 0.0);
        assert_eq!(l.location, l.location.trim());
    }

    let schema = &result.encoded.schema;
    for l in &result.listings {
        assert!(
            l.location == config.other_label || schema.locations().contains(&l.location),
            "{} is neither frequent nor '{}'",
            l.location,
            config.other_label
        );
    }
}

#[test]
fn test_sample_bedroom_monotonicity() {
    let config = PipelineConfig::default();
    let reference = price_filtered("bengaluru_sample.csv", &config);
    let result = run("bengaluru_sample.csv");

    let mut groups: BTreeMap<(String, u32), Vec<f64>> = BTreeMap::new();
    for l in &reference {
        groups
            .entry((l.location.clone(), l.bedrooms))
            .or_default()
            .push(l.price_per_area);
    }

    let mut checked = 0;
    for l in result.listings.iter().filter(|l| l.bedrooms > 1) {
        let Some(smaller) = groups.get(&(l.location.clone(), l.bedrooms - 1)) else {
            continue;
        };
        if smaller.len() > config.bedroom_comparison_min_count {
            assert!(l.price_per_area >= mean(smaller).unwrap());
            checked += 1;
        }
    }
    assert!(checked > 0, "fixture should exercise the bedroom comparison");
}

#[test]
fn test_sample_alignment() {
    let result = run("bengaluru_sample.csv");
    let columns = result.encoded.feature_columns().unwrap();
    let target = result.encoded.target_values().unwrap();

    assert_eq!(target.len(), result.listings.len());
    for (i, l) in result.listings.iter().enumerate() {
        assert_eq!(target[i], l.price);
        assert_eq!(columns[0][i], l.area);
        assert_eq!(columns[1][i], f64::from(l.bathrooms));
        assert_eq!(columns[2][i], f64::from(l.bedrooms));
        let indicators: f64 = columns[3..].iter().map(|c| c[i]).sum();
        let expected = if l.location == "other" { 0.0 } else { 1.0 };
        assert_eq!(indicators, expected);
    }
}

#[test]
fn test_sample_is_deterministic() {
    let a = run("bengaluru_sample.csv");
    let b = run("bengaluru_sample.csv");

    assert_eq!(a.listings, b.listings);
    assert_eq!(a.encoded.schema, b.encoded.schema);
    assert!(a.encoded.features.equals(&b.encoded.features));
}

#[test]
fn test_outputs_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let result = run("bengaluru_sample.csv");
    let generator = ReportGenerator::new(dir.path());

    let dataset = generator.write_outputs(&result).unwrap();
    let report = ReportGenerator::build_report("bengaluru_sample.csv", Some(dataset.as_path()), &result);
    generator.write_report(&report, "bengaluru_sample").unwrap();

    let metadata = ColumnsMetadata::read(dir.path().join("columns.json")).unwrap();
    assert_eq!(metadata.data_columns.len(), result.encoded.schema.width());
    assert!(metadata.data_columns.contains(&"sarjapur  road".to_string()));
    assert!(!metadata.data_columns.contains(&"other".to_string()));
    assert!(dir.path().join("bengaluru_sample_report.json").exists());

    let reloaded = load_listings(&dataset);
    // the exported dataset lacks the raw columns, so it is not a valid input
    assert!(matches!(reloaded, Err(ProcessingError::MissingColumns(_))));
}

// ============================================================================
// Structural Errors
// ============================================================================

#[test]
fn test_missing_column_fixture() {
    let err = Pipeline::builder()
        .build()
        .unwrap()
        .process_file(fixtures_path().join("missing_column.csv"))
        .unwrap_err();

    assert!(err.is_schema_error());
    assert!(err.to_string().contains("total_sqft"));
}

#[test]
fn test_header_only_fixture() {
    let err = Pipeline::builder()
        .build()
        .unwrap()
        .process_file(fixtures_path().join("header_only.csv"))
        .unwrap_err();

    assert!(matches!(err, ProcessingError::EmptyDataset));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .process_file(fixtures_path().join("does_not_exist.csv"));

    assert!(result.is_err());
}

#[test]
fn test_progress_reporting_invoked() {
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);

    Pipeline::builder()
        .on_progress(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
        .process_file(fixtures_path().join("small_listings.csv"))
        .unwrap();

    assert!(counter.load(Ordering::SeqCst) > 11);
}
