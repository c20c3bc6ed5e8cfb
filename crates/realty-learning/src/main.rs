//! CLI entry point for cleaning listings, training price models and predicting.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use realty_learning::{
    Algorithm, MODEL_FILE, TrainedModel, TrainingConfig, TrainingPipeline, TrainingResult,
};
use realty_processing::reporting::COLUMNS_FILE;
use realty_processing::{
    AreaUnitPolicy, CleaningReport, Pipeline, PipelineConfig, PipelineResult, ReportGenerator,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// CLI-compatible area unit policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAreaUnits {
    /// Drop areas written in other units
    Drop,
    /// Convert areas in known units to square feet
    Convert,
}

impl From<CliAreaUnits> for AreaUnitPolicy {
    fn from(cli: CliAreaUnits) -> Self {
        match cli {
            CliAreaUnits::Drop => AreaUnitPolicy::Drop,
            CliAreaUnits::Convert => AreaUnitPolicy::Convert,
        }
    }
}

/// CLI-compatible algorithm enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAlgorithm {
    /// Ordinary least squares
    Linear,
    /// L1-penalised regression, searched over the Lasso alphas
    Lasso,
}

impl From<CliAlgorithm> for Algorithm {
    fn from(cli: CliAlgorithm) -> Self {
        match cli {
            CliAlgorithm::Linear => Algorithm::LinearRegression,
            CliAlgorithm::Lasso => Algorithm::Lasso,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean real-estate listings and train price models",
    long_about = "Clean a raw listings CSV, train a linear price model on it and \
                  predict prices from the exported model.\n\n\
                  EXAMPLES:\n  \
                  # Clean only\n  \
                  realty clean -i bengaluru_house_prices.csv -o output/\n\n  \
                  # Clean, search and train\n  \
                  realty train -i bengaluru_house_prices.csv -o output/\n\n  \
                  # Predict\n  \
                  realty predict -m output/model.json --location 'Indira Nagar' \\\n      \
                  --sqft 1000 --bath 2 --bhk 2"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the result as JSON to stdout (disables logging)
    #[arg(long, global = true)]
    json: bool,

    /// Write a JSON cleaning report next to the outputs
    #[arg(long, global = true)]
    emit_report: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a listings file and write the encoded dataset
    Clean(CleanArgs),
    /// Clean a listings file, search for the best model and export it
    Train(TrainArgs),
    /// Predict a price with an exported model
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct CleaningOptions {
    /// Path to the listings CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Locations seen this many times or fewer fold into "other"
    #[arg(long, default_value = "10")]
    location_min_count: usize,

    /// How to treat areas written in units other than square feet
    #[arg(long, value_enum, default_value = "drop")]
    area_units: CliAreaUnits,
}

impl CleaningOptions {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        Ok(PipelineConfig::builder()
            .location_min_count(self.location_min_count)
            .area_unit_policy(self.area_units.into())
            .build()?)
    }
}

#[derive(Args, Debug)]
struct CleanArgs {
    #[command(flatten)]
    cleaning: CleaningOptions,
}

#[derive(Args, Debug)]
struct TrainArgs {
    #[command(flatten)]
    cleaning: CleaningOptions,

    /// Train only this algorithm instead of searching
    #[arg(short, long, value_enum)]
    algorithm: Option<CliAlgorithm>,

    /// Fraction of rows held out for the test score
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Seed of the train/test split
    #[arg(long, default_value = "10")]
    seed: u64,

    /// Lasso penalties to search, comma separated
    #[arg(long, value_delimiter = ',', default_value = "1,2")]
    alphas: Vec<f64>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Path to an exported model
    #[arg(short, long)]
    model: PathBuf,

    #[arg(long)]
    location: String,

    /// Area in square feet
    #[arg(long)]
    sqft: f64,

    #[arg(long)]
    bath: u32,

    #[arg(long)]
    bhk: u32,
}

/// Initialize logging based on CLI flags.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // stdout carries only the JSON document
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet, cli.json);

    match &cli.command {
        Command::Clean(args) => run_clean(&cli, args),
        Command::Train(args) => run_train(&cli, args),
        Command::Predict(args) => run_predict(&cli, args),
    }
}

fn check_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    Ok(())
}

fn run_clean(cli: &Cli, args: &CleanArgs) -> Result<()> {
    let options = &args.cleaning;
    check_input(&options.input)?;

    let mut builder = Pipeline::builder().config(options.pipeline_config()?);
    if !cli.quiet && !cli.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    let result = builder
        .build()?
        .process_file(&options.input)
        .context("Cleaning failed")?;

    let generator = ReportGenerator::new(&options.output);
    let dataset_path = generator.write_outputs(&result)?;
    let report = ReportGenerator::build_report(
        &options.input.display().to_string(),
        Some(dataset_path.as_path()),
        &result,
    );

    if cli.emit_report {
        generator.write_report(&report, &file_stem(&options.input))?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_cleaning_summary(&report);
    Ok(())
}

fn run_train(cli: &Cli, args: &TrainArgs) -> Result<()> {
    let options = &args.cleaning;
    check_input(&options.input)?;

    let mut config = TrainingConfig::builder()
        .test_size(args.test_size)
        .random_seed(args.seed)
        .lasso_alphas(args.alphas.clone());
    if let Some(algorithm) = args.algorithm {
        config = config.algorithm(algorithm.into());
    }

    let mut builder = TrainingPipeline::builder()
        .config(config.build()?)
        .processing_config(options.pipeline_config()?);
    if !cli.quiet && !cli.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.as_str(),
                update.message
            );
        });
    }
    let mut pipeline = builder.build()?;

    let result = pipeline
        .train_file(&options.input)
        .context("Training failed")?;
    let model = pipeline.create_trained_model()?;

    std::fs::create_dir_all(&options.output)?;
    let model_path = options.output.join(MODEL_FILE);
    model.save(&model_path)?;
    model.write_columns(options.output.join(COLUMNS_FILE))?;

    if let Some(cleaning) = pipeline.cleaning_result().filter(|_| cli.emit_report) {
        let report = cleaning_report(options, cleaning);
        ReportGenerator::new(&options.output).write_report(&report, &file_stem(&options.input))?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_training_summary(&result, &model_path);
    Ok(())
}

fn run_predict(cli: &Cli, args: &PredictArgs) -> Result<()> {
    let model = TrainedModel::load(&args.model)?;
    let price = model.predict_price(&args.location, args.sqft, args.bath, args.bhk)?;

    if cli.json {
        let output = serde_json::json!({
            "location": args.location,
            "total_sqft": args.sqft,
            "bath": args.bath,
            "bhk": args.bhk,
            "price": price,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} | {} sqft | {} bath | {} BHK => {:.2} lakh",
        args.location, args.sqft, args.bath, args.bhk, price
    );
    Ok(())
}

fn cleaning_report(options: &CleaningOptions, result: &PipelineResult) -> CleaningReport {
    ReportGenerator::build_report(&options.input.display().to_string(), None, result)
}

/// Extract the file stem (name without extension) from a path.
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of a cleaning run.
///
/// Uses `println!` so the summary shows regardless of log level.
fn print_cleaning_summary(report: &CleaningReport) {
    let summary = &report.summary;
    println!("\n{}", "=".repeat(60));
    println!("CLEANING SUMMARY");
    println!("{}", "=".repeat(60));
    println!("  Input:    {}", report.input_file);
    if let Some(ref output) = report.output_file {
        println!("  Output:   {}", output);
    }
    println!("  Rows:     {} -> {}", summary.rows_loaded, summary.rows_final);
    println!("  Features: {}", summary.feature_count);
    println!("  Locations kept: {}", summary.frequent_locations);
    println!();
    println!("  {:<28} {:>8} {:>8}", "Stage", "Before", "After");
    println!("  {}", "-".repeat(46));
    for stage in &summary.stages {
        println!(
            "  {:<28} {:>8} {:>8}",
            stage.stage.display_name(),
            stage.rows_before,
            stage.rows_after
        );
    }
    println!("{}", "=".repeat(60));
}

/// Print a human-readable summary of a training run.
fn print_training_summary(result: &TrainingResult, model_path: &Path) {
    println!("\n{}", "=".repeat(60));
    println!("TRAINING SUMMARY");
    println!("{}", "=".repeat(60));
    println!("  Model:       {}", model_path.display());
    println!("  Best:        {}", result.best_model_name);
    println!("  CV mean R²:  {:.4}", result.metrics.cv_mean);
    println!("  Test R²:     {:.4}", result.metrics.test_r2);
    println!(
        "  Rows:        {} train / {} test",
        result.metrics.n_train, result.metrics.n_test
    );
    println!();
    println!("  {:<28} {:>10}", "Candidate", "CV R²");
    println!("  {}", "-".repeat(40));
    for candidate in &result.model_comparison {
        println!("  {:<28} {:>10.4}", candidate.name, candidate.cv_mean);
    }
    for warning in &result.warnings {
        println!("  warning: {}", warning);
    }
    println!("{}", "=".repeat(60));
}
