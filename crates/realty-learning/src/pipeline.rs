//! Training pipeline implementation.
//!
//! This module provides the [`TrainingPipeline`] struct and its builder.
//! The pipeline takes cleaned, encoded listings and produces a fitted
//! [`TrainedModel`].
//!
//! # Overview
//!
//! The training pipeline executes these stages in order:
//!
//! 1. **Cleaning** - Run the listing cleaning pipeline (only for [`train_file()`](TrainingPipeline::train_file))
//! 2. **Splitting** - Seeded train/test split of the encoded rows
//! 3. **Model Search** - Shuffle-split cross-validation of every candidate
//! 4. **Training** - Fit the best candidate on the training split
//! 5. **Evaluation** - R² on the held-out test split
//!
//! # Example
//!
//! ```rust,ignore
//! use realty_learning::{TrainingConfig, TrainingPipeline};
//!
//! let mut pipeline = TrainingPipeline::builder()
//!     .config(TrainingConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:?}] {:.0}% - {}", update.stage, update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let result = pipeline.train_file("bengaluru_house_prices.csv")?;
//! println!("Best model: {} (test R²: {:.3})", result.best_model_name, result.metrics.test_r2);
//!
//! let model = pipeline.create_trained_model()?;
//! model.save("model.json")?;
//! ```

use crate::config::TrainingConfig;
use crate::error::LearningError;
use crate::model::TrainedModel;
use crate::progress::{ProgressCallback, ProgressUpdate, TrainingStage};
use crate::regressor::{design_matrix, select_rows};
use crate::search::{self, Candidate};
use crate::split::{ShuffleSplit, train_test_split};
use crate::types::{Metrics, TrainingResult};
use ndarray::Array1;
use realty_processing::{EncodedDataset, Pipeline, PipelineConfig, PipelineResult, ProcessingError};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Share of the progress range spent in the cleaning pipeline.
const CLEANING_SHARE: f64 = 0.3;

/// The price model training pipeline.
///
/// Use [`TrainingPipeline::builder()`] to construct one.
///
/// # Lifecycle
///
/// 1. Create a pipeline with [`TrainingPipeline::builder()`]
/// 2. Call [`train()`](Self::train) or [`train_file()`](Self::train_file)
/// 3. Call [`create_trained_model()`](Self::create_trained_model) to get a model for inference
pub struct TrainingPipeline {
    config: TrainingConfig,
    processing_config: PipelineConfig,
    progress_callback: Option<ProgressCallback>,
    last_model: Option<TrainedModel>,
    last_cleaning: Option<PipelineResult>,
}

static_assertions::assert_impl_all!(TrainingPipeline: Send);

impl std::fmt::Debug for TrainingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingPipeline")
            .field("config", &self.config)
            .field("processing_config", &self.processing_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field(
                "last_model",
                &self.last_model.as_ref().map(TrainedModel::best_model_name),
            )
            .finish()
    }
}

impl TrainingPipeline {
    /// Create a new builder for `TrainingPipeline`.
    #[must_use]
    pub fn builder() -> TrainingPipelineBuilder {
        TrainingPipelineBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn processing_config(&self) -> &PipelineConfig {
        &self.processing_config
    }

    /// Returns `true` once a training run has finished.
    #[must_use]
    pub fn has_training_result(&self) -> bool {
        self.last_model.is_some()
    }

    /// Cleaning result of the last [`train_file()`](Self::train_file) run.
    #[must_use]
    pub fn cleaning_result(&self) -> Option<&PipelineResult> {
        self.last_cleaning.as_ref()
    }

    /// Clean a listings file and train on the result.
    ///
    /// # Errors
    ///
    /// Cleaning failures surface as [`LearningError::Processing`]; see
    /// [`train()`](Self::train) for the rest.
    pub fn train_file(&mut self, path: impl AsRef<Path>) -> Result<TrainingResult, LearningError> {
        let start = Instant::now();
        self.report(ProgressUpdate::new(
            TrainingStage::Cleaning,
            0.0,
            format!("Cleaning {}", path.as_ref().display()),
        ));

        let mut builder = Pipeline::builder().config(self.processing_config.clone());
        if let Some(callback) = self.progress_callback.clone() {
            builder = builder.on_progress(move |update| {
                callback(ProgressUpdate::new(
                    TrainingStage::Cleaning,
                    f64::from(update.progress) * CLEANING_SHARE,
                    update.message,
                ));
            });
        }
        let cleaning = builder
            .build()
            .map_err(ProcessingError::from)?
            .process_file(path)
            .map_err(|e| self.fail(e.into()))?;

        let outcome = self.run(&cleaning.encoded, CLEANING_SHARE, start);
        self.last_cleaning = Some(cleaning);
        outcome
    }

    /// Train on an already encoded dataset.
    ///
    /// # Errors
    ///
    /// - [`InvalidData`](LearningError::InvalidData): too few rows to split
    /// - [`TrainingFailed`](LearningError::TrainingFailed): every candidate failed,
    ///   or the chosen one could not be refitted
    pub fn train(&mut self, data: &EncodedDataset) -> Result<TrainingResult, LearningError> {
        self.run(data, 0.0, Instant::now())
    }

    /// The model from the last training run.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if no run has finished yet.
    pub fn create_trained_model(&self) -> Result<TrainedModel, LearningError> {
        self.last_model.clone().ok_or_else(|| {
            LearningError::InvalidConfig(
                "No training result available. Call train() first.".to_string(),
            )
        })
    }

    fn run(
        &mut self,
        data: &EncodedDataset,
        offset: f64,
        start: Instant,
    ) -> Result<TrainingResult, LearningError> {
        match self.run_internal(data, offset, start) {
            Ok((result, model)) => {
                self.report(ProgressUpdate::new(
                    TrainingStage::Complete,
                    1.0,
                    format!(
                        "Trained {} (test R² {:.4})",
                        result.best_model_name, result.metrics.test_r2
                    ),
                ));
                self.last_model = Some(model);
                Ok(result)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn run_internal(
        &self,
        data: &EncodedDataset,
        offset: f64,
        start: Instant,
    ) -> Result<(TrainingResult, TrainedModel), LearningError> {
        let scale = |fraction: f64| offset + (1.0 - offset) * fraction;

        let columns = data.feature_columns()?;
        let x = design_matrix(&columns)?;
        let y = Array1::from(data.target_values()?);
        if x.nrows() != y.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        // Splitting
        self.report(ProgressUpdate::new(
            TrainingStage::Splitting,
            scale(0.0),
            format!("Splitting {} rows", x.nrows()),
        ));
        let split = train_test_split(x.nrows(), self.config.test_size, self.config.random_seed)?;
        let (x_train, y_train) = select_rows(&x, &y, &split.train);
        let (x_test, y_test) = select_rows(&x, &y, &split.test);
        info!(
            "Split {} rows into {} train and {} test",
            x.nrows(),
            split.train.len(),
            split.test.len()
        );

        // Model search
        let candidates = search::candidates(&self.config);
        let total = candidates.len() as u32;
        let splitter = ShuffleSplit::new(
            self.config.cv_splits,
            self.config.cv_test_size,
            self.config.cv_seed,
        );
        let outcome = search::search(&candidates, &x, &y, &splitter, |i, candidate| {
            let done = i as u32;
            self.report(ProgressUpdate {
                current_model: Some(candidate.name()),
                models_completed: Some((done, total)),
                ..ProgressUpdate::new(
                    TrainingStage::ModelSearch,
                    scale(0.1 + 0.6 * f64::from(done) / f64::from(total)),
                    format!("Cross-validating {}", candidate.name()),
                )
            });
        })?;

        // Final fit
        let best: Candidate = outcome.best;
        let name = best.name();
        self.report(ProgressUpdate {
            current_model: Some(name.clone()),
            models_completed: Some((total, total)),
            ..ProgressUpdate::new(
                TrainingStage::Training,
                scale(0.75),
                format!("Fitting {name} on the training split"),
            )
        });
        let fitted = best.fit(&x_train, &y_train)?;

        // Evaluation
        self.report(ProgressUpdate::new(
            TrainingStage::Evaluation,
            scale(0.9),
            "Scoring on the held-out split",
        ));
        let cv_mean = outcome.best_scores.iter().sum::<f64>() / outcome.best_scores.len() as f64;
        let metrics = Metrics {
            test_r2: fitted.score(x_test.view(), y_test.view())?,
            train_r2: fitted.score(x_train.view(), y_train.view())?,
            cv_scores: outcome.best_scores,
            cv_mean,
            n_train: split.train.len(),
            n_test: split.test.len(),
        };
        info!(
            "Best model {}: cv mean {:.4}, test R² {:.4}",
            name, metrics.cv_mean, metrics.test_r2
        );

        let coefficients = data
            .schema
            .columns()
            .iter()
            .cloned()
            .zip(fitted.coefficients.iter().copied())
            .collect();

        let model = TrainedModel::new(
            name.clone(),
            best.algorithm,
            best.alpha,
            data.schema.clone(),
            fitted,
            metrics.clone(),
        );

        let result = TrainingResult {
            best_model_name: name,
            algorithm: best.algorithm,
            alpha: best.alpha,
            metrics,
            coefficients,
            model_comparison: outcome.comparison,
            training_time_seconds: start.elapsed().as_secs_f64(),
            warnings: outcome.warnings,
        };
        Ok((result, model))
    }

    fn fail(&self, err: LearningError) -> LearningError {
        error!("Training failed: {}", err);
        self.report(ProgressUpdate::new(
            TrainingStage::Failed,
            0.0,
            err.to_string(),
        ));
        err
    }

    fn report(&self, update: ProgressUpdate) {
        if let Some(callback) = &self.progress_callback {
            callback(update);
        }
    }
}

/// Builder for [`TrainingPipeline`].
///
/// Every setting is optional; defaults come from [`TrainingConfig::default()`]
/// and [`PipelineConfig::default()`].
#[derive(Default)]
pub struct TrainingPipelineBuilder {
    config: Option<TrainingConfig>,
    processing_config: Option<PipelineConfig>,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for TrainingPipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingPipelineBuilder")
            .field("config", &self.config)
            .field("processing_config", &self.processing_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl TrainingPipelineBuilder {
    #[must_use]
    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Cleaning settings used by [`TrainingPipeline::train_file()`].
    #[must_use]
    pub fn processing_config(mut self, config: PipelineConfig) -> Self {
        self.processing_config = Some(config);
        self
    }

    /// Set the progress callback (optional).
    ///
    /// The callback runs synchronously on the training thread.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if either configuration is invalid.
    pub fn build(self) -> Result<TrainingPipeline, LearningError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let processing_config = self.processing_config.unwrap_or_default();
        processing_config
            .validate()
            .map_err(|e| LearningError::InvalidConfig(e.to_string()))?;

        Ok(TrainingPipeline {
            config,
            processing_config,
            progress_callback: self.progress_callback,
            last_model: None,
            last_cleaning: None,
        })
    }
}
