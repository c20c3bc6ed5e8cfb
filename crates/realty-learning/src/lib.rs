//! realty-learning: linear price models for cleaned real-estate listings.
//!
//! This crate trains a regression model on the output of
//! [`realty_processing`], picks the best candidate by cross-validation and
//! exports it together with the column layout needed to predict from it.
//!
//! # Features
//!
//! - **Model Search**: ordinary least squares and Lasso at each configured
//!   penalty, scored by shuffle-split R²
//! - **Reproducible Splits**: seeded train/test and cross-validation splits
//! - **Prediction**: price from location, area, bathrooms and bedrooms
//! - **Portable Artifacts**: JSON model file plus `columns.json` metadata
//! - **Progress Reporting**: callbacks at every training stage
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use realty_learning::{TrainingConfig, TrainingPipeline};
//!
//! let mut pipeline = TrainingPipeline::builder()
//!     .config(TrainingConfig::default())
//!     .on_progress(|u| println!("{:.0}% - {}", u.progress * 100.0, u.message))
//!     .build()?;
//!
//! let result = pipeline.train_file("bengaluru_house_prices.csv")?;
//! let model = pipeline.create_trained_model()?;
//!
//! model.save("output/model.json")?;
//! model.write_columns("output/columns.json")?;
//!
//! let price = model.predict_price("1st Phase JP Nagar", 1000.0, 2, 2)?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! listings.csv ──► realty_processing::Pipeline ──► EncodedDataset
//!                                                       │
//!            TrainingConfig ──► TrainingPipeline ◄──────┘
//!                                     │
//!                     TrainingResult ◄┴► TrainedModel ──► model.json, columns.json
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, LearningError>`]:
//!
//! - [`LearningError::InvalidConfig`] - Invalid training configuration
//! - [`LearningError::InvalidData`] - Too few rows, or mismatched features
//! - [`LearningError::TrainingFailed`] - No candidate could be fitted
//! - [`LearningError::UnknownLocation`] - Prediction for a location the model lacks
//! - [`LearningError::Processing`] - The cleaning pipeline failed

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod regressor;
pub mod search;
pub mod split;
pub mod types;

pub use config::{Algorithm, TrainingConfig, TrainingConfigBuilder};
pub use error::LearningError;
pub use model::{MODEL_FILE, PREDICTION_COLUMN, TrainedModel};
pub use pipeline::{TrainingPipeline, TrainingPipelineBuilder};
pub use progress::{ParseTrainingStageError, ProgressCallback, ProgressUpdate, TrainingStage};
pub use regressor::LinearModel;
pub use search::Candidate;
pub use split::{ShuffleSplit, Split, train_test_split};
pub use types::{Metrics, ModelComparison, ModelInfo, TrainingResult};
