//! Trained model wrapper for inference and serialization.
//!
//! This module provides [`TrainedModel`], which pairs a fitted [`LinearModel`]
//! with the [`Schema`] it was trained against and enables:
//!
//! - **Price prediction** via [`predict_price()`](TrainedModel::predict_price)
//! - **Batch prediction** over a polars frame via [`predict_batch()`](TrainedModel::predict_batch)
//! - **Serialization** via [`save()`](TrainedModel::save), [`load()`](TrainedModel::load),
//!   [`to_bytes()`](TrainedModel::to_bytes), and [`from_bytes()`](TrainedModel::from_bytes)
//! - **Introspection** via [`get_info()`](TrainedModel::get_info) and [`metrics()`](TrainedModel::metrics)
//!
//! # Example
//!
//! ```rust,ignore
//! use realty_learning::TrainedModel;
//!
//! let model = TrainedModel::load("output/model.json")?;
//! let price = model.predict_price("1st Phase JP Nagar", 1000.0, 2, 2)?;
//! println!("Estimated price: {price:.2} lakh");
//! ```
//!
//! # Artifact Format
//!
//! Models are stored as JSON. The layout is not a stable interface; only
//! [`TrainedModel::load()`] is expected to read it.

use crate::config::Algorithm;
use crate::error::LearningError;
use crate::regressor::LinearModel;
use crate::types::{Metrics, ModelInfo};
use chrono::{DateTime, Utc};
use polars::prelude::{Column, DataFrame};
use realty_processing::utils::{f64_values, string_values};
use realty_processing::{ColumnsMetadata, NUMERIC_FEATURES, ProcessingError, Schema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default file name of the model artifact.
pub const MODEL_FILE: &str = "model.json";

/// Column appended by [`TrainedModel::predict_batch()`].
pub const PREDICTION_COLUMN: &str = "predicted_price";

/// A trained price model ready for inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    name: String,
    algorithm: Algorithm,
    alpha: Option<f64>,
    schema: Schema,
    model: LinearModel,
    metrics: Metrics,
    trained_at: DateTime<Utc>,
}

static_assertions::assert_impl_all!(TrainedModel: Send, Sync);

impl TrainedModel {
    pub(crate) fn new(
        name: String,
        algorithm: Algorithm,
        alpha: Option<f64>,
        schema: Schema,
        model: LinearModel,
        metrics: Metrics,
    ) -> Self {
        Self {
            name,
            algorithm,
            alpha,
            schema,
            model,
            metrics,
            trained_at: Utc::now(),
        }
    }

    /// Loads a model previously written with [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// - [`LearningError::ModelNotFound`] if the file does not exist
    /// - [`LearningError::Io`] if it cannot be read
    /// - [`LearningError::Json`] or [`LearningError::InvalidData`] if it is not a valid model
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LearningError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Saves the model as JSON. Parent directories must exist.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LearningError> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()?)?;
        info!("Saved {} model to {}", self.name, path.display());
        Ok(())
    }

    /// Serializes the model for storage outside the filesystem.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LearningError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Restores a model from [`to_bytes()`](Self::to_bytes) output.
    ///
    /// The schema layout is validated and the coefficient count is checked
    /// against its width.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LearningError> {
        let model: Self = serde_json::from_slice(bytes)?;
        model
            .schema
            .validate()
            .map_err(|e| LearningError::InvalidData(e.to_string()))?;
        if model.model.n_features() != model.schema.width() {
            return Err(LearningError::InvalidData(format!(
                "model has {} coefficients but its schema has {} columns",
                model.model.n_features(),
                model.schema.width()
            )));
        }
        Ok(model)
    }

    /// Writes the `columns.json` metadata for this model's schema.
    pub fn write_columns(&self, path: impl AsRef<Path>) -> Result<(), LearningError> {
        self.schema.to_metadata().write(path)?;
        Ok(())
    }

    /// Estimated price, in lakh, of one listing.
    ///
    /// `location` is matched case-insensitively after trimming. The other
    /// label predicts with every location indicator at zero.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::UnknownLocation`] for a location the model
    /// has no column for.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let price = model.predict_price("Indira Nagar", 1000.0, 2, 2)?;
    /// ```
    pub fn predict_price(
        &self,
        location: &str,
        area: f64,
        bathrooms: u32,
        bedrooms: u32,
    ) -> Result<f64, LearningError> {
        let row = self
            .schema
            .feature_vector(location, area, f64::from(bathrooms), f64::from(bedrooms))
            .map_err(LearningError::from_lookup)?;
        self.model.predict_row(&row)
    }

    /// Predicts a price for every row of `df`.
    ///
    /// `df` needs `location`, `total_sqft`, `bath` and `bhk` columns; any
    /// other columns are carried through. The prediction is appended as
    /// `predicted_price`.
    ///
    /// # Errors
    ///
    /// - [`LearningError::Processing`] if an input column is missing
    /// - [`LearningError::InvalidData`] for a null input value
    /// - [`LearningError::UnknownLocation`] for a location the model lacks
    pub fn predict_batch(&self, df: &DataFrame) -> Result<DataFrame, LearningError> {
        let locations = string_values(df, "location")?;
        let areas = f64_values(df, NUMERIC_FEATURES[0])?;
        let baths = f64_values(df, NUMERIC_FEATURES[1])?;
        let bedrooms = f64_values(df, NUMERIC_FEATURES[2])?;

        let mut predictions = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (Some(location), Some(area), Some(bath), Some(bhk)) = (
                locations[i].as_deref(),
                areas[i],
                baths[i],
                bedrooms[i],
            ) else {
                return Err(LearningError::InvalidData(format!(
                    "row {i} has a missing input value"
                )));
            };
            let row = self
                .schema
                .feature_vector(location, area, bath, bhk)
                .map_err(LearningError::from_lookup)?;
            predictions.push(self.model.predict_row(&row)?);
        }

        let mut out = df.clone();
        out.with_column(Column::new(PREDICTION_COLUMN.into(), predictions))
            .map_err(ProcessingError::from)?;
        Ok(out)
    }

    /// Candidate name, e.g. `"lasso(alpha=1)"`.
    #[must_use]
    pub fn best_model_name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.model.coefficients
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.model.intercept
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    #[must_use]
    pub fn columns_metadata(&self) -> ColumnsMetadata {
        self.schema.to_metadata()
    }

    pub fn get_info(&self) -> ModelInfo {
        ModelInfo {
            best_model_name: self.name.clone(),
            algorithm: self.algorithm,
            feature_names: self.schema.columns().to_vec(),
            locations: self.schema.locations().to_vec(),
            other_label: self.schema.other_label().to_string(),
            metrics: self.metrics.clone(),
            trained_at: self.trained_at.to_rfc3339(),
        }
    }
}
