//! Configuration types for the listing cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! Every threshold defaults to the value the reference pipeline was tuned
//! with, so `PipelineConfig::default()` reproduces its output.

use serde::{Deserialize, Serialize};

/// What to do with area values that carry a unit suffix (e.g. `34.46Sq. Meter`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AreaUnitPolicy {
    /// Treat unit-suffixed values as unparseable and drop the record.
    #[default]
    Drop,
    /// Convert the known unit suffixes to square feet.
    Convert,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use realty_processing::config::{AreaUnitPolicy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .location_min_count(20)
///     .area_unit_policy(AreaUnitPolicy::Convert)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Locations with this many occurrences or fewer are folded into the
    /// catch-all bucket.
    /// Default: 10
    pub location_min_count: usize,

    /// Name of the catch-all location bucket. It is the reference level of the
    /// one-hot encoding and never gets its own column.
    /// Default: "other"
    pub other_label: String,

    /// Minimum plausible area per bedroom. Records below it are dropped.
    /// Default: 300.0
    pub min_area_per_bedroom: f64,

    /// A bedroom group is only used as a price floor for the next bedroom
    /// count when it holds more than this many records.
    /// Default: 5
    pub bedroom_comparison_min_count: usize,

    /// Records must satisfy `bathrooms < bedrooms + max_extra_bathrooms`.
    /// Default: 2
    pub max_extra_bathrooms: u32,

    /// Currency multiplier applied to `price` when deriving price per area.
    /// Default: 100000.0
    pub price_unit: f64,

    /// Separator between the two bounds of a ranged area value.
    /// Default: '-'
    pub area_range_separator: char,

    /// Handling of unit-suffixed area values.
    /// Default: Drop
    pub area_unit_policy: AreaUnitPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            location_min_count: 10,
            other_label: "other".to_string(),
            min_area_per_bedroom: 300.0,
            bedroom_comparison_min_count: 5,
            max_extra_bathrooms: 2,
            price_unit: 100_000.0,
            area_range_separator: '-',
            area_unit_policy: AreaUnitPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.other_label.trim().is_empty() {
            return Err(ConfigValidationError::EmptyOtherLabel);
        }

        if !self.min_area_per_bedroom.is_finite() || self.min_area_per_bedroom < 0.0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "min_area_per_bedroom".to_string(),
                value: self.min_area_per_bedroom,
            });
        }

        if !self.price_unit.is_finite() || self.price_unit <= 0.0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "price_unit".to_string(),
                value: self.price_unit,
            });
        }

        let sep = self.area_range_separator;
        if sep.is_ascii_digit() || sep == '.' || sep.is_whitespace() {
            return Err(ConfigValidationError::InvalidSeparator(sep));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: f64 },

    #[error("The catch-all location label must not be empty")]
    EmptyOtherLabel,

    #[error("Invalid area range separator {0:?} (must not be a digit, '.' or whitespace)")]
    InvalidSeparator(char),
}

impl From<ConfigValidationError> for crate::error::ProcessingError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::ProcessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    location_min_count: Option<usize>,
    other_label: Option<String>,
    min_area_per_bedroom: Option<f64>,
    bedroom_comparison_min_count: Option<usize>,
    max_extra_bathrooms: Option<u32>,
    price_unit: Option<f64>,
    area_range_separator: Option<char>,
    area_unit_policy: Option<AreaUnitPolicy>,
}

impl PipelineConfigBuilder {
    /// Set the occurrence count at or below which a location becomes "other".
    pub fn location_min_count(mut self, count: usize) -> Self {
        self.location_min_count = Some(count);
        self
    }

    /// Set the name of the catch-all location bucket.
    pub fn other_label(mut self, label: impl Into<String>) -> Self {
        self.other_label = Some(label.into());
        self
    }

    /// Set the minimum area per bedroom.
    pub fn min_area_per_bedroom(mut self, area: f64) -> Self {
        self.min_area_per_bedroom = Some(area);
        self
    }

    /// Set how many records a bedroom group needs (exclusive) before it
    /// constrains the next bedroom count.
    pub fn bedroom_comparison_min_count(mut self, count: usize) -> Self {
        self.bedroom_comparison_min_count = Some(count);
        self
    }

    /// Set the allowed bathroom surplus over bedrooms (exclusive bound).
    pub fn max_extra_bathrooms(mut self, extra: u32) -> Self {
        self.max_extra_bathrooms = Some(extra);
        self
    }

    /// Set the currency multiplier for `price`.
    pub fn price_unit(mut self, unit: f64) -> Self {
        self.price_unit = Some(unit);
        self
    }

    /// Set the separator used in ranged area values.
    pub fn area_range_separator(mut self, sep: char) -> Self {
        self.area_range_separator = Some(sep);
        self
    }

    /// Set the policy for unit-suffixed area values.
    pub fn area_unit_policy(mut self, policy: AreaUnitPolicy) -> Self {
        self.area_unit_policy = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            location_min_count: self.location_min_count.unwrap_or(defaults.location_min_count),
            other_label: self.other_label.unwrap_or(defaults.other_label),
            min_area_per_bedroom: self
                .min_area_per_bedroom
                .unwrap_or(defaults.min_area_per_bedroom),
            bedroom_comparison_min_count: self
                .bedroom_comparison_min_count
                .unwrap_or(defaults.bedroom_comparison_min_count),
            max_extra_bathrooms: self.max_extra_bathrooms.unwrap_or(defaults.max_extra_bathrooms),
            price_unit: self.price_unit.unwrap_or(defaults.price_unit),
            area_range_separator: self
                .area_range_separator
                .unwrap_or(defaults.area_range_separator),
            area_unit_policy: self.area_unit_policy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
