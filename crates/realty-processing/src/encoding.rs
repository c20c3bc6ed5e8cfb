//! One-hot encoding of locations and assembly of the feature matrix.
//!
//! The matrix layout is fixed by a [`Schema`]: the three numeric features
//! first, then one indicator column per frequent location in lexicographic
//! order. The catch-all bucket has no column of its own; a listing in it is
//! encoded as all zeros across the location block.

use crate::error::{ProcessingError, Result, ResultExt};
use crate::types::Listing;
use crate::utils::{f64_values, normalize_name};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Names of the numeric feature columns, in matrix order.
pub const NUMERIC_FEATURES: [&str; 3] = ["total_sqft", "bath", "bhk"];

/// Name of the target column.
pub const TARGET_COLUMN: &str = "price";

/// Column layout of the feature matrix.
///
/// Built once at encoding time and never modified afterwards. It travels
/// with a trained model so that prediction uses exactly the training layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<String>,
    other_label: String,
}

impl Schema {
    /// Build a schema from the locations present in a record set.
    ///
    /// Locations are trimmed, sorted and deduplicated without regard to
    /// case; of several spellings the lexicographically first one names the
    /// column. `other_label` is excluded.
    pub fn new<I, S>(locations: I, other_label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let other_label = other_label.into();
        let other_key = normalize_name(&other_label);
        let spellings: BTreeSet<String> = locations
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .collect();

        let mut seen = HashSet::new();
        let locations: Vec<String> = spellings
            .into_iter()
            .filter(|l| {
                let key = normalize_name(l);
                key != other_key && seen.insert(key)
            })
            .collect();

        let columns = NUMERIC_FEATURES
            .iter()
            .map(|c| c.to_string())
            .chain(locations)
            .collect();

        Self {
            columns,
            other_label,
        }
    }

    /// Check the layout of a schema that was not built by [`Schema::new`],
    /// such as one read back from disk.
    ///
    /// The numeric features must lead in their fixed order, and no two
    /// columns may share a name once trimmed and lower-cased.
    pub fn validate(&self) -> Result<()> {
        let leading = self.columns.get(..NUMERIC_FEATURES.len()).unwrap_or_default();
        if leading != NUMERIC_FEATURES {
            return Err(ProcessingError::InvalidSchema(format!(
                "columns must start with {}",
                NUMERIC_FEATURES.join(", ")
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            let key = normalize_name(column);
            if key == normalize_name(&self.other_label) {
                return Err(ProcessingError::InvalidSchema(format!(
                    "'{column}' is the catch-all label and cannot be a column"
                )));
            }
            if !seen.insert(key) {
                return Err(ProcessingError::InvalidSchema(format!(
                    "duplicate column '{column}'"
                )));
            }
        }
        Ok(())
    }

    /// All column names in matrix order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The location indicator columns, in matrix order.
    pub fn locations(&self) -> &[String] {
        self.columns.get(NUMERIC_FEATURES.len()..).unwrap_or_default()
    }

    pub fn other_label(&self) -> &str {
        &self.other_label
    }

    /// Width of the feature matrix.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column index of a location's indicator.
    ///
    /// Matching is case-insensitive on the trimmed name. The catch-all label
    /// resolves to `None`; any other unknown name is an error.
    pub fn location_index(&self, location: &str) -> Result<Option<usize>> {
        let wanted = normalize_name(location);
        if wanted == normalize_name(&self.other_label) {
            return Ok(None);
        }
        self.locations()
            .iter()
            .position(|l| normalize_name(l) == wanted)
            .map(|i| Some(i + NUMERIC_FEATURES.len()))
            .ok_or_else(|| ProcessingError::UnknownLocation(location.trim().to_string()))
    }

    /// Feature vector for a single listing, laid out like a matrix row.
    pub fn feature_vector(
        &self,
        location: &str,
        area: f64,
        bathrooms: f64,
        bedrooms: f64,
    ) -> Result<Vec<f64>> {
        if self.width() < NUMERIC_FEATURES.len() {
            return Err(ProcessingError::InvalidSchema(format!(
                "{} columns cannot hold the numeric features",
                self.width()
            )));
        }
        let mut row = vec![0.0; self.width()];
        row[0] = area;
        row[1] = bathrooms;
        row[2] = bedrooms;
        if let Some(idx) = self.location_index(location)? {
            row[idx] = 1.0;
        }
        Ok(row)
    }

    /// Column names for the metadata file: trimmed and lower-cased.
    pub fn data_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| normalize_name(c)).collect()
    }

    pub fn to_metadata(&self) -> ColumnsMetadata {
        ColumnsMetadata {
            data_columns: self.data_columns(),
        }
    }
}

/// Contents of `columns.json`, consumed by the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnsMetadata {
    pub data_columns: Vec<String>,
}

impl ColumnsMetadata {
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string(self)?.as_bytes())?;
        debug!("Wrote {} column names to {}", self.data_columns.len(), path.display());
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Feature matrix, target vector and the schema that describes them.
///
/// Row `i` of `features` and element `i` of `target` come from the same
/// listing.
#[derive(Debug, Clone)]
pub struct EncodedDataset {
    pub schema: Schema,
    pub features: DataFrame,
    pub target: Series,
}

impl EncodedDataset {
    pub fn n_rows(&self) -> usize {
        self.features.height()
    }

    /// Feature matrix as columns of `f64`, in schema order.
    pub fn feature_columns(&self) -> Result<Vec<Vec<f64>>> {
        self.schema
            .columns()
            .iter()
            .map(|name| {
                Ok(f64_values(&self.features, name)?
                    .into_iter()
                    .map(|v| v.unwrap_or_default())
                    .collect())
            })
            .collect()
    }

    pub fn target_values(&self) -> Result<Vec<f64>> {
        let values = self.target.f64().context("Target is not numeric")?;
        Ok(values.into_iter().map(|v| v.unwrap_or_default()).collect())
    }

    /// Features and target side by side, target last.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut df = self.features.clone();
        df.with_column(self.target.clone())
            .context("Failed to attach target column")?;
        Ok(df)
    }
}

/// Encode cleaned listings into a feature matrix and target vector.
pub fn encode(listings: &[Listing], other_label: &str) -> Result<EncodedDataset> {
    let schema = Schema::new(listings.iter().map(|l| l.location.as_str()), other_label);

    let mut columns: Vec<Column> = vec![
        Column::new(
            NUMERIC_FEATURES[0].into(),
            listings.iter().map(|l| l.area).collect::<Vec<f64>>(),
        ),
        Column::new(
            NUMERIC_FEATURES[1].into(),
            listings.iter().map(|l| f64::from(l.bathrooms)).collect::<Vec<f64>>(),
        ),
        Column::new(
            NUMERIC_FEATURES[2].into(),
            listings.iter().map(|l| f64::from(l.bedrooms)).collect::<Vec<f64>>(),
        ),
    ];
    let keys: Vec<String> = listings.iter().map(|l| normalize_name(&l.location)).collect();
    for location in schema.locations() {
        let column_key = normalize_name(location);
        let indicator: Vec<f64> = keys
            .iter()
            .map(|k| if *k == column_key { 1.0 } else { 0.0 })
            .collect();
        columns.push(Column::new(location.as_str().into(), indicator));
    }

    let features = DataFrame::new(columns).context("Failed to assemble feature matrix")?;
    let target = Series::new(
        TARGET_COLUMN.into(),
        listings.iter().map(|l| l.price).collect::<Vec<f64>>(),
    );

    debug!(
        "Encoded {} rows into {} feature columns ({} locations)",
        features.height(),
        schema.width(),
        schema.locations().len()
    );

    Ok(EncodedDataset {
        schema,
        features,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listing(location: &str, bedrooms: u32, area: f64, price: f64) -> Listing {
        Listing {
            location: location.to_string(),
            bedrooms,
            area,
            bathrooms: bedrooms,
            price,
            price_per_area: price * 100_000.0 / area,
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("Whitefield", 3, 1500.0, 95.0),
            listing("other", 2, 1100.0, 48.0),
            listing("Hebbal", 2, 1200.0, 70.0),
            listing("Whitefield", 2, 1000.0, 60.0),
        ]
    }

    #[test]
    fn test_schema_orders_locations_and_omits_other() {
        let schema = Schema::new(["Yelahanka", "other", "Hebbal", "Yelahanka"], "other");
        assert_eq!(
            schema.columns(),
            &["total_sqft", "bath", "bhk", "Hebbal", "Yelahanka"]
        );
        assert_eq!(schema.width(), 5);
    }

    #[test]
    fn test_schema_merges_case_variants() {
        let schema = Schema::new(["whitefield", "Whitefield", " WHITEFIELD", "Hebbal", "OTHER"], "other");
        assert_eq!(
            schema.columns(),
            &["total_sqft", "bath", "bhk", "Hebbal", "WHITEFIELD"]
        );
        assert!(schema.validate().is_ok());
        assert_eq!(
            schema.data_columns(),
            vec!["total_sqft", "bath", "bhk", "hebbal", "whitefield"]
        );
    }

    #[test]
    fn test_case_variants_share_one_indicator() {
        let listings = vec![
            listing("Whitefield", 2, 1000.0, 60.0),
            listing("whitefield", 2, 1000.0, 61.0),
            listing("other", 2, 1000.0, 50.0),
        ];
        let encoded = encode(&listings, "other").unwrap();
        let columns = encoded.feature_columns().unwrap();

        assert_eq!(encoded.schema.width(), 4);
        assert_eq!(columns[3], vec![1.0, 1.0, 0.0]);
        for spelling in ["Whitefield", "whitefield"] {
            assert_eq!(
                encoded.schema.feature_vector(spelling, 1000.0, 2.0, 2.0).unwrap(),
                vec![1000.0, 2.0, 2.0, 1.0]
            );
        }
    }

    #[test]
    fn test_validate_rejects_malformed_layouts() {
        let parse = |json: &str| serde_json::from_str::<Schema>(json).unwrap();

        let short = parse(r#"{"columns":["a"],"other_label":"other"}"#);
        assert!(matches!(short.validate(), Err(ProcessingError::InvalidSchema(_))));
        assert!(short.locations().is_empty());
        assert!(matches!(
            short.feature_vector("other", 1.0, 1.0, 1.0),
            Err(ProcessingError::InvalidSchema(_))
        ));

        let reordered = parse(r#"{"columns":["bath","total_sqft","bhk"],"other_label":"other"}"#);
        assert!(reordered.validate().is_err());

        let duplicated = parse(
            r#"{"columns":["total_sqft","bath","bhk","Hebbal","hebbal "],"other_label":"other"}"#,
        );
        assert!(duplicated.validate().is_err());

        let catch_all = parse(r#"{"columns":["total_sqft","bath","bhk","Other"],"other_label":"other"}"#);
        assert!(catch_all.validate().is_err());
    }

    #[test]
    fn test_feature_vector_sets_single_indicator() {
        let schema = Schema::new(["Hebbal", "Whitefield"], "other");
        let row = schema.feature_vector(" whitefield ", 1000.0, 2.0, 2.0).unwrap();
        assert_eq!(row, vec![1000.0, 2.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_feature_vector_other_is_reference_level() {
        let schema = Schema::new(["Hebbal", "Whitefield"], "other");
        let row = schema.feature_vector("Other", 1000.0, 2.0, 3.0).unwrap();
        assert_eq!(row, vec![1000.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_feature_vector_unknown_location() {
        let schema = Schema::new(["Hebbal"], "other");
        let err = schema.feature_vector("Atlantis", 1000.0, 2.0, 2.0).unwrap_err();
        assert!(err.is_lookup_error());
    }

    #[test]
    fn test_encoding_aligns_features_and_target() {
        let listings = sample();
        let encoded = encode(&listings, "other").unwrap();
        let columns = encoded.feature_columns().unwrap();
        let target = encoded.target_values().unwrap();

        assert_eq!(encoded.n_rows(), listings.len());
        for (i, l) in listings.iter().enumerate() {
            assert_eq!(target[i], l.price);
            assert_eq!(columns[0][i], l.area);
            let expected = encoded
                .schema
                .feature_vector(&l.location, l.area, f64::from(l.bathrooms), f64::from(l.bedrooms))
                .unwrap();
            let row: Vec<f64> = columns.iter().map(|c| c[i]).collect();
            assert_eq!(row, expected);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let listings = sample();
        let mut reversed = listings.clone();
        reversed.reverse();

        let a = encode(&listings, "other").unwrap();
        let b = encode(&listings, "other").unwrap();
        let c = encode(&reversed, "other").unwrap();

        assert_eq!(a.schema, b.schema);
        assert!(a.features.equals(&b.features));
        assert_eq!(a.schema, c.schema);
    }

    #[test]
    fn test_to_dataframe_puts_target_last() {
        let encoded = encode(&sample(), "other").unwrap();
        let df = encoded.to_dataframe().unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(names.last().map(String::as_str), Some("price"));
        assert_eq!(df.width(), encoded.schema.width() + 1);
    }

    #[test]
    fn test_columns_metadata_lower_cases_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columns.json");
        let schema = Schema::new(["1st Phase JP Nagar", "Whitefield"], "other");

        schema.to_metadata().write(&path).unwrap();
        let metadata = ColumnsMetadata::read(&path).unwrap();

        assert_eq!(
            metadata.data_columns,
            vec!["total_sqft", "bath", "bhk", "1st phase jp nagar", "whitefield"]
        );
    }
}
