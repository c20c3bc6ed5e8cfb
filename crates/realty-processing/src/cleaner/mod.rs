//! Frame-level cleaning: column pruning, null filtering and extraction of
//! text records for the feature stages.

use crate::error::{Result, ResultExt};
use crate::loader::REQUIRED_COLUMNS;
use crate::types::RawListing;
use crate::utils::string_values;
use polars::prelude::*;
use tracing::{debug, info};

/// Operations on the loaded `DataFrame`, before records become typed.
pub struct DataCleaner;

impl DataCleaner {
    /// Keep only the required columns, in their canonical order.
    ///
    /// Returns the pruned frame and the names of the dropped columns.
    pub fn prune_columns(df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let dropped: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
            .collect();

        let pruned = df.select(REQUIRED_COLUMNS).context("Failed to prune columns")?;

        if dropped.is_empty() {
            debug!("No extra columns to drop");
        } else {
            info!("Dropped {} columns: {}", dropped.len(), dropped.join(", "));
        }
        Ok((pruned, dropped))
    }

    /// Remove rows with a null in any column.
    pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
        let mut mask = BooleanChunked::full("complete".into(), true, df.height());
        for col in df.get_columns() {
            let nulls = col.null_count();
            if nulls > 0 {
                debug!("Column '{}' has {} nulls", col.name(), nulls);
            }
            mask = &mask & &col.as_materialized_series().is_not_null();
        }

        let filtered = df.filter(&mask).context("Failed to drop incomplete rows")?;
        let removed = df.height() - filtered.height();
        if removed > 0 {
            info!("Removed {} rows with missing values", removed);
        }
        Ok(filtered)
    }

    /// Convert a pruned, null-free frame into text records.
    ///
    /// Rows that still carry a null are skipped.
    pub fn extract_raw_listings(df: &DataFrame) -> Result<Vec<RawListing>> {
        let [locations, sizes, areas, baths, prices] =
            REQUIRED_COLUMNS.map(|name| string_values(df, name));
        let (locations, sizes, areas, baths, prices) =
            (locations?, sizes?, areas?, baths?, prices?);

        let mut listings = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (Some(location), Some(size), Some(total_sqft), Some(bath), Some(price)) = (
                locations[i].clone(),
                sizes[i].clone(),
                areas[i].clone(),
                baths[i].clone(),
                prices[i].clone(),
            ) else {
                debug!("Skipping row {} with a missing field", i);
                continue;
            };
            listings.push(RawListing {
                location,
                size,
                total_sqft,
                bath,
                price,
            });
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame() -> DataFrame {
        df!(
            "area_type" => ["Plot  Area", "Built-up  Area", "Plot  Area"],
            "location" => [Some("Hebbal"), Some("Whitefield"), None],
            "size" => [Some("2 BHK"), Some("3 BHK"), Some("4 Bedroom")],
            "society" => [None, Some("Coomee "), None],
            "total_sqft" => [Some("1056"), Some("1440"), Some("2400")],
            "bath" => [Some("2.0"), None, Some("4.0")],
            "price" => [Some("39.07"), Some("62.0"), Some("120.0")]
        )
        .unwrap()
    }

    #[test]
    fn test_prune_keeps_required_columns_in_order() {
        let (pruned, dropped) = DataCleaner::prune_columns(&frame()).unwrap();

        let names: Vec<String> = pruned.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(names, REQUIRED_COLUMNS.map(String::from).to_vec());
        assert_eq!(dropped, vec!["area_type".to_string(), "society".to_string()]);
    }

    #[test]
    fn test_nulls_only_count_in_retained_columns() {
        let (pruned, _) = DataCleaner::prune_columns(&frame()).unwrap();
        let complete = DataCleaner::drop_incomplete_rows(&pruned).unwrap();

        // the society nulls no longer matter; location and bath nulls do
        assert_eq!(complete.height(), 1);
    }

    #[test]
    fn test_extract_raw_listings() {
        let (pruned, _) = DataCleaner::prune_columns(&frame()).unwrap();
        let complete = DataCleaner::drop_incomplete_rows(&pruned).unwrap();

        let listings = DataCleaner::extract_raw_listings(&complete).unwrap();

        assert_eq!(
            listings,
            vec![RawListing {
                location: "Hebbal".to_string(),
                size: "2 BHK".to_string(),
                total_sqft: "1056".to_string(),
                bath: "2.0".to_string(),
                price: "39.07".to_string(),
            }]
        );
    }
}
