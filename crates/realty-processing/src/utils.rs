//! Shared helpers for moving data between polars frames and plain vectors.

use crate::error::{Result, ResultExt};
use polars::prelude::*;

// =============================================================================
// Column Extraction
// =============================================================================

/// Values of a column as optional strings, casting non-text columns first.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .context(format!("Column '{name}' not found"))?
        .as_materialized_series()
        .cast(&DataType::String)
        .context(format!("Column '{name}' cannot be read as text"))?;
    let values = series.str().context(format!("Column '{name}' is not text"))?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Values of a numeric column as `f64`, nulls included as `None`.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .context(format!("Column '{name}' not found"))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .context(format!("Column '{name}' is not numeric"))?;
    let values = series.f64().context(format!("Column '{name}' is not numeric"))?;
    Ok(values.into_iter().collect())
}

// =============================================================================
// Name Normalization
// =============================================================================

/// Trimmed, lower-cased form used for case-insensitive name matching.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_values_casts_numbers() {
        let df = df!("bath" => [Some(2.0), None, Some(3.5)]).unwrap();
        let values = string_values(&df, "bath").unwrap();
        assert_eq!(values[1], None);
        assert_eq!(values.len(), 3);
        assert!(values[0].as_deref().is_some_and(|v| v.starts_with('2')));
    }

    #[test]
    fn test_f64_values() {
        let df = df!("total_sqft" => [1056.0, 2475.0]).unwrap();
        assert_eq!(f64_values(&df, "total_sqft").unwrap(), vec![Some(1056.0), Some(2475.0)]);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let df = df!("a" => ["x"]).unwrap();
        assert!(string_values(&df, "b").is_err());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Electronic City Phase II "), "electronic city phase ii");
    }
}
