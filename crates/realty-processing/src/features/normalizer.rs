//! Parsing of the free-text size and area fields.

use crate::config::{AreaUnitPolicy, PipelineConfig};
use crate::types::{Listing, ParsedListing, RawListing};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Unit suffixes seen in the source data and their size in square feet.
const UNIT_TO_SQFT: [(&str, f64); 7] = [
    ("Sq. Meter", 10.7639),
    ("Sq. Yards", 9.0),
    ("Perch", 272.25),
    ("Acres", 43_560.0),
    ("Cents", 435.6),
    ("Guntha", 1089.0),
    ("Grounds", 2400.0),
];

static UNIT_AREA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d*\.?\d+)\s*(Sq\. Meter|Sq\. Yards|Perch|Acres|Cents|Guntha|Grounds)\s*$")
        .expect("unit area pattern is valid")
});

/// Bedroom count from a size descriptor: the integer before the first space.
///
/// `"2 BHK"` → 2, `"4 Bedroom"` → 4, `"BHK"` → `None`.
pub fn parse_bedrooms(size: &str) -> Option<u32> {
    size.split(' ').next()?.parse().ok()
}

/// Area from a `total_sqft` field.
///
/// A value with exactly one `separator` and two numeric sides is replaced by
/// the mean of its bounds. Otherwise the whole value must be a float. Under
/// [`AreaUnitPolicy::Convert`], known unit suffixes are converted to square
/// feet; under [`AreaUnitPolicy::Drop`] they are unparseable.
///
/// Only finite, positive areas are returned.
pub fn parse_area(raw: &str, separator: char, policy: AreaUnitPolicy) -> Option<f64> {
    let area = parse_range(raw, separator)
        .or_else(|| raw.trim().parse::<f64>().ok())
        .or_else(|| match policy {
            AreaUnitPolicy::Convert => parse_unit_area(raw),
            AreaUnitPolicy::Drop => None,
        })?;

    (area.is_finite() && area > 0.0).then_some(area)
}

fn parse_range(raw: &str, separator: char) -> Option<f64> {
    let mut tokens = raw.split(separator);
    let (low, high) = (tokens.next()?, tokens.next()?);
    if tokens.next().is_some() {
        return None;
    }
    let low: f64 = low.trim().parse().ok()?;
    let high: f64 = high.trim().parse().ok()?;
    Some((low + high) / 2.0)
}

fn parse_unit_area(raw: &str) -> Option<f64> {
    let caps = UNIT_AREA.captures(raw)?;
    let value: f64 = caps[1].parse().ok()?;
    let factor = UNIT_TO_SQFT
        .iter()
        .find(|(unit, _)| *unit == &caps[2])
        .map(|(_, factor)| *factor)?;
    Some(value * factor)
}

/// Bathroom count. Must be a non-negative whole number.
pub fn parse_bathrooms(raw: &str) -> Option<u32> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

/// Parse the numeric features of every raw listing.
///
/// Records with an unparseable size, area, bathroom count or price are
/// dropped; they are not retried or reported as errors.
pub fn normalize_listings(raw: &[RawListing], config: &PipelineConfig) -> Vec<ParsedListing> {
    let mut dropped = 0usize;
    let parsed: Vec<ParsedListing> = raw
        .iter()
        .filter_map(|listing| {
            let parsed = parse_listing(listing, config);
            if parsed.is_none() {
                dropped += 1;
                debug!(
                    size = %listing.size,
                    total_sqft = %listing.total_sqft,
                    bath = %listing.bath,
                    "Dropping unparseable listing"
                );
            }
            parsed
        })
        .collect();

    if dropped > 0 {
        debug!("Feature normalizer dropped {} unparseable listings", dropped);
    }
    parsed
}

fn parse_listing(raw: &RawListing, config: &PipelineConfig) -> Option<ParsedListing> {
    Some(ParsedListing {
        location: raw.location.clone(),
        bedrooms: parse_bedrooms(&raw.size)?,
        area: parse_area(
            &raw.total_sqft,
            config.area_range_separator,
            config.area_unit_policy,
        )?,
        bathrooms: parse_bathrooms(&raw.bath)?,
        price: raw.price.trim().parse::<f64>().ok().filter(|p| p.is_finite())?,
    })
}

/// Add `price_per_area = price * price_unit / area` to every listing.
pub fn add_price_per_area(listings: &[ParsedListing], price_unit: f64) -> Vec<Listing> {
    listings
        .iter()
        .map(|l| Listing {
            location: l.location.clone(),
            bedrooms: l.bedrooms,
            area: l.area,
            bathrooms: l.bathrooms,
            price: l.price,
            price_per_area: l.price * price_unit / l.area,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(size: &str, total_sqft: &str, bath: &str) -> RawListing {
        RawListing {
            location: "Whitefield".to_string(),
            size: size.to_string(),
            total_sqft: total_sqft.to_string(),
            bath: bath.to_string(),
            price: "51.0".to_string(),
        }
    }

    #[test]
    fn test_parse_bedrooms() {
        assert_eq!(parse_bedrooms("2 BHK"), Some(2));
        assert_eq!(parse_bedrooms("4 Bedroom"), Some(4));
        assert_eq!(parse_bedrooms("1 RK"), Some(1));
        assert_eq!(parse_bedrooms("BHK"), None);
        assert_eq!(parse_bedrooms(" 2 BHK"), None);
        assert_eq!(parse_bedrooms(""), None);
    }

    #[test]
    fn test_parse_area_range_is_mean_of_bounds() {
        assert_eq!(parse_area("2100-2850", '-', AreaUnitPolicy::Drop), Some(2475.0));
        assert_eq!(parse_area("2100 - 2850", '-', AreaUnitPolicy::Drop), Some(2475.0));
    }

    #[test]
    fn test_parse_area_plain_number() {
        assert_eq!(parse_area("1056", '-', AreaUnitPolicy::Drop), Some(1056.0));
        assert_eq!(parse_area(" 1200.5 ", '-', AreaUnitPolicy::Drop), Some(1200.5));
    }

    #[test]
    fn test_parse_area_rejects_malformed_ranges() {
        assert_eq!(parse_area("1-2-3", '-', AreaUnitPolicy::Drop), None);
        assert_eq!(parse_area("abc-def", '-', AreaUnitPolicy::Drop), None);
        assert_eq!(parse_area("", '-', AreaUnitPolicy::Drop), None);
    }

    #[test]
    fn test_parse_area_rejects_non_positive() {
        assert_eq!(parse_area("0", '-', AreaUnitPolicy::Drop), None);
        assert_eq!(parse_area("NaN", '-', AreaUnitPolicy::Drop), None);
        assert_eq!(parse_area("inf", '-', AreaUnitPolicy::Drop), None);
    }

    #[test]
    fn test_parse_area_unit_suffix_dropped_by_default() {
        assert_eq!(parse_area("34.46Sq. Meter", '-', AreaUnitPolicy::Drop), None);
        assert_eq!(parse_area("4125Perch", '-', AreaUnitPolicy::Drop), None);
    }

    #[test]
    fn test_parse_area_unit_suffix_converted() {
        let meters = parse_area("34.46Sq. Meter", '-', AreaUnitPolicy::Convert).unwrap();
        assert!((meters - 34.46 * 10.7639).abs() < 1e-9);
        assert_eq!(parse_area("2Acres", '-', AreaUnitPolicy::Convert), Some(87_120.0));
        assert_eq!(parse_area("1Grounds", '-', AreaUnitPolicy::Convert), Some(2400.0));
        assert_eq!(parse_area("12 Furlongs", '-', AreaUnitPolicy::Convert), None);
    }

    #[test]
    fn test_parse_bathrooms() {
        assert_eq!(parse_bathrooms("2"), Some(2));
        assert_eq!(parse_bathrooms("3.0"), Some(3));
        assert_eq!(parse_bathrooms("2.5"), None);
        assert_eq!(parse_bathrooms("-1"), None);
        assert_eq!(parse_bathrooms("two"), None);
    }

    #[test]
    fn test_normalize_drops_unparseable_records() {
        let config = PipelineConfig::default();
        let listings = vec![
            raw("2 BHK", "1056", "2"),
            raw("3 BHK", "2100-2850", "3"),
            raw("2 BHK", "34.46Sq. Meter", "2"),
            raw("BHK", "1200", "2"),
        ];

        let parsed = normalize_listings(&listings, &config);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].bedrooms, 2);
        assert_eq!(parsed[0].area, 1056.0);
        assert_eq!(parsed[1].area, 2475.0);
        assert_eq!(parsed[1].bathrooms, 3);
    }

    #[test]
    fn test_add_price_per_area() {
        let parsed = vec![ParsedListing {
            location: "Whitefield".to_string(),
            bedrooms: 2,
            area: 1000.0,
            bathrooms: 2,
            price: 50.0,
        }];

        let listings = add_price_per_area(&parsed, 100_000.0);
        assert_eq!(listings[0].price_per_area, 5000.0);
        assert_eq!(listings[0].area, 1000.0);
    }
}
