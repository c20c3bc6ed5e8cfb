//! Feature engineering stages.
//!
//! - [`normalizer`]: bedroom count and area parsing, price per area
//! - [`location`]: folding of rare locations into a catch-all bucket

pub mod location;
pub mod normalizer;

pub use location::{categorize_locations, location_counts};
pub use normalizer::{
    add_price_per_area, normalize_listings, parse_area, parse_bathrooms, parse_bedrooms,
};
