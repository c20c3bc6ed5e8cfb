//! Dimensionality reduction for the location column.
//!
//! Locations are trimmed and counted once over the record set handed in.
//! Anything seen `min_count` times or fewer is folded into the catch-all
//! bucket, which keeps the one-hot encoding narrow.

use crate::types::Listing;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Occurrences of each trimmed location, sorted by name.
pub fn location_counts(listings: &[Listing]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for listing in listings {
        *counts.entry(listing.location.trim().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Replace every location with `count <= min_count` by `other_label`.
///
/// The frequent set is derived from `listings` itself. Running this again on
/// its own output changes nothing: frequent locations keep their counts and
/// the bucket maps onto itself.
pub fn categorize_locations(
    listings: &[Listing],
    min_count: usize,
    other_label: &str,
) -> Vec<Listing> {
    let counts = location_counts(listings);
    let rare = counts.values().filter(|&&count| count <= min_count).count();
    info!(
        "Locations: {} distinct, {} with more than {} listings, {} folded into '{}'",
        counts.len(),
        counts.len() - rare,
        min_count,
        rare,
        other_label
    );

    listings
        .iter()
        .map(|listing| {
            let trimmed = listing.location.trim();
            let frequent = counts.get(trimmed).is_some_and(|&count| count > min_count);
            let location = if frequent { trimmed } else { other_label };
            if !frequent && trimmed != other_label {
                debug!("Folding rare location '{}' into '{}'", trimmed, other_label);
            }
            Listing {
                location: location.to_string(),
                ..listing.clone()
            }
        })
        .collect()
}
