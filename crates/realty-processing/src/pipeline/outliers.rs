//! Outlier removal.
//!
//! Three passes run in a fixed order, each on the previous pass's output:
//!
//! 1. [`OutlierHandler::remove_area_per_bedroom_outliers`]: business-rule floor
//! 2. [`OutlierHandler::remove_price_per_area_outliers`]: per-location mean ± std
//! 3. [`OutlierHandler::remove_bedroom_price_outliers`]: k-bedroom listings
//!    priced below the (k-1)-bedroom mean of the same location
//!
//! The bathroom plausibility check lives here as well and runs after all three.
//! Every pass keeps the surviving records in their input order.

use crate::statistics::{GroupStats, group_indices};
use crate::types::Listing;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Width of the per-location price band, in standard deviations.
const PRICE_BAND_STDS: f64 = 1.0;

/// Record-level outlier filters.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Drop listings with less than `min_area` per bedroom.
    pub fn remove_area_per_bedroom_outliers(listings: &[Listing], min_area: f64) -> Vec<Listing> {
        listings
            .iter()
            .filter(|l| {
                let keep = l.area_per_bedroom() >= min_area;
                if !keep {
                    debug!(
                        "Dropping {} bedroom listing of {} sqft in '{}'",
                        l.bedrooms, l.area, l.location
                    );
                }
                keep
            })
            .cloned()
            .collect()
    }

    /// Within each location keep listings with `m - s < price_per_area <= m + s`,
    /// where `m` and `s` are the location's mean and population std.
    ///
    /// A location with a single listing has `s = 0`; the strict lower bound
    /// then excludes that listing.
    pub fn remove_price_per_area_outliers(listings: &[Listing]) -> Vec<Listing> {
        let groups = group_indices(listings, |l| l.location.as_str());
        let mut keep = vec![false; listings.len()];

        for (location, indices) in &groups {
            let values: Vec<f64> = indices.iter().map(|&i| listings[i].price_per_area).collect();
            let Some(stats) = GroupStats::from_values(&values) else {
                continue;
            };
            debug!(
                location = %location,
                mean = stats.mean,
                std = stats.std,
                count = stats.count,
                "Price per area band"
            );
            for &i in indices {
                keep[i] = stats.within_band(listings[i].price_per_area, PRICE_BAND_STDS);
            }
        }

        retain_flagged(listings, &keep)
    }

    /// Within each location, drop k-bedroom listings priced (per area) strictly
    /// below the mean of the (k-1)-bedroom listings, for every k > 1 whose
    /// (k-1) group holds more than `min_count` listings.
    pub fn remove_bedroom_price_outliers(listings: &[Listing], min_count: usize) -> Vec<Listing> {
        let mut excluded: HashSet<usize> = HashSet::new();

        for (location, indices) in group_indices(listings, |l| l.location.as_str()) {
            let by_bedrooms: BTreeMap<u32, Vec<usize>> = {
                let mut map: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
                for &i in &indices {
                    map.entry(listings[i].bedrooms).or_default().push(i);
                }
                map
            };

            let stats: BTreeMap<u32, GroupStats> = by_bedrooms
                .iter()
                .filter_map(|(&bedrooms, members)| {
                    let values: Vec<f64> =
                        members.iter().map(|&i| listings[i].price_per_area).collect();
                    GroupStats::from_values(&values).map(|s| (bedrooms, s))
                })
                .collect();

            for (&bedrooms, members) in &by_bedrooms {
                if bedrooms <= 1 {
                    continue;
                }
                let Some(smaller) = stats.get(&(bedrooms - 1)) else {
                    continue;
                };
                if smaller.count <= min_count {
                    continue;
                }
                for &i in members {
                    if listings[i].price_per_area < smaller.mean {
                        debug!(
                            "Dropping {} bedroom listing in '{}': {:.1} below {} bedroom mean {:.1}",
                            bedrooms,
                            location,
                            listings[i].price_per_area,
                            bedrooms - 1,
                            smaller.mean
                        );
                        excluded.insert(i);
                    }
                }
            }
        }

        listings
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(_, l)| l.clone())
            .collect()
    }

    /// Keep listings with `bathrooms < bedrooms + max_extra`.
    pub fn remove_bathroom_outliers(listings: &[Listing], max_extra: u32) -> Vec<Listing> {
        listings
            .iter()
            .filter(|l| u64::from(l.bathrooms) < u64::from(l.bedrooms) + u64::from(max_extra))
            .cloned()
            .collect()
    }
}

fn retain_flagged(listings: &[Listing], keep: &[bool]) -> Vec<Listing> {
    listings
        .iter()
        .zip(keep)
        .filter(|(_, keep)| **keep)
        .map(|(l, _)| l.clone())
        .collect()
}
