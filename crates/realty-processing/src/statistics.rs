//! Small statistics helpers for grouped outlier filters.
//!
//! Standard deviation here is the population form (divide by `n`), which is
//! what the per-location price trim is defined against.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation. `None` for an empty slice, `0.0` for one value.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Mean, population standard deviation and size of a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

impl GroupStats {
    /// Compute stats for a group. `None` for an empty group.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            mean: mean(values)?,
            std: population_std(values)?,
            count: values.len(),
        })
    }

    /// Whether `value` lies in the half-open band `(mean - k*std, mean + k*std]`.
    pub fn within_band(&self, value: f64, k: f64) -> bool {
        value > self.mean - k * self.std && value <= self.mean + k * self.std
    }
}

/// Group items by key, keeping each group's items in input order.
///
/// Returns indices into `items` so callers can filter without cloning.
pub fn group_indices<'a, T, K, F>(items: &'a [T], key: F) -> BTreeMap<K, Vec<usize>>
where
    K: Ord,
    F: Fn(&'a T) -> K,
{
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (idx, item) in items.iter().enumerate() {
        groups.entry(key(item)).or_default().push(idx);
    }
    groups
}
