//! Location model for the city dataset

use serde::{Deserialize, Serialize};

/// A city from the location dataset
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationEntry {
    /// Normalized city name, the dataset key
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl LocationEntry {
    /// Create a new location entry
    #[must_use]
    pub fn new(name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
        }
    }
}

/// Normalize a raw city input into a dataset and cache key.
///
/// Lowercases, trims, and joins whitespace-separated parts with `_`, so
/// `"  New   Delhi "` becomes `"new_delhi"`.
#[must_use]
pub fn normalize_city(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
