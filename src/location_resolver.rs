//! Location Resolution Module
//!
//! This module resolves free-form city input into coordinates using the
//! static city dataset. The dataset is a JSON object keyed by normalized city
//! name and is read from disk on every resolution.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::WeatherError;
use crate::models::{LocationEntry, normalize_city};

#[derive(Debug, Deserialize)]
struct DatasetCoordinates {
    latitude: f64,
    longitude: f64,
}

/// Service for resolving city names against the location dataset
#[derive(Debug, Clone)]
pub struct LocationResolver {
    dataset_path: PathBuf,
}

impl LocationResolver {
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
        }
    }

    /// Resolve a raw city input into a location entry.
    ///
    /// Tries the full normalized name first, then only the part before the
    /// first comma (`"chennai, india"` -> `"chennai"`).
    #[instrument(skip(self))]
    pub async fn resolve(&self, city_raw: &str) -> crate::Result<LocationEntry> {
        let dataset = self.load().await?;

        let key = normalize_city(city_raw);
        if let Some(entry) = Self::lookup(&dataset, &key) {
            debug!("Resolved '{}' at ({}, {})", key, entry.latitude, entry.longitude);
            return Ok(entry);
        }

        if let Some((head, _)) = city_raw.split_once(',') {
            let head_key = normalize_city(head);
            if let Some(entry) = Self::lookup(&dataset, &head_key) {
                debug!("Resolved '{}' via prefix '{}'", key, head_key);
                return Ok(entry);
            }
        }

        debug!("No dataset entry for '{}'", key);
        Err(WeatherError::city_not_found(key))
    }

    fn lookup(dataset: &HashMap<String, DatasetCoordinates>, key: &str) -> Option<LocationEntry> {
        if key.is_empty() {
            return None;
        }
        dataset
            .get(key)
            .map(|c| LocationEntry::new(key.to_string(), c.latitude, c.longitude))
    }

    async fn load(&self) -> crate::Result<HashMap<String, DatasetCoordinates>> {
        let bytes = tokio::fs::read(&self.dataset_path).await.map_err(|e| {
            WeatherError::data_unavailable(format!(
                "failed to read {}: {e}",
                self.dataset_path.display()
            ))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            WeatherError::data_unavailable(format!(
                "failed to parse {}: {e}",
                self.dataset_path.display()
            ))
        })
    }
}
