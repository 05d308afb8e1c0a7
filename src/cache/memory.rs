//! In-process TTL store

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{DEFAULT_TTL, WeatherStore, cache_key};
use crate::error::WeatherError;

struct StoredEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// A [`WeatherStore`] kept in process memory.
///
/// Expired entries are dropped when read and swept on every insert.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
    ttl: Duration,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored entries, including expired ones not swept yet
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store raw bytes under a fully built key
    pub fn insert_raw(&self, key: String, value: Vec<u8>) -> crate::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| WeatherError::cache("memory store lock poisoned"))?;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            StoredEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    async fn get(&self, city: &str, at: DateTime<Utc>) -> crate::Result<Option<Vec<u8>>> {
        let key = cache_key(city, at);
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| WeatherError::cache("memory store lock poisoned"))?;

        match entries.get(&key) {
            Some(entry) if Instant::now() < entry.expires_at => Ok(Some(entry.value.clone())),
            Some(_) => {
                debug!("Key found but expired: {}", key);
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, city: &str, at: DateTime<Utc>, payload: Vec<u8>) -> crate::Result<()> {
        self.insert_raw(cache_key(city, at), payload)
    }
}
