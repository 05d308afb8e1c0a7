//! Cache-aside store for weather lookups
//!
//! Entries are keyed by normalized city and the 15 minute wall-clock window
//! the lookup falls into, so every request for one city inside a window
//! shares a key. A missing key is `Ok(None)`; only connectivity or protocol
//! failures are errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use crate::config::CacheConfig;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Width of a cache key window
pub const CACHE_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Default entry lifetime, matching the upstream refresh cadence
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Key-value store holding serialized weather results
#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Fetch the payload cached for `city` in the window containing `at`
    async fn get(&self, city: &str, at: DateTime<Utc>) -> crate::Result<Option<Vec<u8>>>;

    /// Store a payload for `city` in the window containing `at`
    async fn set(&self, city: &str, at: DateTime<Utc>, payload: Vec<u8>) -> crate::Result<()>;
}

/// Round down to the start of the enclosing 15 minute window, in UTC.
#[must_use]
pub fn window_start(at: DateTime<Utc>) -> DateTime<Utc> {
    #[allow(clippy::cast_possible_wrap)]
    let window = CACHE_WINDOW.as_secs() as i64;
    let secs = at.timestamp();
    let floored = secs - secs.rem_euclid(window);
    // floored <= secs, so it is always representable
    DateTime::from_timestamp(floored, 0).unwrap_or(at)
}

/// Build the store key, e.g. `weather:mumbai:2025-10-03T10:15:00Z`
#[must_use]
pub fn cache_key(city: &str, at: DateTime<Utc>) -> String {
    format!(
        "weather:{}:{}",
        city,
        window_start(at).to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Connect the configured store. Returns `None`, with caching disabled, when
/// no address is configured or the store cannot be reached.
pub async fn connect_from_config(config: &CacheConfig) -> Option<Arc<dyn WeatherStore>> {
    let Some(address) = config.address.as_deref() else {
        info!("No cache address configured, running without cache");
        return None;
    };

    let ttl = Duration::from_secs(u64::from(config.ttl_minutes) * 60);
    let connect_timeout = Duration::from_secs(config.connect_timeout_seconds.into());
    info!("Connecting to Redis at {}...", address);
    match RedisStore::connect(address, config.password.as_deref(), ttl, connect_timeout).await {
        Ok(store) => {
            info!("Redis connected, caching lookups for {} minutes", config.ttl_minutes);
            let store: Arc<dyn WeatherStore> = Arc::new(store);
            Some(store)
        }
        Err(e) => {
            warn!("{}; running without cache, lookups will not be cached", e);
            None
        }
    }
}
