//! Redis-backed store

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info, instrument};

use super::{WeatherStore, cache_key};
use crate::error::WeatherError;

/// A [`WeatherStore`] backed by Redis with server-side expiry (`SET .. EX`).
///
/// The connection manager is cloned per operation and reconnects on its own,
/// so one store can be shared by all request tasks.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    ttl: Duration,
}

impl RedisStore {
    /// Connect and verify the server answers `PING` within `connect_timeout`.
    pub async fn connect(
        address: &str,
        password: Option<&str>,
        ttl: Duration,
        connect_timeout: Duration,
    ) -> crate::Result<Self> {
        let client = redis::Client::open(connection_url(address, password))
            .map_err(|e| WeatherError::cache(format!("invalid redis address: {e}")))?;

        let mut conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| WeatherError::cache(format!("timed out connecting to redis at {address}")))?
            .map_err(|e| WeatherError::cache(format!("failed to connect to redis: {e}")))?;

        let pong: String = tokio::time::timeout(connect_timeout, redis::cmd("PING").query_async(&mut conn))
            .await
            .map_err(|_| WeatherError::cache("redis ping timed out"))?
            .map_err(|e| WeatherError::cache(format!("redis ping failed: {e}")))?;
        info!("Redis at {} answered {}", address, pong);

        Ok(Self { conn, ttl })
    }
}

#[async_trait]
impl WeatherStore for RedisStore {
    #[instrument(name = "query_cache", level = "debug", skip(self))]
    async fn get(&self, city: &str, at: DateTime<Utc>) -> crate::Result<Option<Vec<u8>>> {
        let key = cache_key(city, at);
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn
            .get(&key)
            .await
            .map_err(|e| WeatherError::cache(format!("redis get failed: {e}")))?;
        if value.is_none() {
            debug!("Key not found");
        }
        Ok(value)
    }

    #[instrument(name = "put_cache", level = "debug", skip(self, payload))]
    async fn set(&self, city: &str, at: DateTime<Utc>, payload: Vec<u8>) -> crate::Result<()> {
        let key = cache_key(city, at);
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, payload, self.ttl.as_secs())
            .await
            .map_err(|e| WeatherError::cache(format!("redis set failed: {e}")))
    }
}

/// Build a `redis://` URL from a bare `host:port` and optional password.
/// Full `redis://` / `rediss://` URLs are used as given.
fn connection_url(address: &str, password: Option<&str>) -> String {
    if address.starts_with("redis://") || address.starts_with("rediss://") {
        return address.to_string();
    }
    match password.filter(|p| !p.is_empty()) {
        Some(password) => format!("redis://:{}@{}/0", urlencoding::encode(password), address),
        None => format!("redis://{address}/0"),
    }
}
