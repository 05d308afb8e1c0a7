//! Weather lookup service
//!
//! Composes the location resolver, the `OpenMeteo` client, the weather code
//! translator and the cache-aside store into a single `get_weather` call.
//! The store is optional: without one every lookup goes upstream.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::cache::WeatherStore;
use crate::config::CityWeatherConfig;
use crate::error::WeatherError;
use crate::location_resolver::LocationResolver;
use crate::models::{WeatherResult, normalize_city};
use crate::weather::{OpenMeteoClient, WeatherCodeTranslator};

/// Default bound for a single cache store round trip
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct WeatherService {
    resolver: LocationResolver,
    upstream: OpenMeteoClient,
    codes: WeatherCodeTranslator,
    store: Option<Arc<dyn WeatherStore>>,
    store_timeout: Duration,
}

impl WeatherService {
    pub fn new(
        resolver: LocationResolver,
        upstream: OpenMeteoClient,
        codes: WeatherCodeTranslator,
        store: Option<Arc<dyn WeatherStore>>,
    ) -> Self {
        Self {
            resolver,
            upstream,
            codes,
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Build the service from configuration with an already connected store
    pub fn from_config(
        config: &CityWeatherConfig,
        store: Option<Arc<dyn WeatherStore>>,
    ) -> crate::Result<Self> {
        let upstream = OpenMeteoClient::new(
            config.upstream.base_url.clone(),
            Duration::from_secs(config.upstream.timeout_seconds.into()),
        )?;

        Ok(Self::new(
            LocationResolver::new(&config.data.locations_path),
            upstream,
            WeatherCodeTranslator::new(&config.data.weather_codes_path),
            store,
        )
        .with_store_timeout(Duration::from_millis(config.cache.operation_timeout_ms)))
    }

    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    #[must_use]
    pub fn caching_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Current weather for a city, served from cache when the current window has it
    pub async fn get_weather(&self, city_raw: &str) -> crate::Result<WeatherResult> {
        self.get_weather_at(city_raw, Utc::now()).await
    }

    /// Same as [`get_weather`](Self::get_weather) with an explicit clock
    #[instrument(skip(self, now))]
    pub async fn get_weather_at(
        &self,
        city_raw: &str,
        now: DateTime<Utc>,
    ) -> crate::Result<WeatherResult> {
        if city_raw.trim().is_empty() {
            return Err(WeatherError::invalid_input("city is blank"));
        }
        let city = normalize_city(city_raw);

        if let Some(cached) = self.cached(&city, now).await {
            debug!("Cache hit for '{}'", city);
            return Ok(cached);
        }
        debug!("Cache miss for '{}'", city);

        let location = self.resolver.resolve(city_raw).await?;
        let forecast = self
            .upstream
            .fetch_current(location.latitude, location.longitude)
            .await?;
        let code = forecast.weather_code()?;
        let description = self.codes.describe(code).await;
        let result = forecast.into_result(city_raw, code, description);

        self.store_result(&city, now, &result).await;
        Ok(result)
    }

    /// Look up the current window. Store faults and undecodable payloads count as misses.
    async fn cached(&self, city: &str, now: DateTime<Utc>) -> Option<WeatherResult> {
        let store = self.store.as_ref()?;

        let payload = match tokio::time::timeout(self.store_timeout, store.get(city, now)).await {
            Ok(Ok(payload)) => payload?,
            Ok(Err(e)) => {
                warn!("Cache get failed, falling back to upstream: {}", e);
                return None;
            }
            Err(_) => {
                warn!("Cache get timed out after {:?}, falling back to upstream", self.store_timeout);
                return None;
            }
        };

        match WeatherResult::from_payload(&payload) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Ignoring cached entry for '{}': {}", city, e);
                None
            }
        }
    }

    async fn store_result(&self, city: &str, now: DateTime<Utc>, result: &WeatherResult) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let payload = match result.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Not caching result for '{}': {}", city, e);
                return;
            }
        };

        match tokio::time::timeout(self.store_timeout, store.set(city, now, payload)).await {
            Ok(Ok(())) => debug!("Cached result for '{}'", city),
            Ok(Err(e)) => warn!("Cache set failed for '{}': {}", city, e),
            Err(_) => warn!("Cache set timed out for '{}' after {:?}", city, self.store_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use rstest::rstest;

    fn offline_service(store: Option<Arc<dyn WeatherStore>>) -> WeatherService {
        WeatherService::new(
            LocationResolver::new("does/not/exist.json"),
            OpenMeteoClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap(),
            WeatherCodeTranslator::new("does/not/exist.json"),
            store,
        )
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    #[tokio::test]
    async fn test_blank_city_is_invalid_input(#[case] city: &str) {
        let err = offline_service(None).get_weather(city).await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_resolver_and_upstream() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let cached = WeatherResult {
            city: "Chennai".to_string(),
            temperature: 30.0,
            description: "Overcast".to_string(),
            timestamp: "2025-10-03T10:15".to_string(),
            latitude: 13.125,
            longitude: 80.25,
            humidity: None,
            rain: None,
            weather_code: 3,
        };
        store
            .set("chennai", now, cached.to_payload().unwrap())
            .await
            .unwrap();

        // dataset and upstream are both unreachable, so only a hit can succeed
        let service = offline_service(Some(store as Arc<dyn WeatherStore>));
        let result = service.get_weather_at(" Chennai ", now).await.unwrap();
        assert_eq!(result, cached);
    }

    #[tokio::test]
    async fn test_caching_enabled_reflects_store() {
        assert!(!offline_service(None).caching_enabled());
        let store: Arc<dyn WeatherStore> = Arc::new(MemoryStore::new());
        assert!(offline_service(Some(store)).caching_enabled());
    }
}
