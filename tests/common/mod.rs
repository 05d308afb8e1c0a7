//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use city_weather::{
    LocationResolver, MemoryStore, OpenMeteoClient, WeatherCodeTranslator, WeatherError,
    WeatherService, WeatherStore,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Temporary directory holding the city and weather code datasets
pub fn datasets() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cities.json"),
        r#"{
            "chennai": {"latitude": 13.0827, "longitude": 80.2707},
            "mumbai": {"latitude": 19.076, "longitude": 72.8777},
            "new_delhi": {"latitude": 28.6139, "longitude": 77.209}
        }"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("weather_codes.json"),
        r#"{"0": "Clear sky", "2": "Partly cloudy", "61": "Slight rain"}"#,
    )
    .unwrap();
    dir
}

pub fn service(
    server: &MockServer,
    data: &TempDir,
    store: Option<Arc<dyn WeatherStore>>,
) -> WeatherService {
    WeatherService::new(
        LocationResolver::new(data.path().join("cities.json")),
        OpenMeteoClient::new(server.uri(), Duration::from_secs(5)).unwrap(),
        WeatherCodeTranslator::new(data.path().join("weather_codes.json")),
        store,
    )
    .with_store_timeout(Duration::from_millis(200))
}

pub fn forecast_body(weather_code: i32) -> serde_json::Value {
    json!({
        "latitude": 13.125,
        "longitude": 80.25,
        "timezone": "GMT",
        "elevation": 9.0,
        "current_units": {
            "time": "iso8601",
            "interval": "seconds",
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "rain": "mm",
            "weather_code": "wmo code"
        },
        "current": {
            "time": "2025-10-03T10:15",
            "interval": 900,
            "temperature_2m": 31.4,
            "relative_humidity_2m": 74,
            "rain": 0.2,
            "weather_code": weather_code
        }
    })
}

/// Mount a successful forecast response expected exactly `times` times
pub async fn mount_forecast(server: &MockServer, weather_code: i32, times: u64) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(weather_code)))
        .expect(times)
        .mount(server)
        .await;
}

pub fn shared(store: impl WeatherStore + 'static) -> Option<Arc<dyn WeatherStore>> {
    let store: Arc<dyn WeatherStore> = Arc::new(store);
    Some(store)
}

/// Store whose every operation fails like a dropped connection
pub struct FailingStore;

#[async_trait]
impl WeatherStore for FailingStore {
    async fn get(&self, _city: &str, _at: DateTime<Utc>) -> city_weather::Result<Option<Vec<u8>>> {
        Err(WeatherError::cache("connection refused"))
    }

    async fn set(&self, _city: &str, _at: DateTime<Utc>, _payload: Vec<u8>) -> city_weather::Result<()> {
        Err(WeatherError::cache("connection refused"))
    }
}

/// Store that reads fine but fails every write
pub struct ReadOnlyStore(pub MemoryStore);

#[async_trait]
impl WeatherStore for ReadOnlyStore {
    async fn get(&self, city: &str, at: DateTime<Utc>) -> city_weather::Result<Option<Vec<u8>>> {
        self.0.get(city, at).await
    }

    async fn set(&self, _city: &str, _at: DateTime<Utc>, _payload: Vec<u8>) -> city_weather::Result<()> {
        Err(WeatherError::cache("READONLY You can't write against a read only replica"))
    }
}

/// Store that never answers
pub struct HangingStore;

#[async_trait]
impl WeatherStore for HangingStore {
    async fn get(&self, _city: &str, _at: DateTime<Utc>) -> city_weather::Result<Option<Vec<u8>>> {
        std::future::pending().await
    }

    async fn set(&self, _city: &str, _at: DateTime<Utc>, _payload: Vec<u8>) -> city_weather::Result<()> {
        std::future::pending().await
    }
}

/// Memory store that counts operations
pub struct CountingStore {
    pub inner: Arc<MemoryStore>,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherStore for CountingStore {
    async fn get(&self, city: &str, at: DateTime<Utc>) -> city_weather::Result<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(city, at).await
    }

    async fn set(&self, city: &str, at: DateTime<Utc>, payload: Vec<u8>) -> city_weather::Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(city, at, payload).await
    }
}
