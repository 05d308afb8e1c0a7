//! `OpenMeteo` forecast API client
//!
//! Fetches current conditions for a coordinate pair and decodes the
//! provider's response. Transport failures, non-2xx statuses and malformed
//! payloads are reported as distinct error kinds.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::WeatherError;
use crate::models::WeatherResult;

/// Fields requested from the `current` block
pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,rain,weather_code";

/// Bytes of a non-2xx body kept for diagnostics
const MAX_ERROR_BODY: usize = 4096;

const USER_AGENT: &str = concat!("city-weather/", env!("CARGO_PKG_VERSION"));

/// Current weather response from `OpenMeteo` API
#[derive(Debug, Deserialize, Clone)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub elevation: Option<f64>,
    pub current: CurrentData,
    pub current_units: Option<CurrentUnits>,
}

/// Current weather block from `OpenMeteo`
#[derive(Debug, Deserialize, Clone)]
pub struct CurrentData {
    pub time: String,
    pub interval: Option<u32>,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub relative_humidity: Option<f64>,
    pub rain: Option<f64>,
    pub weather_code: f64,
}

/// Units reported alongside the current block
#[derive(Debug, Deserialize, Clone)]
pub struct CurrentUnits {
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<String>,
    #[serde(rename = "relative_humidity_2m")]
    pub relative_humidity: Option<String>,
    pub rain: Option<String>,
    pub interval: Option<String>,
}

impl ForecastResponse {
    /// Integer WMO code. The provider sends it as a JSON number, so a
    /// fractional or out-of-range value is a decode failure.
    pub fn weather_code(&self) -> crate::Result<i32> {
        let code = self.current.weather_code;
        if !code.is_finite() || code.fract() != 0.0 {
            return Err(WeatherError::decode(format!("invalid weather_code: {code}")));
        }
        if code < f64::from(i32::MIN) || code > f64::from(i32::MAX) {
            return Err(WeatherError::decode(format!("weather_code out of range: {code}")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(code as i32)
    }

    /// Build the normalized lookup result. Coordinates come from the
    /// provider's echoed values, not from the resolver.
    #[must_use]
    pub fn into_result(self, city: &str, weather_code: i32, description: String) -> WeatherResult {
        WeatherResult {
            city: city.to_string(),
            temperature: self.current.temperature,
            description,
            timestamp: self.current.time,
            latitude: self.latitude,
            longitude: self.longitude,
            humidity: self.current.relative_humidity,
            rain: self.current.rain,
            weather_code,
        }
    }
}

/// HTTP client for the `OpenMeteo` forecast endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a client with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn forecast_url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current={}",
            self.base_url,
            lat,
            lon,
            urlencoding::encode(CURRENT_FIELDS)
        )
    }

    /// Get current weather for a coordinate pair
    #[instrument(skip(self))]
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> crate::Result<ForecastResponse> {
        let url = self.forecast_url(lat, lon);
        debug!("OpenMeteo API request URL: {}", url);
        let start_time = Instant::now();

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_prefix(&mut response, MAX_ERROR_BODY).await;
            let err = WeatherError::upstream_status(status.as_u16(), &body);
            debug!("OpenMeteo request failed: {}", err);
            return Err(err);
        }

        let body = response.bytes().await.map_err(|e| {
            WeatherError::upstream_unreachable(format!("failed to read response body: {e}"))
        })?;
        let forecast: ForecastResponse = serde_json::from_slice(&body).map_err(|e| {
            debug!("Failed to parse OpenMeteo response: {}", e);
            WeatherError::decode(format!("invalid OpenMeteo response: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved current weather for {:.4}, {:.4} in {:.3}s",
            lat,
            lon,
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }
        debug!(
            "Upstream metadata: timezone={:?} elevation={:?} interval={:?} units={:?}",
            forecast.timezone, forecast.elevation, forecast.current.interval, forecast.current_units
        );

        Ok(forecast)
    }
}

/// Read at most `limit` bytes of an error body
async fn read_prefix(response: &mut reqwest::Response, limit: usize) -> String {
    let mut buf = Vec::new();
    while buf.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                debug!("Failed to read error body: {}", e);
                break;
            }
        }
    }
    buf.truncate(limit);
    String::from_utf8_lossy(&buf).into_owned()
}

fn transport_error(e: &reqwest::Error) -> WeatherError {
    if e.is_timeout() {
        WeatherError::upstream_unreachable("request to OpenMeteo timed out")
    } else if e.is_connect() {
        WeatherError::upstream_unreachable(format!("failed to connect to OpenMeteo: {e}"))
    } else {
        WeatherError::upstream_unreachable(format!("request to OpenMeteo failed: {e}"))
    }
}
