//! Weather lookup result and display methods

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Normalized current weather for a city.
///
/// This is both the cache payload and the HTTP response body, so the
/// serialized field names are part of the public contract.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherResult {
    /// City exactly as the caller supplied it
    pub city: String,
    /// Temperature in Celsius
    #[serde(rename = "temp_c")]
    pub temperature: f64,
    /// Human-readable description of the weather code
    pub description: String,
    /// Observation time as reported upstream (e.g. `2025-10-03T10:15`)
    #[serde(rename = "time")]
    pub timestamp: String,
    /// Latitude echoed by the provider
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude echoed by the provider
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Relative humidity in percent
    #[serde(
        default,
        alias = "relative_humidity_2m",
        skip_serializing_if = "Option::is_none"
    )]
    pub humidity: Option<f64>,
    /// Rain in mm over the preceding interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<f64>,
    /// WMO weather code
    pub weather_code: i32,
}

impl WeatherResult {
    /// Encode for the cache store
    pub fn to_payload(&self) -> crate::Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| WeatherError::cache(format!("failed to encode cache payload: {e}")))
    }

    /// Decode a cache store payload
    pub fn from_payload(payload: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| WeatherError::cache(format!("corrupted cache payload: {e}")))
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        self.humidity
            .map_or_else(|| "n/a".to_string(), |h| format!("{h:.0} %"))
    }

    #[must_use]
    pub fn format_rain(&self) -> String {
        self.rain
            .map_or_else(|| "n/a".to_string(), |r| format!("{r:.1} mm"))
    }

    /// Format the observation time like `Monday, Jan 2, 2006 - 3:04 PM`
    #[must_use]
    pub fn format_time(&self) -> String {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S"))
            .map_or_else(
                |_| "Unavailable".to_string(),
                |dt| dt.format("%A, %b %-d, %Y - %-I:%M %p").to_string(),
            )
    }

    /// Multi-line details block for terminal output
    #[must_use]
    pub fn format_details(&self) -> String {
        [
            format!("Weather Details for {}:", self.city),
            format!("  Latitude      : {:.4}", self.latitude),
            format!("  Longitude     : {:.4}", self.longitude),
            format!("  Current Time  : {}", self.format_time()),
            format!("  Temperature   : {}", self.format_temperature()),
            format!("  Humidity      : {}", self.format_humidity()),
            format!("  Rain          : {}", self.format_rain()),
            format!("  Weather       : {}", self.description),
        ]
        .join("\n")
    }
}
