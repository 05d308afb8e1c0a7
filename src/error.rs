//! Error types and handling for the city weather service

use thiserror::Error;

/// Longest upstream body snippet kept in an error
const BODY_SNIPPET_LIMIT: usize = 256;

/// Main error type for weather lookups
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Blank or otherwise unusable city input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// No entry in the location dataset matched the city
    #[error("City not found: {city}")]
    CityNotFound { city: String },

    /// The location dataset could not be read or parsed
    #[error("Location data unavailable: {message}")]
    DataUnavailable { message: String },

    /// Transport failure talking to the forecast provider
    #[error("Upstream unreachable: {message}")]
    UpstreamUnreachable { message: String },

    /// The forecast provider answered with a non-2xx status
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamError { status: u16, body: String },

    /// The forecast provider answered 2xx with a payload we could not decode
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Cache store connectivity or protocol failure
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn city_not_found<S: Into<String>>(city: S) -> Self {
        Self::CityNotFound { city: city.into() }
    }

    pub fn data_unavailable<S: Into<String>>(message: S) -> Self {
        Self::DataUnavailable {
            message: message.into(),
        }
    }

    pub fn upstream_unreachable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnreachable {
            message: message.into(),
        }
    }

    /// Create an upstream status error, keeping only a bounded snippet of the body
    pub fn upstream_status(status: u16, body: &str) -> Self {
        Self::UpstreamError {
            status,
            body: body_snippet(body),
        }
    }

    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short, stable message that is safe to show to clients
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::InvalidInput { .. } => "city must not be empty".to_string(),
            WeatherError::CityNotFound { .. } => "city not found".to_string(),
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            WeatherError::DataUnavailable { .. }
            | WeatherError::UpstreamUnreachable { .. }
            | WeatherError::UpstreamError { .. }
            | WeatherError::Decode { .. }
            | WeatherError::Cache { .. } => "upstream or server error".to_string(),
        }
    }

    /// HTTP status code this error maps to at the API boundary
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            WeatherError::InvalidInput { .. } => 400,
            WeatherError::CityNotFound { .. } => 404,
            _ => 500,
        }
    }

    /// Whether the caller can fix this by changing the input
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            WeatherError::InvalidInput { .. } | WeatherError::CityNotFound { .. }
        )
    }
}

/// Truncate a response body on a char boundary and flatten whitespace
fn body_snippet(body: &str) -> String {
    let flattened: String = body
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let trimmed = flattened.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
