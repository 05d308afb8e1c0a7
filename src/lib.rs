//! `city-weather` - current weather for a city, with a time-windowed cache
//!
//! This library resolves city names against a static dataset, fetches current
//! conditions from `OpenMeteo`, translates weather codes and caches results
//! per city for the current 15 minute window.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod service;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::{MemoryStore, RedisStore, WeatherStore, cache_key};
pub use config::CityWeatherConfig;
pub use error::WeatherError;
pub use location_resolver::LocationResolver;
pub use models::{LocationEntry, WeatherResult, normalize_city};
pub use service::WeatherService;
pub use weather::{OpenMeteoClient, WeatherCodeTranslator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
