//! Data models for the city weather service
//!
//! This module contains the core domain models organized by concern:
//! - Location: normalized city names and their coordinates
//! - Weather: the normalized lookup result that is cached and served

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{LocationEntry, normalize_city};
pub use weather::WeatherResult;
