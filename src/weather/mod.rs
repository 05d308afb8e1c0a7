//! Upstream weather data: the `OpenMeteo` client and weather code descriptions

pub mod codes;
pub mod open_meteo;

pub use codes::WeatherCodeTranslator;
pub use open_meteo::{CurrentData, ForecastResponse, OpenMeteoClient};
