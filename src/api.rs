//! HTTP routes for weather lookups
//!
//! `GET /weather?city=<name>` answers with a [`WeatherResult`] or an
//! `{"error": "..."}` body whose status follows the error kind.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::error::WeatherError;
use crate::models::WeatherResult;
use crate::service::WeatherService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    service: Arc<WeatherService>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(service: Arc<WeatherService>, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

/// Lookup failure rendered as a JSON error body
#[derive(Debug)]
pub struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_user_error() {
            info!("Rejected weather lookup: {}", err);
        } else {
            error!("GetWeather error: {}", err);
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": err.user_message() }))).into_response()
    }
}

/// Any origin may call the API from a browser
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .layer(cors_layer())
        .with_state(state)
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResult>, ApiError> {
    let city = query.city.unwrap_or_default();

    match tokio::time::timeout(state.request_timeout, state.service.get_weather(&city)).await {
        Ok(result) => Ok(Json(result?)),
        Err(_) => Err(WeatherError::upstream_unreachable(format!(
            "lookup for '{}' exceeded the {:?} request deadline",
            city, state.request_timeout
        ))
        .into()),
    }
}
