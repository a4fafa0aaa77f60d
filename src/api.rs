//! HTTP API handlers for Skycast.
//!
//! The handlers validate query input, hand a cancellation token down the
//! pipeline, and translate pipeline failures into status codes:
//!
//! - `UpstreamUnavailable` → 503
//! - `AddressNotFound` → 404, with a corrective suggestion
//! - `InsufficientData` → 503
//! - `Cancelled` → 408
//! - malformed coordinates → 400
//!
//! Each handler holds a drop-guarded [`CancellationToken`]: when the
//! client disconnects and axum drops the request future, the guard
//! cancels the token and any in-flight upstream call aborts.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::WeatherError;
use crate::model::{
    Alert, CompositeWeatherReport, Coordinate, CoordinateQuery, CurrentConditions, DailyForecast,
    GeocodeQuery, GeocodedAddress,
};
use crate::service::WeatherService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherService,
}

/// JSON error body returned by all failure responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_composite))
        .route("/weather/current", get(get_current))
        .route("/weather/forecast", get(get_forecast))
        .route("/weather/alerts", get(get_alerts))
        .route("/geocode", get(get_geocode))
        .route("/health", get(health_check))
        .with_state(state)
}

/// GET /weather - composite report: current conditions, up to 6 forecast
/// days, and alerts, with cross-links.
#[instrument(skip(state))]
pub async fn get_composite(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<CompositeWeatherReport>, ApiError> {
    let coord = validate_coordinate(query)?;
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.weather.composite(coord, &cancel).await {
        Ok(report) => {
            info!(
                city = %report.current.city,
                forecast_days = report.forecast.len(),
                alert_count = report.alerts.len(),
                "composite report assembled"
            );
            Ok(Json(report))
        }
        Err(e) => {
            warn!(error = %e, "composite report failed");
            Err(error_response(&e))
        }
    }
}

/// GET /weather/current - current conditions for a coordinate.
#[instrument(skip(state))]
pub async fn get_current(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<CurrentConditions>, ApiError> {
    let coord = validate_coordinate(query)?;
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.weather.current_weather(coord, &cancel).await {
        Ok(current) => {
            info!(city = %current.city, "current conditions queried");
            Ok(Json(current))
        }
        Err(e) => {
            warn!(error = %e, "current conditions failed");
            Err(error_response(&e))
        }
    }
}

/// GET /weather/forecast - up to 6 aggregated forecast days.
#[instrument(skip(state))]
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<Vec<DailyForecast>>, ApiError> {
    let coord = validate_coordinate(query)?;
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.weather.forecast(coord, &cancel).await {
        Ok(forecast) => {
            info!(days = forecast.len(), "forecast queried");
            Ok(Json(forecast))
        }
        Err(e) => {
            warn!(error = %e, "forecast failed");
            Err(error_response(&e))
        }
    }
}

/// GET /weather/alerts - alerts derived from current conditions.
#[instrument(skip(state))]
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let coord = validate_coordinate(query)?;
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.weather.alerts(coord, &cancel).await {
        Ok(alerts) => {
            info!(alert_count = alerts.len(), "alerts queried");
            Ok(Json(alerts))
        }
        Err(e) => {
            warn!(error = %e, "alerts failed");
            Err(error_response(&e))
        }
    }
}

/// GET /geocode - resolve city/region/country into a coordinate.
#[instrument(skip(state))]
pub async fn get_geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodedAddress>, ApiError> {
    if query.city.trim().is_empty() {
        return Err(bad_request("city must not be empty"));
    }
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state
        .weather
        .geocode(&query.city, &query.region, &query.country, &cancel)
        .await
    {
        Ok(address) => {
            info!(address = %address.formatted_address, "address geocoded");
            Ok(Json(address))
        }
        Err(e) => {
            warn!(city = %query.city, error = %e, "geocoding failed");
            Err(error_response(&e))
        }
    }
}

/// GET /health - simple health check endpoint.
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

fn validate_coordinate(query: CoordinateQuery) -> Result<Coordinate, ApiError> {
    Coordinate::new(query.latitude, query.longitude).ok_or_else(|| {
        bad_request("latitude must be within [-90, 90] and longitude within [-180, 180]")
    })
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn error_response(err: &WeatherError) -> ApiError {
    let (status, message) = match err {
        WeatherError::UpstreamUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "weather service temporarily unavailable".to_string(),
        ),
        WeatherError::AddressNotFound { query } => (
            StatusCode::NOT_FOUND,
            format!("no location found for '{query}'; check the city, region and country spelling"),
        ),
        WeatherError::InsufficientData => (
            StatusCode::SERVICE_UNAVAILABLE,
            "the weather provider returned no forecast data".to_string(),
        ),
        WeatherError::Cancelled => (
            StatusCode::REQUEST_TIMEOUT,
            "request cancelled".to_string(),
        ),
    };

    (status, Json(ErrorBody { error: message }))
}
