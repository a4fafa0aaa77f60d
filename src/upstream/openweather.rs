//! OpenWeatherMap client.
//!
//! Covers the three upstream operations the pipeline needs: current
//! conditions, the 3-hourly multi-day forecast, and forward geocoding.
//! Every operation is a single request/response exchange; there are no
//! retries and no circuit breaking. Transport failures, non-2xx statuses
//! and undecodable payloads all surface as `UpstreamUnavailable`, while a
//! geocoding query with zero matches surfaces as `AddressNotFound`.
//!
//! # API Reference
//!
//! See: <https://openweathermap.org/api>

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::WeatherError;
use crate::model::{Coordinate, GeocodedAddress};

/// Base URL for the weather data API.
const WEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// Base URL for the geocoding API.
const GEO_API_BASE: &str = "https://api.openweathermap.org/geo/1.0";

/// Base URL for condition icons.
const ICON_URL_BASE: &str = "https://openweathermap.org/img/w";

/// Number of 3-hour forecast slices to request (~6 days).
const FORECAST_SLICES: u32 = 48;

/// Per-request timeout for upstream calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the OpenWeatherMap weather and geocoding endpoints.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    geo_base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a client against the public OpenWeatherMap endpoints.
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_base_urls(api_key, WEATHER_API_BASE, GEO_API_BASE)
    }

    /// Create a client with custom base URLs (for testing).
    pub fn with_base_urls(
        api_key: &str,
        base_url: &str,
        geo_base_url: &str,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            geo_base_url: geo_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch current conditions for a coordinate.
    pub async fn fetch_current(
        &self,
        coord: Coordinate,
        cancel: &CancellationToken,
    ) -> Result<CurrentObservation, WeatherError> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, coord.latitude, coord.longitude, self.api_key
        );

        let payload: CurrentPayload = self.get_json(&url, cancel).await?;
        payload.try_into()
    }

    /// Fetch the raw 3-hourly forecast samples for a coordinate, in the
    /// order the provider returns them (chronological).
    pub async fn fetch_forecast(
        &self,
        coord: Coordinate,
        cancel: &CancellationToken,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric&cnt={}",
            self.base_url, coord.latitude, coord.longitude, self.api_key, FORECAST_SLICES
        );

        let payload: ForecastPayload = self.get_json(&url, cancel).await?;
        payload
            .list
            .into_iter()
            .map(ForecastSample::try_from)
            .collect()
    }

    /// Resolve a city/region/country triple into a coordinate and a
    /// formatted address. Takes the provider's first match.
    pub async fn geocode(
        &self,
        city: &str,
        region: &str,
        country: &str,
        cancel: &CancellationToken,
    ) -> Result<GeocodedAddress, WeatherError> {
        let query = format!("{city},{region},{country}");
        let url = format!(
            "{}/direct?q={}&limit=1&appid={}",
            self.geo_base_url,
            urlencoding::encode(&query),
            self.api_key
        );

        let matches: Vec<GeoMatch> = self.get_json(&url, cancel).await?;

        let first = matches
            .into_iter()
            .next()
            .ok_or(WeatherError::AddressNotFound { query })?;

        // The provider sometimes omits the state; fall back to what the
        // caller supplied so the formatted address stays three-part.
        let region = first.state.unwrap_or_else(|| region.to_string());

        Ok(GeocodedAddress {
            latitude: first.lat,
            longitude: first.lon,
            formatted_address: format!("{}, {}, {}", first.name, region, first.country),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<T, WeatherError> {
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(WeatherError::Cancelled),
            result = self.client.get(url).send() => result?,
        };

        let response = response.error_for_status()?;

        let payload = tokio::select! {
            _ = cancel.cancelled() => return Err(WeatherError::Cancelled),
            result = response.json::<T>() => result.map_err(|e| {
                WeatherError::UpstreamUnavailable(format!("unexpected payload: {e}"))
            })?,
        };

        Ok(payload)
    }
}

/// Current conditions as extracted from the provider, before region
/// resolution and timestamping by the service layer.
#[derive(Debug, Clone)]
pub struct CurrentObservation {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: String,
}

/// One 3-hour forecast slice after extraction.
#[derive(Debug, Clone)]
pub struct ForecastSample {
    /// Slice timestamp (UTC).
    pub timestamp: DateTime<Utc>,

    /// Temperature in degrees Celsius.
    pub temperature: f64,

    /// Short textual description.
    pub description: String,

    /// Provider icon code (not a URL).
    pub icon: String,

    /// Precipitation over the slice's 3-hour window, if any was reported.
    pub rain_3h: Option<f64>,
}

/// Build the full icon URL from a provider icon code.
pub fn icon_url(code: &str) -> String {
    format!("{ICON_URL_BASE}/{code}.png")
}

// ============================================================================
// Payload types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    name: String,
    sys: SysPayload,
    main: MainPayload,
    weather: Vec<ConditionPayload>,
}

#[derive(Debug, Deserialize)]
struct SysPayload {
    country: String,
}

#[derive(Debug, Deserialize)]
struct MainPayload {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionPayload {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    list: Vec<SlicePayload>,
}

#[derive(Debug, Deserialize)]
struct SlicePayload {
    dt: i64,
    main: SliceMainPayload,
    weather: Vec<ConditionPayload>,
    #[serde(default)]
    rain: Option<RainPayload>,
}

#[derive(Debug, Deserialize)]
struct SliceMainPayload {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct RainPayload {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeoMatch {
    name: String,
    lat: f64,
    lon: f64,
    country: String,
    #[serde(default)]
    state: Option<String>,
}

impl TryFrom<CurrentPayload> for CurrentObservation {
    type Error = WeatherError;

    fn try_from(payload: CurrentPayload) -> Result<Self, Self::Error> {
        let condition = payload.weather.into_iter().next().ok_or_else(|| {
            WeatherError::UpstreamUnavailable("current payload missing weather element".to_string())
        })?;

        Ok(Self {
            city: payload.name,
            country: payload.sys.country,
            temperature: payload.main.temp,
            feels_like: payload.main.feels_like,
            humidity: payload.main.humidity,
            description: condition.description,
            icon: icon_url(&condition.icon),
        })
    }
}

impl TryFrom<SlicePayload> for ForecastSample {
    type Error = WeatherError;

    fn try_from(payload: SlicePayload) -> Result<Self, Self::Error> {
        let timestamp = DateTime::<Utc>::from_timestamp(payload.dt, 0).ok_or_else(|| {
            WeatherError::UpstreamUnavailable(format!("invalid slice timestamp {}", payload.dt))
        })?;

        let condition = payload.weather.into_iter().next().ok_or_else(|| {
            WeatherError::UpstreamUnavailable("forecast slice missing weather element".to_string())
        })?;

        Ok(Self {
            timestamp,
            temperature: payload.main.temp,
            description: condition.description,
            icon: condition.icon,
            rain_3h: payload.rain.and_then(|r| r.three_hour),
        })
    }
}
