//! Data models for Skycast.
//!
//! All types here are transient, request-scoped value objects. Nothing in
//! this module is persisted; the only state with a lifetime beyond one
//! request is the in-memory cache in [`crate::cache`], which stores these
//! values until their TTL elapses.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel identifier for the informational "no alerts" placeholder.
pub const NO_ALERT_ID: &str = "no-alert";

/// A validated geographic query point.
///
/// Latitude is confined to [-90, 90] and longitude to [-180, 180].
/// The raw values are used verbatim in cache keys; no snapping or
/// rounding is applied beyond literal equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// Current conditions at a coordinate, as assembled from one upstream
/// fetch plus local region resolution.
///
/// Immutable once constructed. Lives for one cache TTL window
/// (10 minutes) or a single request if uncached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// City name as reported by the provider.
    pub city: String,

    /// Region code derived locally (the current-conditions endpoint does
    /// not supply one). See [`crate::region`].
    pub region: String,

    /// ISO country code from the provider.
    pub country: String,

    /// Temperature in degrees Celsius.
    pub temperature: f64,

    /// Apparent ("feels like") temperature in degrees Celsius.
    pub feels_like: f64,

    /// Relative humidity, 0-100.
    pub humidity: f64,

    /// Short textual description, e.g. "scattered clouds".
    pub description: String,

    /// Full URL of the provider's condition icon.
    pub icon: String,

    /// When this record was retrieved (UTC, server-side).
    pub updated_at: DateTime<Utc>,
}

/// One aggregated forecast day.
///
/// Derived from 3-hourly samples by [`crate::aggregation`]; never mutated
/// after construction. Lives for one cache TTL window (1 hour).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    /// UTC calendar date this entry covers.
    pub date: NaiveDate,

    /// Minimum temperature over the day's samples.
    pub temperature_min: f64,

    /// Maximum temperature over the day's samples.
    pub temperature_max: f64,

    /// Most frequent description among the day's samples.
    pub description: String,

    /// Icon URL for the most frequent icon code.
    pub icon: String,

    /// Percentage of samples reporting a non-null precipitation amount.
    pub chance_of_rain: f64,
}

/// Advisory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    /// High humidity, heavy rain possible.
    HeavyRain,
    /// Temperature above the heat threshold.
    HighHeat,
    /// Placeholder when no advisory fires.
    Informational,
}

impl AlertCategory {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AlertCategory::HeavyRain => "heavy rain advisory",
            AlertCategory::HighHeat => "high heat advisory",
            AlertCategory::Informational => "no alerts",
        }
    }
}

/// Advisory severity tiers, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Moderate,
    High,
}

/// An advisory alert derived from current conditions.
///
/// Alerts are synthesized on every current-conditions read and never
/// cached independently; they always reflect the then-current record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Random identifier, or [`NO_ALERT_ID`] for the placeholder.
    pub id: String,

    /// Advisory category.
    pub category: AlertCategory,

    /// Severity tier.
    pub severity: AlertSeverity,

    /// Short title.
    pub title: String,

    /// Free-text description.
    pub description: String,

    /// Validity window start (UTC).
    pub start_time: DateTime<Utc>,

    /// Validity window end (UTC).
    pub end_time: DateTime<Utc>,

    /// Names of affected areas.
    pub affected_areas: Vec<String>,
}

impl Alert {
    /// Create an advisory with a freshly generated identifier.
    pub fn advisory(
        category: AlertCategory,
        severity: AlertSeverity,
        title: &str,
        description: &str,
        valid_hours: i64,
        area: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category,
            severity,
            title: title.to_string(),
            description: description.to_string(),
            start_time: now,
            end_time: now + chrono::Duration::hours(valid_hours),
            affected_areas: vec![area.to_string()],
        }
    }

    /// Create the informational placeholder emitted when nothing fires.
    pub fn placeholder(area: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: NO_ALERT_ID.to_string(),
            category: AlertCategory::Informational,
            severity: AlertSeverity::Low,
            title: "No active alerts".to_string(),
            description: "There are no weather alerts for your area at the moment".to_string(),
            start_time: now,
            end_time: now,
            affected_areas: vec![area.to_string()],
        }
    }
}

/// A HATEOAS-style cross-link in a composite response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Relative URL of the linked operation.
    pub href: String,

    /// HTTP method to use.
    pub method: String,
}

impl Link {
    /// Create a GET link.
    pub fn get(href: String) -> Self {
        Self {
            href,
            method: "GET".to_string(),
        }
    }
}

/// The merged current + forecast + alerts response for one coordinate.
///
/// Assembled fresh per request from the three sub-results and never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeWeatherReport {
    /// Current conditions at the query point.
    pub current: CurrentConditions,

    /// Up to 6 aggregated forecast days in ascending date order.
    pub forecast: Vec<DailyForecast>,

    /// Advisory alerts; always at least the placeholder.
    pub alerts: Vec<Alert>,

    /// Cross-links to the sub-resources.
    #[serde(default)]
    pub links: HashMap<String, Link>,
}

/// A resolved forward-geocoding result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub latitude: f64,
    pub longitude: f64,

    /// Human-readable "name, region, country" string.
    pub formatted_address: String,
}

/// Query parameters for the coordinate-based weather endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CoordinateQuery {
    pub latitude: f64,
    pub longitude: f64,
}

/// Query parameters for GET /geocode.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeQuery {
    pub city: String,
    pub region: String,
    pub country: String,
}
