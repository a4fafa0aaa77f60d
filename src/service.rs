//! The weather pipeline service: read-through caching in front of the
//! upstream client, plus the composite assembler.
//!
//! Every operation consults the cache first and falls back to one
//! upstream fetch on a miss. Two requests that miss simultaneously may
//! both fetch; the second write wins, which is acceptable for this data.
//!
//! The composite operation is a two-stage pipeline: current conditions
//! and the forecast are fetched concurrently, then alerts are derived
//! from the current result of stage one. Alerts are never fetched or
//! cached on their own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregation::{aggregate_daily, synthesize_alerts};
use crate::cache::{self, CURRENT_TTL, DEFAULT_CAPACITY, FORECAST_TTL, GEOCODE_TTL, TtlCache};
use crate::error::WeatherError;
use crate::model::{
    Alert, CompositeWeatherReport, Coordinate, CurrentConditions, DailyForecast, GeocodedAddress,
    Link,
};
use crate::region::{BoundingBoxResolver, RegionResolver};
use crate::upstream::OpenWeatherClient;

/// Per-family cache TTLs. The defaults match the pipeline contract:
/// current conditions 10 minutes, forecasts 1 hour, geocoding 24 hours.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub current: Duration,
    pub forecast: Duration,
    pub geocode: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            current: CURRENT_TTL,
            forecast: FORECAST_TTL,
            geocode: GEOCODE_TTL,
        }
    }
}

/// Weather aggregation service.
///
/// Cheap to clone; clones share the underlying caches.
#[derive(Clone)]
pub struct WeatherService {
    client: OpenWeatherClient,
    region: Arc<dyn RegionResolver>,
    ttls: CacheTtls,
    current_cache: TtlCache<CurrentConditions>,
    forecast_cache: TtlCache<Vec<DailyForecast>>,
    geocode_cache: TtlCache<GeocodedAddress>,
}

impl WeatherService {
    /// Create a service with the stock region resolver and default cache
    /// sizing.
    pub fn new(client: OpenWeatherClient) -> Self {
        Self::with_options(
            client,
            Arc::new(BoundingBoxResolver::brazil()),
            DEFAULT_CAPACITY,
            CacheTtls::default(),
        )
    }

    /// Create a service with an explicit region resolver, cache capacity
    /// and TTL configuration.
    pub fn with_options(
        client: OpenWeatherClient,
        region: Arc<dyn RegionResolver>,
        cache_capacity: usize,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            client,
            region,
            ttls,
            current_cache: TtlCache::new(cache_capacity),
            forecast_cache: TtlCache::new(cache_capacity),
            geocode_cache: TtlCache::new(cache_capacity),
        }
    }

    /// Current conditions for a coordinate, served from cache within the
    /// TTL window.
    pub async fn current_weather(
        &self,
        coord: Coordinate,
        cancel: &CancellationToken,
    ) -> Result<CurrentConditions, WeatherError> {
        let key = cache::current_key(coord);
        if let Some(hit) = self.current_cache.get(&key) {
            debug!(%key, "current conditions served from cache");
            return Ok(hit);
        }

        let observation = self.client.fetch_current(coord, cancel).await?;
        let region = self
            .region
            .resolve(coord)
            .unwrap_or_else(|| observation.country.clone());

        let current = CurrentConditions {
            city: observation.city,
            region,
            country: observation.country,
            temperature: observation.temperature,
            feels_like: observation.feels_like,
            humidity: observation.humidity,
            description: observation.description,
            icon: observation.icon,
            updated_at: Utc::now(),
        };

        info!(city = %current.city, "fetched current conditions");
        self.current_cache
            .insert(&key, current.clone(), self.ttls.current);
        Ok(current)
    }

    /// Aggregated daily forecast for a coordinate, served from cache
    /// within the TTL window. May return fewer than 6 days when the
    /// provider window is short.
    pub async fn forecast(
        &self,
        coord: Coordinate,
        cancel: &CancellationToken,
    ) -> Result<Vec<DailyForecast>, WeatherError> {
        let key = cache::forecast_key(coord);
        if let Some(hit) = self.forecast_cache.get(&key) {
            debug!(%key, "forecast served from cache");
            return Ok(hit);
        }

        let samples = self.client.fetch_forecast(coord, cancel).await?;
        let forecast = aggregate_daily(&samples)?;

        info!(days = forecast.len(), "aggregated forecast");
        self.forecast_cache
            .insert(&key, forecast.clone(), self.ttls.forecast);
        Ok(forecast)
    }

    /// Advisory alerts derived from (possibly cached) current conditions.
    pub async fn alerts(
        &self,
        coord: Coordinate,
        cancel: &CancellationToken,
    ) -> Result<Vec<Alert>, WeatherError> {
        let current = self.current_weather(coord, cancel).await?;
        Ok(synthesize_alerts(&current, Utc::now()))
    }

    /// The composite report for a coordinate.
    ///
    /// Stage 1 runs the current and forecast fetches concurrently; stage 2
    /// derives alerts from stage 1's current result. Any stage-1 failure
    /// fails the whole operation; partial reports are never returned.
    pub async fn composite(
        &self,
        coord: Coordinate,
        cancel: &CancellationToken,
    ) -> Result<CompositeWeatherReport, WeatherError> {
        let (current, forecast) = tokio::join!(
            self.current_weather(coord, cancel),
            self.forecast(coord, cancel),
        );
        let current = current?;
        let forecast = forecast?;

        let alerts = synthesize_alerts(&current, Utc::now());

        Ok(CompositeWeatherReport {
            current,
            forecast,
            alerts,
            links: composite_links(coord),
        })
    }

    /// Resolve an address into a coordinate, served from cache within the
    /// TTL window.
    pub async fn geocode(
        &self,
        city: &str,
        region: &str,
        country: &str,
        cancel: &CancellationToken,
    ) -> Result<GeocodedAddress, WeatherError> {
        let key = cache::geocode_key(city, region, country);
        if let Some(hit) = self.geocode_cache.get(&key) {
            debug!(%key, "geocoding served from cache");
            return Ok(hit);
        }

        let address = self.client.geocode(city, region, country, cancel).await?;

        info!(address = %address.formatted_address, "geocoded address");
        self.geocode_cache
            .insert(&key, address.clone(), self.ttls.geocode);
        Ok(address)
    }
}

fn composite_links(coord: Coordinate) -> HashMap<String, Link> {
    let query = format!(
        "latitude={}&longitude={}",
        coord.latitude, coord.longitude
    );
    HashMap::from([
        ("self".to_string(), Link::get(format!("/weather?{query}"))),
        (
            "current".to_string(),
            Link::get(format!("/weather/current?{query}")),
        ),
        (
            "forecast".to_string(),
            Link::get(format!("/weather/forecast?{query}")),
        ),
        (
            "alerts".to_string(),
            Link::get(format!("/weather/alerts?{query}")),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_links_cover_sub_resources() {
        let coord = Coordinate::new(-23.55, -46.63).unwrap();
        let links = composite_links(coord);

        for rel in ["self", "current", "forecast", "alerts"] {
            let link = links.get(rel).unwrap();
            assert_eq!(link.method, "GET");
            assert!(link.href.contains("latitude=-23.55"));
            assert!(link.href.contains("longitude=-46.63"));
        }
    }

    #[test]
    fn test_default_ttls_match_contract() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.current, Duration::from_secs(600));
        assert_eq!(ttls.forecast, Duration::from_secs(3600));
        assert_eq!(ttls.geocode, Duration::from_secs(86400));
    }
}
