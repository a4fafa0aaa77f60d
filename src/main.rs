//! Skycast - a weather aggregation and caching service.
//!
//! # API Endpoints
//!
//! - `GET /weather` - Composite report (current + forecast + alerts)
//! - `GET /weather/current` - Current conditions
//! - `GET /weather/forecast` - Aggregated daily forecast
//! - `GET /weather/alerts` - Derived advisory alerts
//! - `GET /geocode` - Resolve city/region/country to a coordinate
//! - `GET /health` - Health check
//!
//! # Configuration (environment)
//!
//! - `SKYCAST_API_KEY` - upstream provider API key (required)
//! - `SKYCAST_PORT` - listen port (default 3000)
//! - `SKYCAST_WEATHER_URL` / `SKYCAST_GEO_URL` - upstream base URLs
//! - `SKYCAST_CACHE_CAPACITY` - max entries per cache (default 1024)

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use skycast::api::{AppState, router};
use skycast::service::WeatherService;
use skycast::upstream::OpenWeatherClient;

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

/// Default base URLs for the upstream provider.
const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("skycast=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("SKYCAST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let api_key = env::var("SKYCAST_API_KEY").context("SKYCAST_API_KEY must be set")?;

    let weather_url =
        env::var("SKYCAST_WEATHER_URL").unwrap_or_else(|_| DEFAULT_WEATHER_URL.to_string());
    let geo_url = env::var("SKYCAST_GEO_URL").unwrap_or_else(|_| DEFAULT_GEO_URL.to_string());

    let cache_capacity: usize = env::var("SKYCAST_CACHE_CAPACITY")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(skycast::cache::DEFAULT_CAPACITY);

    info!(port, weather_url = %weather_url, cache_capacity, "Starting Skycast server");

    // Build the pipeline
    let client = OpenWeatherClient::with_base_urls(&api_key, &weather_url, &geo_url)?;
    let weather = WeatherService::with_options(
        client,
        std::sync::Arc::new(skycast::region::BoundingBoxResolver::brazil()),
        cache_capacity,
        skycast::service::CacheTtls::default(),
    );

    let state = AppState { weather };

    let app = router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Skycast is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
