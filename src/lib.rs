//! Skycast - a weather aggregation and caching service.
//!
//! # Overview
//!
//! Skycast proxies a third-party weather provider for a geographic point:
//! current conditions, a multi-day forecast aggregated from 3-hourly
//! samples, and advisory alerts derived from current conditions. Results
//! are combined into one composite response and served through a
//! time-bound in-memory cache so repeated lookups for the same point do
//! not hit the provider again within each entry's TTL.
//!
//! # Modules
//!
//! - [`model`]: Request-scoped value types for conditions, forecasts,
//!   alerts, and the composite report
//! - [`error`]: The pipeline's failure taxonomy
//! - [`upstream`]: HTTP clients for the weather and geocoding providers
//! - [`cache`]: Bounded TTL cache with LRU eviction
//! - [`aggregation`]: Forecast day-bucketing and alert synthesis
//! - [`region`]: Pluggable region-code resolution
//! - [`service`]: Read-through caching and the composite assembler
//! - [`api`]: HTTP API handlers

pub mod aggregation;
pub mod api;
pub mod cache;
pub mod error;
pub mod model;
pub mod region;
pub mod service;
pub mod upstream;
