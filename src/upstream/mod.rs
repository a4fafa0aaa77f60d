//! Upstream provider clients.
//!
//! This module holds the HTTP clients the pipeline fetches raw data from.
//! All payloads are deserialized into explicit record types; any shape the
//! provider returns that we cannot decode fails closed as
//! [`crate::error::WeatherError::UpstreamUnavailable`].
//!
//! - [`openweather`]: current conditions, 3-hourly forecast samples, and
//!   forward geocoding from the OpenWeatherMap API family.

pub mod openweather;

pub use openweather::{CurrentObservation, ForecastSample, OpenWeatherClient};
