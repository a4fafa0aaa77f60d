//! Aggregation logic: forecast day-bucketing and alert synthesis.
//!
//! The forecast aggregator folds the provider's 3-hourly samples into
//! calendar days, computing min/max temperature, the modal description
//! and icon, and a rain probability per day. The alert synthesizer is a
//! pure function of one `CurrentConditions` record; it threshold-checks
//! humidity and temperature.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::WeatherError;
use crate::model::{Alert, AlertCategory, AlertSeverity, CurrentConditions, DailyForecast};
use crate::upstream::ForecastSample;
use crate::upstream::openweather::icon_url;

/// Maximum number of aggregated days returned.
const MAX_FORECAST_DAYS: usize = 6;

/// Day-groups with fewer samples than this are dropped rather than
/// reported as a (meaningless) one-sample min/max day.
const MIN_SAMPLES_PER_DAY: usize = 2;

/// Relative humidity above which a heavy-rain advisory fires.
const HUMIDITY_THRESHOLD: f64 = 80.0;

/// Temperature (Celsius) above which a high-heat advisory fires.
const HEAT_THRESHOLD: f64 = 35.0;

#[derive(Default)]
struct DayBucket {
    temperatures: Vec<f64>,
    descriptions: Vec<String>,
    icons: Vec<String>,
    rain_count: usize,
}

/// Aggregate raw forecast samples into up to [`MAX_FORECAST_DAYS`] daily
/// entries, ascending by date.
///
/// The first calendar-date group is always skipped: the provider window
/// starts mid-day, so that group is a partial "today". A short provider
/// window degrades to fewer days; it is never padded. Only a completely
/// empty sample list is an error.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Result<Vec<DailyForecast>, WeatherError> {
    if samples.is_empty() {
        return Err(WeatherError::InsufficientData);
    }

    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for sample in samples {
        let bucket = days.entry(sample.timestamp.date_naive()).or_default();
        bucket.temperatures.push(sample.temperature);
        bucket.descriptions.push(sample.description.clone());
        bucket.icons.push(sample.icon.clone());
        if sample.rain_3h.is_some() {
            bucket.rain_count += 1;
        }
    }

    let forecasts = days
        .into_iter()
        .skip(1)
        .filter(|(_, bucket)| bucket.temperatures.len() >= MIN_SAMPLES_PER_DAY)
        .take(MAX_FORECAST_DAYS)
        .map(|(date, bucket)| {
            let total = bucket.temperatures.len();
            DailyForecast {
                date,
                temperature_min: bucket
                    .temperatures
                    .iter()
                    .copied()
                    .fold(f64::INFINITY, f64::min),
                temperature_max: bucket
                    .temperatures
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max),
                description: mode(&bucket.descriptions).unwrap_or_default(),
                icon: icon_url(&mode(&bucket.icons).unwrap_or_default()),
                chance_of_rain: (bucket.rain_count as f64 / total as f64) * 100.0,
            }
        })
        .collect();

    Ok(forecasts)
}

/// Most frequent value in `items`, ties broken by first occurrence.
fn mode(items: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.as_str()).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;

    items
        .iter()
        .find(|item| counts[item.as_str()] == best)
        .cloned()
}

/// Derive advisory alerts from current conditions.
///
/// Humidity above 80 fires a heavy-rain advisory valid for 6 hours;
/// temperature above 35°C fires a high-heat advisory valid for 8 hours.
/// Both can fire at once. When neither fires, a single informational
/// placeholder with the fixed sentinel id is emitted instead.
pub fn synthesize_alerts(current: &CurrentConditions, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if current.humidity > HUMIDITY_THRESHOLD {
        alerts.push(Alert::advisory(
            AlertCategory::HeavyRain,
            AlertSeverity::Moderate,
            "Heavy rain possible",
            "High humidity may bring heavy rain over the next few hours",
            6,
            &current.city,
            now,
        ));
    }

    if current.temperature > HEAT_THRESHOLD {
        alerts.push(Alert::advisory(
            AlertCategory::HighHeat,
            AlertSeverity::High,
            "High temperature alert",
            "Temperatures above 35°C. Stay hydrated and avoid sun exposure",
            8,
            &current.city,
            now,
        ));
    }

    if alerts.is_empty() {
        alerts.push(Alert::placeholder(&current.city, now));
    }

    alerts
}
