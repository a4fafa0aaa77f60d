//! Error taxonomy for the weather pipeline.
//!
//! Three failure classes are distinguished so that callers can react
//! differently to a provider outage, a bad address, and a short forecast
//! window. The HTTP layer maps these onto status codes in [`crate::api`].

use thiserror::Error;

/// Errors surfaced by the weather pipeline.
///
/// Upstream deserialization failures are deliberately folded into
/// [`WeatherError::UpstreamUnavailable`]: the provider's JSON schema is
/// outside our control, and a field change must fail closed rather than
/// surface as a panic or a half-populated record.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The weather or geocoding provider was unreachable, returned a
    /// non-2xx status, or returned a payload we could not decode.
    #[error("weather provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The geocoding provider returned zero matches for the given
    /// city/region/country. An input problem, not an outage.
    #[error("no location found for: {query}")]
    AddressNotFound {
        /// The address query as sent to the provider.
        query: String,
    },

    /// The provider returned no forecast samples at all, so not even a
    /// degraded (shorter) forecast can be built.
    #[error("not enough forecast samples to aggregate")]
    InsufficientData,

    /// The caller abandoned the request before an upstream call finished.
    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::UpstreamUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = WeatherError::AddressNotFound {
            query: "Atlantis,XX,ZZ".to_string(),
        };
        assert_eq!(err.to_string(), "no location found for: Atlantis,XX,ZZ");

        let err = WeatherError::UpstreamUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
