//! Region-code resolution for current conditions.
//!
//! The current-conditions endpoint of the upstream provider does not
//! report a state/region code, so the pipeline derives one locally. The
//! strategy is pluggable: the default implementation matches against a
//! short list of hardcoded latitude/longitude rectangles, and a proper
//! reverse-geocoding implementation can be substituted without touching
//! the rest of the pipeline.

use crate::model::Coordinate;

/// Strategy for deriving a region code from a coordinate.
pub trait RegionResolver: Send + Sync {
    /// Resolve a region code, or `None` when the strategy has no answer.
    fn resolve(&self, coord: Coordinate) -> Option<String>;
}

/// An axis-aligned latitude/longitude rectangle tagged with a region code.
#[derive(Debug, Clone)]
pub struct RegionBox {
    pub code: &'static str,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionBox {
    fn contains(&self, coord: Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&coord.latitude)
            && (self.lon_min..=self.lon_max).contains(&coord.longitude)
    }
}

/// Rectangle-lookup resolver.
///
/// Boxes are checked in declaration order and the first match wins; some
/// rectangles overlap near state borders, so ordering is part of the
/// configuration. Falls back to a generic code when nothing matches.
pub struct BoundingBoxResolver {
    boxes: Vec<RegionBox>,
    fallback: &'static str,
}

impl BoundingBoxResolver {
    /// Create a resolver over the given boxes with a fallback code.
    pub fn new(boxes: Vec<RegionBox>, fallback: &'static str) -> Self {
        Self { boxes, fallback }
    }

    /// The stock configuration: four Brazilian state rectangles with a
    /// country-level fallback.
    pub fn brazil() -> Self {
        Self::new(
            vec![
                RegionBox {
                    code: "SP",
                    lat_min: -24.0,
                    lat_max: -22.0,
                    lon_min: -47.0,
                    lon_max: -45.0,
                },
                RegionBox {
                    code: "RJ",
                    lat_min: -23.0,
                    lat_max: -22.0,
                    lon_min: -44.0,
                    lon_max: -42.0,
                },
                RegionBox {
                    code: "MG",
                    lat_min: -22.0,
                    lat_max: -18.0,
                    lon_min: -47.0,
                    lon_max: -43.0,
                },
                RegionBox {
                    code: "PR",
                    lat_min: -26.0,
                    lat_max: -23.0,
                    lon_min: -54.0,
                    lon_max: -48.0,
                },
            ],
            "BR",
        )
    }
}

impl RegionResolver for BoundingBoxResolver {
    fn resolve(&self, coord: Coordinate) -> Option<String> {
        let code = self
            .boxes
            .iter()
            .find(|b| b.contains(coord))
            .map(|b| b.code)
            .unwrap_or(self.fallback);
        Some(code.to_string())
    }
}
