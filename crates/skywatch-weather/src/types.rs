//! Domain types shared by location resolution and weather retrieval.

use serde::{Deserialize, Serialize};

/// A pair of WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A single weather state, observed now or forecast for the near future.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Coarse condition group reported by the provider (e.g. "Clouds").
    pub category: String,
    /// Finer, localized condition label (e.g. "陰，多雲").
    pub description: String,
    /// Air temperature in degrees Celsius.
    pub temperature_c: f64,
}

/// Which forecast feed produced a near-future observation.
///
/// Informational only; downstream logic treats both feeds the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastSource {
    /// The hourly feed, one hour ahead.
    Hourly,
    /// The 3-hour forecast feed, up to three hours ahead.
    ThreeHourBucket,
}

impl std::fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hourly => write!(f, "hourly"),
            Self::ThreeHourBucket => write!(f, "3-hour-bucket"),
        }
    }
}

/// A near-future observation together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct NearForecast {
    pub observation: Observation,
    pub source: ForecastSource,
}
