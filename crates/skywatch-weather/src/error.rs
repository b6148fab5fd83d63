//! Error types for location resolution and weather retrieval.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("No geocoding match for \"{0}\"")]
    NoGeocodeResult(String),

    #[error("All location strategies exhausted")]
    NoCoordinates,

    #[error("Location request failed with status {0}")]
    Http(u16),

    #[error("Malformed location response: {0}")]
    Malformed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl LocationError {
    /// User-friendly message for logs and diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoGeocodeResult(query) => format!("No place found matching \"{}\"", query),
            Self::NoCoordinates => "Could not determine a location to watch".to_string(),
            Self::Http(status) => format!("Location service error ({})", status),
            Self::Malformed(_) => "Location service returned unexpected data".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Weather request failed with status {0}")]
    Http(u16),

    #[error("Current weather unavailable (provider code {0})")]
    CurrentUnavailable(i64),

    #[error("No near-future forecast available")]
    ForecastUnavailable,

    #[error("Malformed weather response: {0}")]
    Malformed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl WeatherError {
    /// User-friendly message for logs and diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(status) => format!("Weather service error ({})", status),
            Self::CurrentUnavailable(_) => "Current weather is unavailable".to_string(),
            Self::ForecastUnavailable => "No forecast is available right now".to_string(),
            Self::Malformed(_) => "Weather service returned unexpected data".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }
}
