//! Forward geocoding: convert a place name to coordinates.
//!
//! Uses the weather provider's direct geocoding endpoint, so one API key
//! covers both concerns.

use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

use crate::error::LocationError;
use crate::provider::OPENWEATHER_API_BASE;
use crate::types::Coordinates;

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for the provider's direct geocoding endpoint.
pub struct GeocodeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(api_key: &str) -> Result<Self, LocationError> {
        Self::with_base_url(api_key, OPENWEATHER_API_BASE)
    }

    /// Build a client against a custom endpoint (tests, proxies).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
        })
    }

    /// Geocode a place name, taking the provider's best match.
    #[instrument(skip(self), level = "debug")]
    pub async fn lookup(&self, query: &str) -> Result<Coordinates, LocationError> {
        let url = format!(
            "{}{}?q={}&limit=1&appid={}",
            self.base_url,
            GEOCODE_PATH,
            urlencoding::encode(query),
            self.api_key,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LocationError::Http(response.status().as_u16()));
        }

        let matches: Vec<Coordinates> = response
            .json()
            .await
            .map_err(|e| LocationError::Malformed(e.to_string()))?;

        matches
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NoGeocodeResult(query.to_string()))
    }
}
