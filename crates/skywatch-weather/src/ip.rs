//! IP-based geolocation.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::LocationError;
use crate::types::Coordinates;

const IPAPI_BASE: &str = "https://ipapi.co";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Client for the ipapi.co JSON endpoint.
pub struct IpLocator {
    client: Client,
    base_url: String,
}

impl IpLocator {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_base_url(IPAPI_BASE)
    }

    /// Build a client against a custom endpoint (tests, proxies).
    pub fn with_base_url(base_url: &str) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Approximate coordinates for the machine's public IP.
    pub async fn lookup(&self) -> Result<Coordinates, LocationError> {
        let url = format!("{}/json/", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LocationError::Http(response.status().as_u16()));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Malformed(e.to_string()))?;

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Ok(Coordinates { lat, lon })
            }
            _ => Err(LocationError::Malformed(
                "missing coordinates in IP lookup response".to_string(),
            )),
        }
    }
}
