//! Weather retrieval from OpenWeatherMap.
//!
//! Each tick needs two things: the current conditions and one near-future
//! observation. The near future prefers the hourly feed (one hour ahead) and
//! falls back to the 3-hour forecast feed when hourly data is unavailable
//! for the account or location.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{Coordinates, ForecastSource, NearForecast, Observation};

pub const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    cod: i64,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
    main: Option<MainReadings>,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    hourly: Vec<HourlyEntry>,
}

#[derive(Debug, Deserialize)]
struct HourlyEntry {
    temp: f64,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    cod: String,
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    main: MainReadings,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
}

fn observation(
    conditions: Vec<ConditionEntry>,
    temperature_c: f64,
) -> Result<Observation, WeatherError> {
    let condition = conditions
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Malformed("empty conditions list".to_string()))?;

    Ok(Observation {
        category: condition.main,
        description: condition.description,
        temperature_c,
    })
}

/// Client for the provider's current-conditions and forecast endpoints.
///
/// Units are always metric; the significance threshold downstream is defined
/// in Celsius.
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    lang: String,
}

impl WeatherClient {
    pub fn new(api_key: &str, lang: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, lang, OPENWEATHER_API_BASE)
    }

    /// Build a client against a custom endpoint (tests, proxies).
    pub fn with_base_url(api_key: &str, lang: &str, base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            lang: lang.to_string(),
        })
    }

    /// Fetch the current conditions at the given coordinates.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_current(&self, coords: Coordinates) -> Result<Observation, WeatherError> {
        let url = format!(
            "{}/data/2.5/weather?lat={}&lon={}&appid={}&units=metric&lang={}",
            self.base_url, coords.lat, coords.lon, self.api_key, self.lang,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::Http(response.status().as_u16()));
        }

        let body: CurrentResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        if body.cod != 200 {
            return Err(WeatherError::CurrentUnavailable(body.cod));
        }

        let main = body
            .main
            .ok_or_else(|| WeatherError::Malformed("missing main readings".to_string()))?;

        observation(body.weather, main.temp)
    }

    /// Fetch the near-future observation, preferring the hourly feed.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_near_future(
        &self,
        coords: Coordinates,
    ) -> Result<NearForecast, WeatherError> {
        match self.fetch_hour_ahead(coords).await {
            Ok(observation) => {
                return Ok(NearForecast {
                    observation,
                    source: ForecastSource::Hourly,
                });
            }
            Err(e) => {
                tracing::debug!("Hourly forecast unavailable: {}", e);
            }
        }

        match self.fetch_next_bucket(coords).await {
            Ok(observation) => Ok(NearForecast {
                observation,
                source: ForecastSource::ThreeHourBucket,
            }),
            Err(e) => {
                tracing::debug!("3-hour forecast unavailable: {}", e);
                Err(WeatherError::ForecastUnavailable)
            }
        }
    }

    async fn fetch_hour_ahead(&self, coords: Coordinates) -> Result<Observation, WeatherError> {
        let url = format!(
            "{}/data/3.0/onecall?lat={}&lon={}&exclude=minutely,daily,alerts&units=metric&lang={}&appid={}",
            self.base_url, coords.lat, coords.lon, self.lang, self.api_key,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::Http(response.status().as_u16()));
        }

        let body: OneCallResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        // hourly[0] is the current hour; the entry one hour out is the signal.
        let entry = body
            .hourly
            .into_iter()
            .nth(1)
            .ok_or_else(|| WeatherError::Malformed("hourly feed too short".to_string()))?;

        observation(entry.weather, entry.temp)
    }

    async fn fetch_next_bucket(&self, coords: Coordinates) -> Result<Observation, WeatherError> {
        let url = format!(
            "{}/data/2.5/forecast?lat={}&lon={}&appid={}&units=metric&lang={}",
            self.base_url, coords.lat, coords.lon, self.api_key, self.lang,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::Http(response.status().as_u16()));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        // This feed reports its status code as a string.
        if body.cod != "200" {
            return Err(WeatherError::Malformed(format!(
                "forecast feed returned code {}",
                body.cod
            )));
        }

        let entry = body
            .list
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Malformed("empty forecast list".to_string()))?;

        observation(entry.weather, entry.main.temp)
    }
}
