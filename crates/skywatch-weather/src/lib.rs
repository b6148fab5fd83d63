//! Location resolution and weather retrieval for skywatch.
//!
//! Coordinates come from a user-provided place name, the machine's public IP
//! or the cached result of a previous resolution, in an order decided by the
//! stored settings. Weather comes from OpenWeatherMap's current-conditions
//! and forecast endpoints.

pub mod error;
pub mod geocode;
pub mod ip;
pub mod location;
pub mod provider;
pub mod types;

pub use error::{LocationError, WeatherError};
pub use geocode::GeocodeClient;
pub use ip::IpLocator;
pub use location::{strategy_plan, LocationResolver, LocationStrategy};
pub use provider::WeatherClient;
pub use types::{Coordinates, ForecastSource, NearForecast, Observation};
