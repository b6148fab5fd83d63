//! Settings-driven location resolution.
//!
//! Each resolution method expands into an explicit, ordered list of
//! strategies, so the fallback order is visible and testable instead of
//! being buried in nested error handling.

use tracing::instrument;

use skywatch_core::store::{keys, LastKnownLocation, LocationMethod, Settings, StateStore};

use crate::error::LocationError;
use crate::geocode::GeocodeClient;
use crate::ip::IpLocator;
use crate::types::Coordinates;

/// One step of a resolution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStrategy {
    /// Geocode the user-provided place name. Failures abort resolution.
    GeocodeQuery,
    /// Ask the IP geolocation service. Failures fall through to the next
    /// strategy.
    IpLookup,
    /// Reuse cached coordinates, regardless of their age.
    LastKnown,
}

/// The stored manual query, verbatim. Only a missing or empty string
/// disables the manual path; a whitespace-only query still counts.
fn manual_query(settings: &Settings) -> Option<&str> {
    settings.location_input.as_deref().filter(|q| !q.is_empty())
}

/// The ordered strategies for the given settings.
///
/// A manual method with a missing or empty place name degrades to the
/// default chain rather than failing.
pub fn strategy_plan(settings: &Settings) -> Vec<LocationStrategy> {
    match settings.location_method {
        LocationMethod::Manual if manual_query(settings).is_some() => {
            vec![LocationStrategy::GeocodeQuery]
        }
        LocationMethod::Ip => vec![
            LocationStrategy::IpLookup,
            LocationStrategy::LastKnown,
            LocationStrategy::IpLookup,
        ],
        _ => vec![LocationStrategy::LastKnown, LocationStrategy::IpLookup],
    }
}

/// Resolves coordinates for a tick by walking the strategy plan.
pub struct LocationResolver {
    geocoder: GeocodeClient,
    ip: IpLocator,
}

impl LocationResolver {
    pub fn new(geocoder: GeocodeClient, ip: IpLocator) -> Self {
        Self { geocoder, ip }
    }

    /// Resolve coordinates for the current settings.
    ///
    /// `last_known` is whatever the caller read from the store for this tick.
    /// Successful geocode and IP steps persist a fresh record, best effort;
    /// the cached step never refreshes it.
    #[instrument(skip(self, store, last_known), level = "debug")]
    pub async fn resolve(
        &self,
        store: &StateStore,
        settings: &Settings,
        last_known: Option<&LastKnownLocation>,
    ) -> Result<Coordinates, LocationError> {
        for strategy in strategy_plan(settings) {
            match strategy {
                LocationStrategy::GeocodeQuery => {
                    // Presence guaranteed by strategy_plan.
                    let query = manual_query(settings).unwrap_or_default();
                    let coords = self.geocoder.lookup(query).await?;
                    self.remember(store, coords, LocationMethod::Manual);
                    return Ok(coords);
                }
                LocationStrategy::IpLookup => match self.ip.lookup().await {
                    Ok(coords) => {
                        self.remember(store, coords, LocationMethod::Ip);
                        return Ok(coords);
                    }
                    Err(e) => {
                        tracing::debug!("IP lookup failed: {}", e);
                    }
                },
                LocationStrategy::LastKnown => {
                    if let Some(cached) = last_known {
                        if cached.lat.is_finite() && cached.lon.is_finite() {
                            tracing::debug!(
                                "Using coordinates cached by a {} resolution",
                                cached.method
                            );
                            return Ok(Coordinates {
                                lat: cached.lat,
                                lon: cached.lon,
                            });
                        }
                        tracing::warn!("Cached coordinates are not usable, skipping");
                    }
                }
            }
        }

        Err(LocationError::NoCoordinates)
    }

    fn remember(&self, store: &StateStore, coords: Coordinates, method: LocationMethod) {
        let record = LastKnownLocation {
            lat: coords.lat,
            lon: coords.lon,
            time: chrono::Utc::now().timestamp_millis(),
            method: method.as_str().to_string(),
        };
        if let Err(e) = store.put(keys::LAST_KNOWN, &record) {
            tracing::warn!("Failed to persist resolved location: {}", e);
        }
    }
}
