//! One end-to-end weather evaluation, from location to alert.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use skywatch_alert::{change, dedup, render_alert, Notifier, NotifyError};
use skywatch_core::store::{keys, LastKnownLocation, Settings, StateStore};
use skywatch_weather::{LocationError, LocationResolver, WeatherClient, WeatherError};

/// Errors that abort a single evaluation.
#[derive(Error, Debug)]
pub enum TickError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// What a single evaluation concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing worth alerting on.
    NoChange,
    /// A significant change that already fired recently.
    Suppressed,
    /// An alert was delivered.
    Notified,
}

/// Resolves a location, compares now against the next hour, and alerts.
pub struct Pipeline {
    store: StateStore,
    resolver: LocationResolver,
    weather: WeatherClient,
    notifier: Box<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        store: StateStore,
        resolver: LocationResolver,
        weather: WeatherClient,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            resolver,
            weather,
            notifier,
        }
    }

    /// Read a stored record, treating a broken row like an absent one.
    ///
    /// A corrupt settings or location row should cost us its contents, not
    /// the whole tick.
    fn read_lenient<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring unreadable {} record: {}", key, e);
                None
            }
        }
    }

    /// Run one evaluation, logging failures instead of surfacing them.
    ///
    /// This is what the scheduler calls; a failed tick must not take the
    /// process down, and the next tick starts from scratch anyway.
    pub async fn run(&self) {
        match self.try_run().await {
            Ok(outcome) => tracing::debug!("Tick finished: {:?}", outcome),
            Err(e) => tracing::warn!("Tick aborted: {}", e),
        }
    }

    /// Run one evaluation and report how it concluded.
    #[instrument(skip(self))]
    pub async fn try_run(&self) -> Result<TickOutcome, TickError> {
        let settings: Settings = self.read_lenient(keys::SETTINGS).unwrap_or_default();
        let last_known: Option<LastKnownLocation> = self.read_lenient(keys::LAST_KNOWN);

        let coords = self
            .resolver
            .resolve(&self.store, &settings, last_known.as_ref())
            .await?;

        let current = self.weather.fetch_current(coords).await?;
        let forecast = self.weather.fetch_near_future(coords).await?;

        if !change::is_significant(&current, &forecast.observation) {
            return Ok(TickOutcome::NoChange);
        }

        let now = chrono::Utc::now().timestamp_millis();
        if !dedup::should_notify(&self.store, &current, &forecast.observation, now) {
            return Ok(TickOutcome::Suppressed);
        }

        let message = render_alert(&current, &forecast.observation);
        tracing::info!(
            source = %forecast.source,
            "Weather change ahead: {}",
            message.body.replace('\n', " / ")
        );
        self.notifier.send(&message).await?;

        Ok(TickOutcome::Notified)
    }
}
