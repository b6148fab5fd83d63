use std::time::Duration;

use anyhow::{Context, Result};

use skywatch_core::store::{keys, StateStore};
use skywatch_core::Config;
use skywatch_weather::{GeocodeClient, IpLocator, LocationResolver, WeatherClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    skywatch_core::init()?;

    let (config, _validation) =
        Config::load_validated().context("Failed to load configuration")?;

    let store = StateStore::open(&config.store.path).with_context(|| {
        format!(
            "Failed to open state store at {}",
            config.store.path.display()
        )
    })?;

    // The config file is how the user expresses a location preference; the
    // ticks read the stored record. Seed it so the first tick sees the
    // configured values.
    store
        .put(keys::SETTINGS, &config.location.settings())
        .context("Failed to seed settings")?;

    let geocoder = GeocodeClient::with_base_url(&config.api.key, &config.api.weather_base_url)
        .context("Failed to build geocoding client")?;
    let ip = IpLocator::with_base_url(&config.api.ip_base_url)
        .context("Failed to build IP location client")?;
    let weather =
        WeatherClient::with_base_url(&config.api.key, &config.api.lang, &config.api.weather_base_url)
            .context("Failed to build weather client")?;

    let pipeline = skywatch::Pipeline::new(
        store,
        LocationResolver::new(geocoder, ip),
        weather,
        build_notifier(&config),
    );

    tracing::info!(
        "Skywatch started, checking every {} minutes",
        config.scheduler.tick_minutes
    );

    let period = Duration::from_secs(u64::from(config.scheduler.tick_minutes) * 60);
    skywatch::scheduler::run(&pipeline, period).await;

    Ok(())
}

#[cfg(target_os = "linux")]
fn build_notifier(config: &Config) -> Box<dyn skywatch_alert::Notifier> {
    Box::new(skywatch_alert::DesktopNotifier::new(&config.notify.icon))
}

#[cfg(not(target_os = "linux"))]
fn build_notifier(_config: &Config) -> Box<dyn skywatch_alert::Notifier> {
    Box::new(skywatch_alert::LogNotifier)
}
