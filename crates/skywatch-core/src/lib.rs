//! Core infrastructure for skywatch: configuration, persistent state and
//! logging setup.

pub mod config;
pub mod store;

pub use config::{Config, ValidationResult};
pub use store::{
    LastKnownLocation, LocationMethod, NotificationRecord, Settings, StateStore, StoreError,
};

use anyhow::Result;

/// Initialize logging for the daemon.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("skywatch core initialized");
    Ok(())
}
