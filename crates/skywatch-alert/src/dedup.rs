//! Suppression of repeated alerts.
//!
//! An alert is fingerprinted by its rendered content. If the same
//! fingerprint fired recently, the new one is dropped; anything that goes
//! wrong while checking errs on the side of notifying.

use skywatch_core::store::{keys, NotificationRecord, StateStore};
use skywatch_weather::Observation;

use crate::notify::rounded_temp;

/// How long an identical alert stays suppressed, in milliseconds.
pub const DEDUP_WINDOW_MS: i64 = 45 * 60 * 1000;

/// Fingerprint for an alert, built from what the user would actually see.
///
/// Temperatures are rounded the same way the notification body rounds
/// them, so sub-degree drift between ticks does not defeat suppression.
pub fn build_key(current: &Observation, upcoming: &Observation) -> String {
    format!(
        "{}|{}|{}|{}",
        current.description,
        rounded_temp(current.temperature_c),
        upcoming.description,
        rounded_temp(upcoming.temperature_c)
    )
}

/// Whether this alert should be delivered, given what fired before.
///
/// Returns false only when the store holds a record with the same key
/// newer than [`DEDUP_WINDOW_MS`]. On delivery the record is refreshed;
/// store failures in either direction are logged and do not block the
/// alert.
pub fn should_notify(
    store: &StateStore,
    current: &Observation,
    upcoming: &Observation,
    now: i64,
) -> bool {
    let key = build_key(current, upcoming);

    match store.get::<NotificationRecord>(keys::LAST_NOTIFY) {
        Ok(Some(record)) if record.key == key && now - record.time < DEDUP_WINDOW_MS => {
            tracing::debug!("Suppressing repeat alert: {}", key);
            return false;
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("Could not read last alert record: {}", e);
        }
    }

    let record = NotificationRecord { key, time: now };
    if let Err(e) = store.put(keys::LAST_NOTIFY, &record) {
        tracing::warn!("Could not record alert for suppression: {}", e);
    }
    true
}
