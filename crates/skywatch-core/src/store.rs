//! SQLite-backed key/value store for daemon state.
//!
//! Every value is a JSON-encoded TEXT column. Writes are last-writer-wins;
//! nothing spans keys transactionally.

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Reserved keys shared across the daemon.
pub mod keys {
    /// User settings controlling location resolution.
    pub const SETTINGS: &str = "settings";
    /// Most recently resolved coordinates.
    pub const LAST_KNOWN: &str = "lastKnown";
    /// Fingerprint and timestamp of the last allowed notification.
    pub const LAST_NOTIFY: &str = "lastNotify";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the daemon should obtain coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationMethod {
    /// Geocode the user-provided place name.
    Manual,
    /// IP-based lookup first.
    Ip,
    /// Cached coordinates first, then IP lookup. Unrecognised values in the
    /// stored settings also land here.
    #[default]
    #[serde(other)]
    Geo,
}

impl LocationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Geo => "geo",
            Self::Manual => "manual",
            Self::Ip => "ip",
        }
    }
}

/// User settings, stored under [`keys::SETTINGS`].
///
/// The daemon seeds this record from the config file at startup and re-reads
/// it every tick, so edits made directly to the store take effect on the next
/// tick without a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub location_method: LocationMethod,
    pub location_input: Option<String>,
}

/// Coordinates cached by the location resolver, stored under
/// [`keys::LAST_KNOWN`]. There is no freshness bound; the `time` field is
/// diagnostic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastKnownLocation {
    pub lat: f64,
    pub lon: f64,
    /// Epoch milliseconds at the moment the coordinates were resolved.
    pub time: i64,
    /// Which resolution step produced the coordinates ("manual" or "ip").
    pub method: String,
}

/// Dedup record for the last allowed notification, stored under
/// [`keys::LAST_NOTIFY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub key: String,
    /// Epoch milliseconds at the moment the notification was allowed.
    pub time: i64,
}

/// SQLite-backed store for the daemon's persistent state.
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    /// Open (or create) a store at the given path.
    ///
    /// Parent directories are created as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store, for tests and ephemeral runs.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Read and decode the value stored under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let result: Result<String, rusqlite::Error> = self.conn.query_row(
            "SELECT value FROM state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Encode and store `value` under `key`, replacing any previous value.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO state (key, value) VALUES (?1, ?2)",
            params![key, json],
        )?;
        Ok(())
    }

    /// Remove the value stored under `key`, if any.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM state WHERE key = ?1", params![key])?;
        Ok(())
    }
}
