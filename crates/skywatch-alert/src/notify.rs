//! Alert rendering and delivery.

use async_trait::async_trait;
use thiserror::Error;

use skywatch_weather::Observation;

/// Application name reported to the notification service.
pub const APP_NAME: &str = "skywatch";

/// Errors raised while delivering an alert.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to deliver notification: {0}")]
    Delivery(String),
}

/// A rendered alert, ready to hand to a delivery backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
}

pub(crate) fn rounded_temp(temperature_c: f64) -> i64 {
    temperature_c.round() as i64
}

/// Render the alert for a current reading and the hour-ahead outlook.
///
/// Temperatures are shown as whole degrees.
pub fn render_alert(current: &Observation, upcoming: &Observation) -> AlertMessage {
    AlertMessage {
        title: "天氣即將變化".to_string(),
        body: format!(
            "目前：{} {}°C\n1小時後：{} {}°C",
            current.description,
            rounded_temp(current.temperature_c),
            upcoming.description,
            rounded_temp(upcoming.temperature_c)
        ),
    }
}

/// A delivery backend for rendered alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError>;
}

/// Writes alerts to the log instead of the desktop.
///
/// Used on platforms without a notification daemon and handy when running
/// headless.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        tracing::info!("{}: {}", message.title, message.body.replace('\n', " / "));
        Ok(())
    }
}

/// Delivers alerts over the desktop notification bus.
#[cfg(target_os = "linux")]
pub struct DesktopNotifier {
    icon: String,
}

#[cfg(target_os = "linux")]
impl DesktopNotifier {
    pub fn new(icon: &str) -> Self {
        Self {
            icon: icon.to_string(),
        }
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl Notifier for DesktopNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        use std::collections::HashMap;

        use zbus::zvariant::Value;

        let connection = zbus::Connection::session()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        // Urgency 2 = critical.
        let mut hints: HashMap<&str, Value> = HashMap::new();
        hints.insert("urgency", Value::U8(2));

        connection
            .call_method(
                Some("org.freedesktop.Notifications"),
                "/org/freedesktop/Notifications",
                Some("org.freedesktop.Notifications"),
                "Notify",
                &(
                    APP_NAME,
                    0u32,
                    self.icon.as_str(),
                    message.title.as_str(),
                    message.body.as_str(),
                    Vec::<&str>::new(),
                    hints,
                    -1i32,
                ),
            )
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        tracing::debug!("Delivered desktop notification");
        Ok(())
    }
}
