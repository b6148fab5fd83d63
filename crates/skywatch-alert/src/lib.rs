//! Change detection and alert delivery.
//!
//! Decides whether a pair of weather readings is worth telling the user
//! about, suppresses repeats of the same alert, and renders and delivers
//! the notification itself.

pub mod change;
pub mod dedup;
pub mod notify;

pub use change::{is_significant, SIGNIFICANT_TEMP_DELTA_C};
pub use dedup::{build_key, should_notify, DEDUP_WINDOW_MS};
#[cfg(target_os = "linux")]
pub use notify::DesktopNotifier;
pub use notify::{render_alert, AlertMessage, LogNotifier, Notifier, NotifyError};
