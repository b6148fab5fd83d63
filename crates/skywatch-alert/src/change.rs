//! Decides whether two readings differ enough to alert on.

use skywatch_weather::Observation;

/// Temperature swings at or above this many degrees Celsius are
/// significant on their own.
pub const SIGNIFICANT_TEMP_DELTA_C: f64 = 2.0;

/// True when the upcoming reading differs from the current one in a way
/// the user should hear about.
///
/// Either the condition category changes ("Rain" to "Clear") or the
/// temperature moves by [`SIGNIFICANT_TEMP_DELTA_C`] or more. The
/// comparison uses the raw temperatures, not the rounded values shown in
/// the notification.
pub fn is_significant(current: &Observation, upcoming: &Observation) -> bool {
    if current.category != upcoming.category {
        return true;
    }
    (upcoming.temperature_c - current.temperature_c).abs() >= SIGNIFICANT_TEMP_DELTA_C
}
