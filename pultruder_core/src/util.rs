//! Unit and time helpers shared by the controller and its callers.

use std::time::Duration;

/// Millimetres in one metre.
pub const MM_PER_M: f64 = 1_000.0;
/// Seconds in one minute.
pub const SECS_PER_MIN: f64 = 60.0;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Compute the polling period in milliseconds for a refresh rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 millisecond.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Render a duration as `HH:MM:SS`, truncating fractional seconds.
/// Hours widen past two digits instead of wrapping.
pub fn format_hms(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
