//! Human-readable position formatting for console output

use crate::units::PositionUnit;

const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Format a nanosecond clock value as `M:SS.mmm` or `H:MM:SS.mmm`
///
/// # Examples
///
/// ```
/// use playctl_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0), "0:00.000");
/// assert_eq!(format_clock(83_250_000_000), "1:23.250");
/// assert_eq!(format_clock(3_723_000_000_000), "1:02:03.000");
/// ```
pub fn format_clock(nanos: u64) -> String {
    let millis = (nanos % NANOS_PER_SECOND) / NANOS_PER_MILLI;
    let total_secs = nanos / NANOS_PER_SECOND;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    } else {
        format!("{}:{:02}.{:03}", mins, secs, millis)
    }
}

/// Format a position or duration in the given unit
///
/// Unresolved values render as `unknown`, never as zero.
///
/// ```
/// use playctl_common::human_time::format_position;
/// use playctl_common::PositionUnit;
///
/// assert_eq!(format_position(None, PositionUnit::Nanoseconds), "unknown");
/// assert_eq!(format_position(Some(2048), PositionUnit::Bytes), "2048 bytes");
/// ```
pub fn format_position(value: Option<u64>, unit: PositionUnit) -> String {
    match (value, unit) {
        (None, _) => "unknown".to_string(),
        (Some(nanos), PositionUnit::Nanoseconds) => format_clock(nanos),
        (Some(bytes), PositionUnit::Bytes) => format!("{} bytes", bytes),
    }
}

/// Convert milliseconds to nanoseconds, saturating on overflow
pub fn millis_to_nanos(millis: u64) -> u64 {
    millis.saturating_mul(NANOS_PER_MILLI)
}

/// Convert nanoseconds to whole milliseconds
pub fn nanos_to_millis(nanos: u64) -> u64 {
    nanos / NANOS_PER_MILLI
}
