//! Common formatting helpers.
//!
//! - [`format_count`] - Format counts with K/M suffix (1.5K, 2.3M)
//! - [`format_elapsed`] - Format a run duration in seconds

use std::time::Duration;

/// Format a count with K/M suffix for compact display.
///
/// # Examples
/// ```
/// use autoblock::utils::format_count;
/// assert_eq!(format_count(500), "500");
/// assert_eq!(format_count(1500), "1.5K");
/// assert_eq!(format_count(1_500_000), "1.5M");
/// ```
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Format a duration as seconds with two decimals.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2} seconds", elapsed.as_secs_f64())
}
