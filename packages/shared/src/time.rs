//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (seconds)
    fn now_epoch_secs(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        get_epoch_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_secs: i64) -> Self {
        Self {
            fixed_time: fixed_time_secs,
        }
    }
}

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (seconds)
pub fn get_epoch_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Convert a Unix timestamp (seconds) to a `HH:MM:SS` string in the given zone.
///
/// Out-of-range timestamps render as `--:--:--`.
pub fn format_clock_time_in<Tz: TimeZone>(timestamp_secs: i64, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(timestamp_secs, 0) {
        Some(utc) => utc.with_timezone(zone).format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

/// Convert a Unix timestamp (seconds) to a local `HH:MM:SS` string
pub fn format_local_clock_time(timestamp_secs: i64) -> String {
    format_clock_time_in(timestamp_secs, &Local)
}
