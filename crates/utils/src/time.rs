//! Conversions between [`SystemTime`], unix milliseconds and RFC 3339 strings.
//!
//! Backup timestamps travel as unix milliseconds; filesystem timestamps arrive as
//! [`SystemTime`]. Anything before the epoch clamps to zero.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

pub fn system_time_to_millis(time: SystemTime) -> u64 {
	time.duration_since(UNIX_EPOCH)
		.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
		.unwrap_or_default()
}

pub fn millis_to_system_time(millis: u64) -> SystemTime {
	UNIX_EPOCH + Duration::from_millis(millis)
}

pub fn to_datetime(time: SystemTime) -> DateTime<Utc> {
	DateTime::<Utc>::from(time)
}

/// Parses either an RFC 3339 timestamp or a plain integer of unix milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<SystemTime> {
	let raw = raw.trim();

	if let Ok(millis) = raw.parse::<u64>() {
		return Some(millis_to_system_time(millis));
	}

	DateTime::parse_from_rfc3339(raw)
		.ok()
		.map(|dt| SystemTime::from(dt.with_timezone(&Utc)))
}
