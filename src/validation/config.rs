//! Configuration validation functions

use super::ValidationError;

/// Upper bound for the per-pair event queue
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

/// Validate the capacity of the per-pair event channel
///
/// A zero capacity would make the bounded channel constructor panic, and
/// absurdly large values defeat backpressure.
pub fn validate_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
	if capacity == 0 {
		return Err(ValidationError::ConfigError(
			"channel capacity must be greater than 0".to_string(),
		));
	}
	if capacity > MAX_CHANNEL_CAPACITY {
		return Err(ValidationError::ConfigError(format!(
			"channel capacity too large: {} (max {})",
			capacity, MAX_CHANNEL_CAPACITY
		)));
	}
	Ok(())
}

/// Validate the polling interval in milliseconds
pub fn validate_poll_interval_ms(interval_ms: u64) -> Result<(), ValidationError> {
	if interval_ms < 10 {
		return Err(ValidationError::ConfigError(format!(
			"poll interval must be at least 10ms, got {}",
			interval_ms
		)));
	}
	if interval_ms > 3_600_000 {
		return Err(ValidationError::ConfigError(format!(
			"poll interval too large: {}ms (max one hour)",
			interval_ms
		)));
	}
	Ok(())
}

/// Validate a tracing level name
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
	match level.to_ascii_lowercase().as_str() {
		"trace" | "debug" | "info" | "warn" | "error" => Ok(()),
		other => Err(ValidationError::ConfigError(format!("unknown log level '{}'", other))),
	}
}
