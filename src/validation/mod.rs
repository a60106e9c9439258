//! Startup checks for dirmirror
//!
//! Everything here runs before the first copy: option ranges in [`config`]
//! and path relationships between watch pairs in [`path`]. Failures surface
//! as [`crate::MirrorError::InvalidConfig`] or as a per-pair configuration
//! error.

use std::error::Error;
use std::fmt;

pub mod config;
pub mod path;

pub use config::*;
pub use path::*;

/// A rejected option or path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	/// An option is out of range or unknown
	ConfigError(String),
	/// A path is unusable where it appears
	PathError(String),
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValidationError::ConfigError(msg) => write!(f, "Config validation error: {}", msg),
			ValidationError::PathError(msg) => write!(f, "Path validation error: {}", msg),
		}
	}
}

impl Error for ValidationError {}

/// Types that can check themselves before a run starts
pub trait Validator {
	fn validate(&self) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_kinds_are_labelled() {
		assert!(ValidationError::ConfigError("capacity".into())
			.to_string()
			.starts_with("Config validation error"));
		assert!(ValidationError::PathError("dst".into())
			.to_string()
			.starts_with("Path validation error"));
	}
}

// vim: ts=4
