//! Exclusion of source entries from mirroring
//!
//! Patterns are matched against the path relative to the source root, so
//! `*.swp` or `.git/**` behave the same for every watch pair.

mod patterns;

pub use patterns::PatternMatcher;

use std::path::Path;

/// Combined exclusion filter applied by the copier and the dispatcher
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
	pattern_matcher: Option<PatternMatcher>,
}

impl ExclusionFilter {
	/// Build a filter from exclude patterns and include patterns that override them
	pub fn new(exclude: &[String], include: &[String]) -> Result<Self, ExclusionError> {
		if exclude.is_empty() {
			return Ok(Self::none());
		}
		Ok(Self { pattern_matcher: Some(PatternMatcher::new(exclude, include)?) })
	}

	/// A filter that excludes nothing
	pub fn none() -> Self {
		Self { pattern_matcher: None }
	}

	/// Check if a path relative to the source root should be skipped
	pub fn should_exclude(&self, relative: &Path) -> bool {
		if relative.as_os_str().is_empty() {
			return false;
		}
		match self.pattern_matcher {
			Some(ref matcher) => matcher.is_excluded(relative),
			None => false,
		}
	}
}

impl Default for ExclusionFilter {
	fn default() -> Self {
		Self::none()
	}
}

/// Errors that can occur during exclusion processing
#[derive(Debug)]
pub enum ExclusionError {
	/// Failed to parse a glob pattern
	InvalidPattern(String),
}

impl std::fmt::Display for ExclusionError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ExclusionError::InvalidPattern(msg) => {
				write!(f, "Invalid exclusion pattern: {}", msg)
			}
		}
	}
}

impl std::error::Error for ExclusionError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_exclusion_filter_basic() {
		let filter = ExclusionFilter::new(&["*.log".to_string(), "*.tmp".to_string()], &[]).unwrap();

		assert!(filter.should_exclude(Path::new("test.log")));
		assert!(filter.should_exclude(Path::new("sub/test.tmp")));
		assert!(!filter.should_exclude(Path::new("test.txt")));
	}

	#[test]
	fn test_root_is_never_excluded() {
		let filter = ExclusionFilter::new(&["*".to_string()], &[]).unwrap();
		assert!(!filter.should_exclude(Path::new("")));
	}

	#[test]
	fn test_default_excludes_nothing() {
		let filter = ExclusionFilter::default();
		assert!(!filter.should_exclude(Path::new("anything/at/all")));
	}
}
