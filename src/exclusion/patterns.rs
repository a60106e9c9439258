//! Glob pattern matching for exclusions

use super::ExclusionError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Pattern matcher using globset for efficient matching
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	/// Compiled exclusion patterns
	exclude_set: GlobSet,

	/// Compiled inclusion patterns (higher priority)
	include_set: Option<GlobSet>,
}

impl PatternMatcher {
	/// Create a new pattern matcher
	pub fn new(
		exclude_patterns: &[String],
		include_patterns: &[String],
	) -> Result<Self, ExclusionError> {
		let exclude_set = Self::build_glob_set(exclude_patterns)?;

		let include_set = if !include_patterns.is_empty() {
			Some(Self::build_glob_set(include_patterns)?)
		} else {
			None
		};

		Ok(Self { exclude_set, include_set })
	}

	/// Build a GlobSet from patterns
	fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ExclusionError> {
		let mut builder = GlobSetBuilder::new();

		for pattern in patterns {
			let glob = Glob::new(pattern)
				.map_err(|e| ExclusionError::InvalidPattern(format!("{}: {}", pattern, e)))?;
			builder.add(glob);
		}

		builder.build().map_err(|e| {
			ExclusionError::InvalidPattern(format!("Failed to build pattern set: {}", e))
		})
	}

	/// Check if a relative path is excluded
	pub fn is_excluded(&self, path: &Path) -> bool {
		// If path matches an include pattern, it's NOT excluded
		if let Some(ref include_set) = self.include_set {
			if include_set.is_match(path) {
				return false;
			}
		}

		self.exclude_set.is_match(path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matcher(exclude: &[&str], include: &[&str]) -> PatternMatcher {
		let owned = |list: &[&str]| list.iter().map(|p| p.to_string()).collect::<Vec<_>>();
		PatternMatcher::new(&owned(exclude), &owned(include)).unwrap()
	}

	#[test]
	fn test_editor_droppings() {
		let m = matcher(&["*.swp", "*~", ".#*"], &[]);
		assert!(m.is_excluded(Path::new("notes.txt.swp")));
		assert!(m.is_excluded(Path::new("mail/draft~")));
		assert!(m.is_excluded(Path::new(".#lock")));
		assert!(!m.is_excluded(Path::new("mail/draft")));
	}

	#[test]
	fn test_subtree_pattern() {
		let m = matcher(&[".git", ".git/**"], &[]);
		assert!(m.is_excluded(Path::new(".git")));
		assert!(m.is_excluded(Path::new(".git/objects/ab/cdef")));
		assert!(!m.is_excluded(Path::new("src/.gitignore")));
	}

	#[test]
	fn test_include_wins() {
		let m = matcher(&["*.log"], &["audit.log"]);
		assert!(m.is_excluded(Path::new("debug.log")));
		assert!(!m.is_excluded(Path::new("audit.log")));
	}

	#[test]
	fn test_invalid_pattern() {
		let result = PatternMatcher::new(&["a[".to_string()], &[]);
		assert!(matches!(result, Err(ExclusionError::InvalidPattern(_))));
	}
}

// vim: ts=4
