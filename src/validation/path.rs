//! Path validation functions

use std::path::{Component, Path};

use super::ValidationError;

/// Check if a path is safe (no parent directory references)
///
/// Relative paths produced from event paths must never walk out of the
/// destination root with ".." references.
pub fn is_path_safe(path: &Path) -> bool {
	!path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Validate a path is safe
pub fn validate_path_safe(path: &Path) -> Result<(), ValidationError> {
	if !is_path_safe(path) {
		return Err(ValidationError::PathError(
			"Path contains parent directory reference (..)".to_string(),
		));
	}
	Ok(())
}

/// Check if path is within (or equal to) a root directory
pub fn is_path_within_root(path: &Path, root: &Path) -> bool {
	path.starts_with(root)
}

/// Validate that a destination does not live inside its own source tree
///
/// Mirroring into a subdirectory of the source would feed every copy back
/// in as a new event.
pub fn validate_destination_outside_source(
	destination: &Path,
	source: &Path,
) -> Result<(), ValidationError> {
	if is_path_within_root(destination, source) {
		return Err(ValidationError::PathError(format!(
			"Destination {:?} is inside source {:?}",
			destination, source
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_is_path_safe_normal() {
		assert!(is_path_safe(Path::new("file.txt")));
		assert!(is_path_safe(Path::new("dir/file.txt")));
		assert!(is_path_safe(Path::new("")));
	}

	#[test]
	fn test_is_path_safe_with_parent() {
		assert!(!is_path_safe(Path::new("../file.txt")));
		assert!(!is_path_safe(Path::new("dir/../file.txt")));
	}

	#[test]
	fn test_validate_path_safe_err() {
		let result = validate_path_safe(Path::new("../etc/passwd"));
		assert!(result.unwrap_err().to_string().contains("parent directory"));
	}

	#[test]
	fn test_is_path_within_root() {
		let root = Path::new("/home/user/sync");
		assert!(is_path_within_root(Path::new("/home/user/sync"), root));
		assert!(is_path_within_root(Path::new("/home/user/sync/dir/file.txt"), root));
		assert!(!is_path_within_root(Path::new("/home/user/sync2/file.txt"), root));
		assert!(!is_path_within_root(Path::new("/etc/passwd"), root));
	}

	#[test]
	fn test_destination_outside_source() {
		let src = Path::new("/data/src");
		assert!(validate_destination_outside_source(Path::new("/data/dst"), src).is_ok());
		// Parent of the source is allowed
		assert!(validate_destination_outside_source(Path::new("/data"), src).is_ok());
		assert!(validate_destination_outside_source(Path::new("/data/src/mirror"), src).is_err());
		assert!(validate_destination_outside_source(Path::new("/data/src"), src).is_err());
	}
}
