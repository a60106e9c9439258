//! Path mapping from a watched source tree into its destination tree

use std::path::{Path, PathBuf};

use crate::error::MirrorError;
use crate::validation;

/// Resolve the destination path for `path`, which must be `source_root` or a
/// descendant of it.
///
/// The relative part below `source_root` is appended to `destination_root`.
/// Paths outside the source root, or whose relative part would climb out
/// with `..`, fail with [`MirrorError::PathResolution`].
pub fn map(
	source_root: &Path,
	destination_root: &Path,
	path: &Path,
) -> Result<PathBuf, MirrorError> {
	let relative = relative_path(source_root, path)?;
	if relative.as_os_str().is_empty() {
		return Ok(destination_root.to_path_buf());
	}
	Ok(destination_root.join(relative))
}

/// Path of `path` relative to `source_root`
pub fn relative_path<'a>(source_root: &Path, path: &'a Path) -> Result<&'a Path, MirrorError> {
	let outside =
		|| MirrorError::PathResolution { path: path.to_path_buf(), root: source_root.to_path_buf() };

	let relative = path.strip_prefix(source_root).map_err(|_| outside())?;
	validation::validate_path_safe(relative).map_err(|_| outside())?;
	Ok(relative)
}
