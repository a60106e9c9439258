//! Watch pair: one configured source → destination mapping

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::MirrorError;
use crate::validation;

/// A configured (source_root, destination_root) mapping kept in sync one-way.
///
/// Both roots are absolute. Pairs are created once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchPair {
	source_root: PathBuf,
	destination_root: PathBuf,
}

/// Outcome of preparing a pair's roots on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationState {
	Existing,
	Created,
}

impl WatchPair {
	/// Build a pair from raw configured strings.
	///
	/// Surrounding whitespace and trailing commas are stripped (pairs are
	/// often pasted from comma-separated lists), and relative paths are
	/// resolved against `base`.
	pub fn from_raw(source: &str, destination: &str, base: &Path) -> Result<Self, MirrorError> {
		let source_root = clean_path(source, base)
			.ok_or_else(|| MirrorError::configuration(Path::new(source), "empty source path"))?;
		let destination_root = clean_path(destination, base).ok_or_else(|| {
			MirrorError::configuration(Path::new(destination), "empty destination path")
		})?;
		Ok(WatchPair { source_root, destination_root })
	}

	/// Build a pair from paths that are already absolute
	pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
		WatchPair { source_root: source_root.into(), destination_root: destination_root.into() }
	}

	pub fn source_root(&self) -> &Path {
		&self.source_root
	}

	pub fn destination_root(&self) -> &Path {
		&self.destination_root
	}

	/// Validate the source root and return its canonical path.
	///
	/// The source must be an existing directory and the destination must not
	/// live inside it. Nothing is created on disk. Canonical roots matter
	/// because the OS reports notification paths in canonical form.
	pub fn check_source(&self) -> Result<PathBuf, MirrorError> {
		let meta = match fs::metadata(&self.source_root) {
			Ok(meta) => meta,
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				return Err(MirrorError::configuration(
					&self.source_root,
					"source directory does not exist",
				));
			}
			Err(e) => return Err(MirrorError::configuration(&self.source_root, e.to_string())),
		};
		if !meta.is_dir() {
			return Err(MirrorError::configuration(&self.source_root, "source is not a directory"));
		}

		let source_root = fs::canonicalize(&self.source_root)
			.map_err(|e| MirrorError::configuration(&self.source_root, e.to_string()))?;

		for src in [&self.source_root, &source_root] {
			validation::validate_destination_outside_source(&self.destination_root, src)
				.map_err(|e| MirrorError::configuration(&self.destination_root, e.to_string()))?;
		}
		Ok(source_root)
	}

	/// Create the destination root when missing and pair it with the
	/// canonical `source_root` returned by [`WatchPair::check_source`]
	pub fn create_destination(
		&self,
		source_root: PathBuf,
	) -> Result<(WatchPair, DestinationState), MirrorError> {
		let state = if self.destination_root.is_dir() {
			DestinationState::Existing
		} else {
			fs::create_dir_all(&self.destination_root)
				.map_err(|e| MirrorError::copy_io(&self.destination_root, e))?;
			DestinationState::Created
		};

		let destination_root = fs::canonicalize(&self.destination_root)
			.map_err(|e| MirrorError::copy_io(&self.destination_root, e))?;
		validation::validate_destination_outside_source(&destination_root, &source_root)
			.map_err(|e| MirrorError::configuration(&destination_root, e.to_string()))?;

		Ok((WatchPair { source_root, destination_root }, state))
	}
}

impl fmt::Display for WatchPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "'{}' -> '{}'", self.source_root.display(), self.destination_root.display())
	}
}

fn clean_path(raw: &str, base: &Path) -> Option<PathBuf> {
	let trimmed = raw.trim().trim_end_matches(',').trim();
	if trimmed.is_empty() {
		return None;
	}
	let path = Path::new(trimmed);
	if path.is_absolute() {
		Some(path.to_path_buf())
	} else {
		Some(base.join(path))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_from_raw_strips_commas_and_whitespace() {
		let pair = WatchPair::from_raw("  /a/src, ", "/a/dst,", Path::new("/cwd")).unwrap();
		assert_eq!(pair.source_root(), Path::new("/a/src"));
		assert_eq!(pair.destination_root(), Path::new("/a/dst"));
	}

	#[test]
	fn test_from_raw_resolves_relative() {
		let pair = WatchPair::from_raw("src", "out/dst", Path::new("/cwd")).unwrap();
		assert_eq!(pair.source_root(), Path::new("/cwd/src"));
		assert_eq!(pair.destination_root(), Path::new("/cwd/out/dst"));
	}

	#[test]
	fn test_from_raw_rejects_empty() {
		assert!(WatchPair::from_raw(" , ", "/dst", Path::new("/")).is_err());
		assert!(WatchPair::from_raw("/src", "", Path::new("/")).is_err());
	}

	#[test]
	fn test_missing_source() {
		let tmp = TempDir::new().unwrap();
		let pair = WatchPair::new(tmp.path().join("nope"), tmp.path().join("dst"));
		let err = pair.check_source().unwrap_err();
		assert!(matches!(err, MirrorError::Configuration { .. }));
		assert!(err.to_string().contains("does not exist"));
		assert!(!tmp.path().join("dst").exists());
	}

	#[test]
	fn test_source_is_file() {
		let tmp = TempDir::new().unwrap();
		fs::write(tmp.path().join("file"), "x").unwrap();
		let pair = WatchPair::new(tmp.path().join("file"), tmp.path().join("dst"));
		assert!(pair.check_source().unwrap_err().to_string().contains("not a directory"));
	}

	#[test]
	fn test_create_destination() {
		let tmp = TempDir::new().unwrap();
		fs::create_dir(tmp.path().join("src")).unwrap();
		let pair = WatchPair::new(tmp.path().join("src"), tmp.path().join("out/dst"));

		let (ready, state) = pair.create_destination(pair.check_source().unwrap()).unwrap();
		assert_eq!(state, DestinationState::Created);
		assert!(ready.destination_root().is_dir());

		let (_, state) = pair.create_destination(pair.check_source().unwrap()).unwrap();
		assert_eq!(state, DestinationState::Existing);
	}

	#[test]
	fn test_destination_inside_source() {
		let tmp = TempDir::new().unwrap();
		fs::create_dir(tmp.path().join("src")).unwrap();
		let pair = WatchPair::new(tmp.path().join("src"), tmp.path().join("src/mirror"));
		assert!(matches!(pair.check_source(), Err(MirrorError::Configuration { .. })));
		assert!(!tmp.path().join("src/mirror").exists());
	}

	#[test]
	fn test_check_source_creates_nothing() {
		let tmp = TempDir::new().unwrap();
		fs::create_dir(tmp.path().join("src")).unwrap();
		let pair = WatchPair::new(tmp.path().join("src/../src"), tmp.path().join("dst"));

		let source_root = pair.check_source().unwrap();
		assert_eq!(source_root, fs::canonicalize(tmp.path().join("src")).unwrap());
		assert!(!tmp.path().join("dst").exists());
	}
}

// vim: ts=4
