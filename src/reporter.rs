//! Reporting handle for mirror outcomes
//!
//! Every component receives a [`MirrorReporter`] when it is constructed and
//! turns each copy, directory creation, skip and error into a call on it.
//! The binary wires in [`TracingReporter`], which writes the records through
//! the tracing subscriber installed by [`crate::logging::init`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::MirrorError;
use crate::event::{FsEvent, FsEventKind};
use crate::logging::*;

/// Why an entry was not copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
	/// The entry disappeared between notification and copy
	Vanished,
	/// The entry was deleted or moved away (deletions are not propagated)
	Deleted,
	/// The entry matches an exclusion pattern
	Excluded,
	/// Symlinked directories are not followed
	SymlinkedDirectory,
	/// Symlink whose target does not exist
	DanglingSymlink,
	/// Neither a regular file nor a directory (socket, fifo, device)
	SpecialFile,
	/// Notification kind that does not change content
	Unsupported(String),
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SkipReason::Vanished => write!(f, "no longer exists"),
			SkipReason::Deleted => write!(f, "deleted at source, not propagated"),
			SkipReason::Excluded => write!(f, "excluded by pattern"),
			SkipReason::SymlinkedDirectory => write!(f, "symlinked directory not followed"),
			SkipReason::DanglingSymlink => write!(f, "symlink target does not exist"),
			SkipReason::SpecialFile => write!(f, "not a regular file or directory"),
			SkipReason::Unsupported(kind) => write!(f, "unsupported notification ({})", kind),
		}
	}
}

/// Receiver of mirror outcomes
pub trait MirrorReporter: Send + Sync {
	/// Called when a notification has been classified, before it is handled
	fn on_detected(&self, _event: &FsEvent) {}

	/// Called after a file has been copied
	fn on_copy(&self, _src: &Path, _dst: &Path) {}

	/// Called after a destination directory has been created
	fn on_dir_create(&self, _dst: &Path) {}

	/// Called when an entry is deliberately not copied
	fn on_skip(&self, _path: &Path, _reason: &SkipReason) {}

	/// Called on non-fatal errors; the caller keeps going afterwards
	fn on_error(&self, _error: &MirrorError) {}

	/// Called when the notifier lost track of changes below `root` and the
	/// whole pair is mirrored again
	fn on_rescan(&self, _root: &Path) {}
}

/// Shared reporter handle
pub type SharedReporter = Arc<dyn MirrorReporter>;

/// Reporter that writes every outcome as a tracing record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
	pub fn shared() -> SharedReporter {
		Arc::new(TracingReporter)
	}
}

impl MirrorReporter for TracingReporter {
	fn on_detected(&self, event: &FsEvent) {
		match event.kind {
			FsEventKind::Other(_) => debug!("{}", event),
			_ => info!("{}", event),
		}
	}

	fn on_copy(&self, src: &Path, dst: &Path) {
		info!("Copied '{}' to '{}'", src.display(), dst.display());
	}

	fn on_dir_create(&self, dst: &Path) {
		info!("Created directory '{}'", dst.display());
	}

	fn on_skip(&self, path: &Path, reason: &SkipReason) {
		match reason {
			SkipReason::Vanished => warn!("Skipped '{}': {}", path.display(), reason),
			SkipReason::Deleted => info!("Skipped '{}': {}", path.display(), reason),
			_ => debug!("Skipped '{}': {}", path.display(), reason),
		}
	}

	fn on_error(&self, error: &MirrorError) {
		error!("{}", error);
	}

	fn on_rescan(&self, root: &Path) {
		warn!("Events for '{}' may have been lost, copying the whole directory again", root.display());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_skip_reason_display() {
		assert_eq!(SkipReason::Vanished.to_string(), "no longer exists");
		assert!(SkipReason::Unsupported("access".to_string()).to_string().contains("access"));
	}

	#[test]
	fn test_default_methods_are_noops() {
		struct Silent;
		impl MirrorReporter for Silent {}

		let reporter: SharedReporter = Arc::new(Silent);
		reporter.on_copy(Path::new("/a"), Path::new("/b"));
		reporter.on_error(&MirrorError::NoActivePairs);
		reporter.on_rescan(Path::new("/a"));
	}
}
