//! Error types for mirroring operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::validation::ValidationError;

/// Main error type for mirroring operations
#[derive(Debug)]
pub enum MirrorError {
	/// A watch pair cannot be used (missing source, bad destination, duplicate)
	Configuration { path: PathBuf, message: String },

	/// An event path is not below the watched source root
	PathResolution { path: PathBuf, root: PathBuf },

	/// Copying or creating an entry failed
	CopyIo { path: PathBuf, source: io::Error },

	/// Registering a filesystem subscription failed
	Subscription { root: PathBuf, message: String },

	/// Not a single watch pair could be started
	NoActivePairs,

	/// Invalid global configuration (bad file, bad option values)
	InvalidConfig { message: String },

	/// I/O error
	Io(io::Error),
}

impl MirrorError {
	pub fn configuration(path: &Path, message: impl Into<String>) -> Self {
		MirrorError::Configuration { path: path.to_path_buf(), message: message.into() }
	}

	pub fn copy_io(path: &Path, source: io::Error) -> Self {
		MirrorError::CopyIo { path: path.to_path_buf(), source }
	}

	pub fn subscription(root: &Path, message: impl fmt::Display) -> Self {
		MirrorError::Subscription { root: root.to_path_buf(), message: message.to_string() }
	}
}

impl fmt::Display for MirrorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MirrorError::Configuration { path, message } => {
				write!(f, "Invalid watch pair '{}': {}", path.display(), message)
			}
			MirrorError::PathResolution { path, root } => {
				write!(f, "Path '{}' is outside source root '{}'", path.display(), root.display())
			}
			MirrorError::CopyIo { path, source } => {
				write!(f, "I/O error on '{}': {}", path.display(), source)
			}
			MirrorError::Subscription { root, message } => {
				write!(f, "Cannot watch '{}': {}", root.display(), message)
			}
			MirrorError::NoActivePairs => write!(f, "No watch pair could be started"),
			MirrorError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			MirrorError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for MirrorError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			MirrorError::CopyIo { source, .. } | MirrorError::Io(source) => Some(source),
			_ => None,
		}
	}
}

impl From<io::Error> for MirrorError {
	fn from(e: io::Error) -> Self {
		MirrorError::Io(e)
	}
}

impl From<ValidationError> for MirrorError {
	fn from(e: ValidationError) -> Self {
		MirrorError::InvalidConfig { message: e.to_string() }
	}
}


// vim: ts=4
