//! Logging prelude and subscriber setup.
//!
//! Modules pull the tracing macros in through this prelude:
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("Copied '{}' to '{}'", src.display(), dst.display());
//! warn!("File '{}' vanished before it could be copied", path.display());
//! ```
//!
//! Every record goes to two sinks: the console (stderr) and the append-only
//! log file, one line per record: `2026-10-16 12:00:00  INFO <message>`.

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::MirrorError;

pub use tracing::{debug, error, info, trace, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where and how verbosely to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
	pub file: PathBuf,
	pub level: String,
}

/// Keeps the file writer alive. Records still buffered are flushed when
/// this is dropped, so hold it until the process is about to exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
	_file: WorkerGuard,
}

/// Install the global subscriber.
///
/// The level comes from `RUST_LOG` when set, otherwise from the settings:
///
/// ```bash
/// RUST_LOG=debug dirmirror ./in ./out
/// RUST_LOG=dirmirror::dispatcher=trace dirmirror -c mirror.toml
/// ```
pub fn init(settings: &LogSettings) -> Result<LogGuard, MirrorError> {
	let dir = match settings.file.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => PathBuf::from("."),
	};
	let file_name = settings.file.file_name().ok_or_else(|| MirrorError::InvalidConfig {
		message: format!("log file '{}' has no file name", settings.file.display()),
	})?;

	fs::create_dir_all(&dir).map_err(|e| MirrorError::InvalidConfig {
		message: format!("cannot create log directory '{}': {}", dir.display(), e),
	})?;

	// `never` opens the file in append mode and never rotates
	let appender = tracing_appender::rolling::never(&dir, file_name);
	let (file_writer, guard) = tracing_appender::non_blocking(appender);

	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
				.with_target(false)
				.with_writer(std::io::stderr),
		)
		.with(
			fmt::layer()
				.with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
				.with_target(false)
				.with_ansi(false)
				.with_writer(file_writer),
		)
		.try_init()
		.map_err(|e| MirrorError::InvalidConfig { message: format!("cannot install logger: {}", e) })?;

	Ok(LogGuard { _file: guard })
}

// vim: ts=4
