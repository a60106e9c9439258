//! Configuration for dirmirror
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (TOML, `--config` or ./dirmirror.toml)
//! 3. CLI flags (highest priority)
//!
//! Watch pairs given on the command line replace the pairs of the file.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::copier::CopyOptions;
use crate::dispatcher::DispatcherConfig;
use crate::error::MirrorError;
use crate::exclusion::ExclusionFilter;
use crate::logging::LogSettings;
use crate::pair::WatchPair;
use crate::validation::{self, ValidationError, Validator};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "dirmirror.toml";

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "directory_watcher.log";

/// Unified configuration for a mirroring run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
	// ========================================================================
	// NOTIFICATIONS
	// ========================================================================
	/// Notification backend
	pub watcher: WatcherBackend,

	/// Polling cadence for the poll backend (milliseconds)
	pub poll_interval_ms: u64,

	/// Capacity of each pair's event queue
	pub channel_capacity: usize,

	// ========================================================================
	// COPY BEHAVIOUR
	// ========================================================================
	/// Preserve access and modification times
	pub preserve_timestamps: bool,

	/// Glob patterns (relative to the source root) never mirrored
	pub exclude: Vec<String>,

	/// Glob patterns that override exclusions
	pub include: Vec<String>,

	// ========================================================================
	// OUTPUT & LOGGING
	// ========================================================================
	/// Path to the log file
	pub log_file: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	pub log_level: String,

	// ========================================================================
	// WATCH PAIRS
	// ========================================================================
	/// Ordered source → destination mappings (kept last: TOML tables follow values)
	pub pairs: Vec<PairConfig>,
}

/// One configured watch pair, as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
	pub source: String,
	pub destination: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			watcher: WatcherBackend::Native,
			poll_interval_ms: 2000,
			channel_capacity: 1024,

			preserve_timestamps: true,
			exclude: vec![],
			include: vec![],

			log_file: PathBuf::from(DEFAULT_LOG_FILE),
			log_level: "info".to_string(),

			pairs: vec![],
		}
	}
}

/// Notification backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WatcherBackend {
	/// Platform facility (inotify, FSEvents, ReadDirectoryChangesW)
	#[default]
	Native,
	/// Periodic rescans, for mounts that do not deliver native events
	Poll,
}

/// Overrides collected from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	/// Positional arguments: SOURCE DESTINATION [SOURCE DESTINATION]...
	pub pair_args: Vec<String>,
	pub log_file: Option<PathBuf>,
	pub log_level: Option<String>,
	pub poll: bool,
	pub poll_interval_ms: Option<u64>,
	pub exclude: Vec<String>,
	pub no_preserve_times: bool,
}

impl Config {
	/// Parse a TOML config document
	pub fn from_toml_str(text: &str) -> Result<Self, MirrorError> {
		toml::from_str(text).map_err(|e| MirrorError::InvalidConfig { message: e.to_string() })
	}

	/// Load a TOML config file
	pub fn load(path: &Path) -> Result<Self, MirrorError> {
		let text = fs::read_to_string(path).map_err(|e| MirrorError::InvalidConfig {
			message: format!("cannot read {}: {}", path.display(), e),
		})?;
		Self::from_toml_str(&text).map_err(|e| MirrorError::InvalidConfig {
			message: format!("{}: {}", path.display(), e),
		})
	}

	/// Resolve the full configuration: defaults, then `config_path` (or the
	/// default file in the working directory when it exists), then CLI
	/// overrides.
	pub fn resolve(config_path: Option<&Path>, cli: CliOverrides) -> Result<Self, MirrorError> {
		Self::resolve_in(&env::current_dir()?, config_path, cli)
	}

	/// Like [`Config::resolve`], looking for the default file in `base`
	pub fn resolve_in(
		base: &Path,
		config_path: Option<&Path>,
		cli: CliOverrides,
	) -> Result<Self, MirrorError> {
		let default_file = base.join(DEFAULT_CONFIG_FILE);
		let mut config = match config_path {
			Some(path) => Self::load(path)?,
			None if default_file.is_file() => Self::load(&default_file)?,
			None => Config::default(),
		};
		config.apply(cli)?;
		config.validate()?;
		Ok(config)
	}

	/// Apply command-line overrides
	pub fn apply(&mut self, cli: CliOverrides) -> Result<(), MirrorError> {
		if !cli.pair_args.is_empty() {
			self.pairs = pairs_from_args(&cli.pair_args)?;
		}
		if let Some(log_file) = cli.log_file {
			self.log_file = log_file;
		}
		if let Some(level) = cli.log_level {
			self.log_level = level;
		}
		if cli.poll {
			self.watcher = WatcherBackend::Poll;
		}
		if let Some(ms) = cli.poll_interval_ms {
			self.poll_interval_ms = ms;
		}
		self.exclude.extend(cli.exclude);
		if cli.no_preserve_times {
			self.preserve_timestamps = false;
		}
		Ok(())
	}

	/// Watch pairs with absolute roots, resolved against `base`
	pub fn watch_pairs(&self, base: &Path) -> Result<Vec<WatchPair>, MirrorError> {
		self.pairs.iter().map(|p| WatchPair::from_raw(&p.source, &p.destination, base)).collect()
	}

	pub fn exclusions(&self) -> Result<ExclusionFilter, MirrorError> {
		ExclusionFilter::new(&self.exclude, &self.include)
			.map_err(|e| MirrorError::InvalidConfig { message: e.to_string() })
	}

	pub fn copy_options(&self) -> CopyOptions {
		CopyOptions { preserve_timestamps: self.preserve_timestamps }
	}

	pub fn dispatcher_config(&self) -> DispatcherConfig {
		DispatcherConfig {
			backend: self.watcher,
			poll_interval: Duration::from_millis(self.poll_interval_ms),
			channel_capacity: self.channel_capacity,
			copy: self.copy_options(),
		}
	}

	pub fn log_settings(&self) -> LogSettings {
		LogSettings { file: self.log_file.clone(), level: self.log_level.clone() }
	}
}

impl Validator for Config {
	fn validate(&self) -> Result<(), ValidationError> {
		if self.pairs.is_empty() {
			return Err(ValidationError::ConfigError("no watch pairs configured".to_string()));
		}
		validation::validate_channel_capacity(self.channel_capacity)?;
		validation::validate_poll_interval_ms(self.poll_interval_ms)?;
		validation::validate_log_level(&self.log_level)?;
		for pair in &self.pairs {
			pair.validate()?;
		}
		Ok(())
	}
}

impl Validator for PairConfig {
	fn validate(&self) -> Result<(), ValidationError> {
		let blank = |s: &str| s.trim().trim_end_matches(',').trim().is_empty();
		if blank(&self.source) || blank(&self.destination) {
			return Err(ValidationError::PathError(format!(
				"empty path in pair '{}' -> '{}'",
				self.source, self.destination
			)));
		}
		if self.source.trim() == self.destination.trim() {
			return Err(ValidationError::PathError(format!(
				"source and destination are the same: '{}'",
				self.source
			)));
		}
		Ok(())
	}
}

/// Group positional arguments into pairs: SOURCE DESTINATION [SOURCE DESTINATION]...
pub fn pairs_from_args(args: &[String]) -> Result<Vec<PairConfig>, MirrorError> {
	if args.len() % 2 != 0 {
		return Err(MirrorError::InvalidConfig {
			message: format!(
				"expected SOURCE DESTINATION pairs, got {} argument(s)",
				args.len()
			),
		});
	}
	Ok(args
		.chunks(2)
		.map(|chunk| PairConfig { source: chunk[0].clone(), destination: chunk[1].clone() })
		.collect())
}


// vim: ts=4
