//! Top-level run: initial sync, live dispatch, shutdown
//!
//! ```rust,ignore
//! use dirmirror::{Config, Mirror, TracingReporter};
//!
//! let summary = Mirror::new(config, TracingReporter::shared())?.run().await?;
//! ```

use std::env;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::dispatcher::{Dispatcher, EventStats, RunningDispatcher};
use crate::error::MirrorError;
use crate::exclusion::ExclusionFilter;
use crate::initial_sync::{InitialSync, SyncReport};
use crate::logging::*;
use crate::pair::WatchPair;
use crate::reporter::SharedReporter;
use crate::shutdown;

/// Counters for a whole run
#[derive(Debug, Default)]
pub struct MirrorSummary {
	pub initial: SyncReport,
	pub live: EventStats,
}

/// A configured mirror, ready to run
pub struct Mirror {
	config: Config,
	pairs: Vec<WatchPair>,
	exclusions: Arc<ExclusionFilter>,
	reporter: SharedReporter,
}

impl Mirror {
	/// Build a mirror, resolving relative pair paths against the working
	/// directory
	pub fn new(config: Config, reporter: SharedReporter) -> Result<Self, MirrorError> {
		let base = env::current_dir()?;
		Self::with_base_dir(config, reporter, base)
	}

	/// Build a mirror, resolving relative pair paths against `base`
	pub fn with_base_dir(
		config: Config,
		reporter: SharedReporter,
		base: impl Into<PathBuf>,
	) -> Result<Self, MirrorError> {
		let pairs = config.watch_pairs(&base.into())?;
		let exclusions = Arc::new(config.exclusions()?);
		Ok(Mirror { config, pairs, exclusions, reporter })
	}

	/// Configured pairs, as resolved (not yet canonical)
	pub fn pairs(&self) -> &[WatchPair] {
		&self.pairs
	}

	/// Run the initial sync and subscribe every pair that survived it
	pub async fn start(&self) -> Result<(SyncReport, RunningDispatcher), MirrorError> {
		let runner = InitialSync::new(
			self.reporter.clone(),
			self.exclusions.clone(),
			self.config.copy_options(),
		);
		let pairs = self.pairs.clone();
		let report = tokio::task::spawn_blocking(move || runner.run(&pairs))
			.await
			.map_err(|e| MirrorError::Io(io::Error::new(io::ErrorKind::Other, e)))?;

		if report.ready.is_empty() {
			return Err(MirrorError::NoActivePairs);
		}

		let dispatcher = Dispatcher::new(
			self.reporter.clone(),
			self.exclusions.clone(),
			self.config.dispatcher_config(),
		);
		let running = dispatcher.start(report.ready.clone()).await?;
		Ok((report, running))
	}

	/// Mirror until `stop` completes, then drain and shut down
	pub async fn run_until<F>(&self, stop: F) -> Result<MirrorSummary, MirrorError>
	where
		F: Future<Output = ()>,
	{
		let (initial, running) = self.start().await?;
		info!(
			"Mirroring {} of {} pair(s), press Ctrl-C to stop",
			initial.ready.len(),
			self.pairs.len()
		);

		stop.await;

		let live = running.shutdown().await;
		info!(
			"Stopped after {} events: {} files copied, {} directories created, {} skipped, {} errors",
			live.events,
			live.copies.files_copied,
			live.copies.dirs_created,
			live.copies.skipped,
			live.copies.errors
		);
		Ok(MirrorSummary { initial, live })
	}

	/// Mirror until the process receives SIGINT or SIGTERM
	pub async fn run(&self) -> Result<MirrorSummary, MirrorError> {
		// Handlers must be in place before the ready line is logged
		let signal = shutdown::listen();
		self.run_until(signal.wait()).await
	}
}


// vim: ts=4
