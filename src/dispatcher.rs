//! Event dispatcher: live mirroring of every watch pair
//!
//! Each pair gets one subscription, one bounded channel and one worker task
//! draining that channel in order. Shutdown drops the subscriptions, signals
//! the workers, and lets each one close its channel and drain whatever was
//! already queued before it exits.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::WatcherBackend;
use crate::copier::{CopyExecutor, CopyOptions, CopyStats};
use crate::error::MirrorError;
use crate::event::{FsEvent, FsEventKind};
use crate::exclusion::ExclusionFilter;
use crate::logging::*;
use crate::mapper;
use crate::pair::WatchPair;
use crate::reporter::{SharedReporter, SkipReason};
use crate::watcher::{self, RawEvent, Subscription};

/// Lifecycle of the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
	/// Registering subscriptions
	Starting,
	/// Subscriptions live, workers dispatching events
	Watching,
	/// Subscriptions dropped and workers drained
	Stopped,
}

impl fmt::Display for DispatcherState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DispatcherState::Starting => write!(f, "starting"),
			DispatcherState::Watching => write!(f, "watching"),
			DispatcherState::Stopped => write!(f, "stopped"),
		}
	}
}

/// Dispatcher settings
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
	pub backend: WatcherBackend,
	pub poll_interval: Duration,
	pub channel_capacity: usize,
	pub copy: CopyOptions,
}

impl Default for DispatcherConfig {
	fn default() -> Self {
		DispatcherConfig {
			backend: WatcherBackend::Native,
			poll_interval: Duration::from_millis(2000),
			channel_capacity: 1024,
			copy: CopyOptions::default(),
		}
	}
}

/// Counters for one worker (or all of them, summed)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventStats {
	/// Classified events handled
	pub events: usize,
	pub copies: CopyStats,
}

impl std::ops::AddAssign for EventStats {
	fn add_assign(&mut self, other: EventStats) {
		self.events += other.events;
		self.copies += other.copies;
	}
}

/// Handles the events of a single watch pair
pub struct PairWorker {
	pair: WatchPair,
	executor: CopyExecutor,
	reporter: SharedReporter,
}

impl PairWorker {
	pub fn new(
		pair: WatchPair,
		reporter: SharedReporter,
		exclusions: Arc<ExclusionFilter>,
		options: CopyOptions,
	) -> Self {
		let executor = CopyExecutor::new(&pair, reporter.clone(), exclusions, options);
		PairWorker { pair, executor, reporter }
	}

	pub fn pair(&self) -> &WatchPair {
		&self.pair
	}

	/// Mirror the effect of one classified event. Never fails: every outcome
	/// is reported and counted.
	pub fn handle(&self, event: &FsEvent) -> CopyStats {
		self.reporter.on_detected(event);

		let mut stats = CopyStats::default();
		let path = event.path.as_path();

		match event.kind {
			FsEventKind::Other(ref kind) => {
				return self.skip(path, SkipReason::Unsupported(kind.clone()), stats);
			}
			FsEventKind::Removed => return self.skip(path, SkipReason::Deleted, stats),
			_ => {}
		}

		if self.executor.is_excluded(path) {
			return self.skip(path, SkipReason::Excluded, stats);
		}

		let dst = match mapper::map(self.pair.source_root(), self.pair.destination_root(), path) {
			Ok(dst) => dst,
			Err(e) => {
				self.reporter.on_error(&e);
				stats.errors += 1;
				return stats;
			}
		};

		let is_dir = match fs::symlink_metadata(path) {
			Ok(meta) => meta.is_dir(),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				let reason = match event.kind {
					FsEventKind::Moved { .. } => SkipReason::Deleted,
					_ => SkipReason::Vanished,
				};
				return self.skip(path, reason, stats);
			}
			Err(e) => {
				self.reporter.on_error(&MirrorError::copy_io(path, e));
				stats.errors += 1;
				return stats;
			}
		};

		match event.kind {
			// A directory change only guarantees the directory itself; its
			// entries report their own events
			FsEventKind::Modified if is_dir => self.executor.ensure_dir(&dst),
			// New or moved-in entries are mirrored with everything below them,
			// since a moved directory produces no events for its contents
			_ => self.executor.copy(path, &dst),
		}
	}

	/// Mirror the whole pair again. Used when a notification carries no
	/// path, which is how the notifier reports a lost or overflowed queue.
	pub fn rescan(&self) -> CopyStats {
		self.reporter.on_rescan(self.pair.source_root());
		self.executor.copy(self.pair.source_root(), self.pair.destination_root())
	}

	/// Drain `rx` until it is closed or `stop` fires, handling events in
	/// arrival order.
	pub async fn run(
		self: Arc<Self>,
		mut rx: mpsc::Receiver<RawEvent>,
		mut stop: watch::Receiver<bool>,
	) -> EventStats {
		let mut stats = EventStats::default();

		loop {
			tokio::select! {
				message = rx.recv() => match message {
					Some(raw) => stats += self.dispatch(raw).await,
					None => break,
				},
				_ = stop.changed() => {
					debug!("Draining queued events for '{}'", self.pair.source_root().display());
					rx.close();
					while let Some(raw) = rx.recv().await {
						stats += self.dispatch(raw).await;
					}
					break;
				}
			}
		}

		stats
	}

	async fn dispatch(self: &Arc<Self>, raw: RawEvent) -> EventStats {
		let event = match raw {
			Ok(event) => event,
			Err(e) => {
				self.reporter.on_error(&MirrorError::subscription(self.pair.source_root(), e));
				return EventStats { events: 1, copies: CopyStats { errors: 1, ..Default::default() } };
			}
		};

		let worker = Arc::clone(self);
		// Copies are blocking file I/O; awaiting each one keeps the pair FIFO
		let result = tokio::task::spawn_blocking(move || {
			if event.need_rescan() || event.paths.is_empty() {
				return EventStats { events: 1, copies: worker.rescan() };
			}
			let mut stats = EventStats::default();
			for fs_event in FsEvent::classify(event) {
				stats.events += 1;
				stats.copies += worker.handle(&fs_event);
			}
			stats
		})
		.await;

		match result {
			Ok(stats) => stats,
			Err(e) => {
				error!("Event handler for '{}' failed: {}", self.pair.source_root().display(), e);
				EventStats { events: 1, copies: CopyStats { errors: 1, ..Default::default() } }
			}
		}
	}

	fn skip(&self, path: &Path, reason: SkipReason, mut stats: CopyStats) -> CopyStats {
		stats.skipped += 1;
		self.reporter.on_skip(path, &reason);
		stats
	}
}

/// Registers subscriptions and starts one worker per pair
pub struct Dispatcher {
	reporter: SharedReporter,
	exclusions: Arc<ExclusionFilter>,
	config: DispatcherConfig,
}

impl Dispatcher {
	pub fn new(
		reporter: SharedReporter,
		exclusions: Arc<ExclusionFilter>,
		config: DispatcherConfig,
	) -> Self {
		Dispatcher { reporter, exclusions, config }
	}

	/// Subscribe to every pair and start dispatching.
	///
	/// A pair whose subscription fails is reported and stays inert. Fails
	/// with [`MirrorError::NoActivePairs`] when no pair could be subscribed.
	pub async fn start(self, pairs: Vec<WatchPair>) -> Result<RunningDispatcher, MirrorError> {
		debug!("Dispatcher {}", DispatcherState::Starting);
		let config = self.config;

		// Subscribing happens off the async threads: handlers use blocking_send
		let registered = tokio::task::spawn_blocking(move || {
			pairs
				.into_iter()
				.map(|pair| {
					let (tx, rx) = mpsc::channel(config.channel_capacity);
					let result =
						watcher::subscribe(pair.source_root(), config.backend, config.poll_interval, tx);
					(pair, result.map(|subscription| (subscription, rx)))
				})
				.collect::<Vec<_>>()
		})
		.await
		.map_err(|e| MirrorError::Io(io::Error::new(io::ErrorKind::Other, e)))?;

		let (stop_tx, stop_rx) = watch::channel(false);
		let mut subscriptions = Vec::new();
		let mut workers = Vec::new();

		for (pair, result) in registered {
			let (subscription, rx) = match result {
				Ok(registered) => registered,
				Err(e) => {
					self.reporter.on_error(&e);
					continue;
				}
			};

			info!(
				"Watching directory: '{}' with output: '{}'",
				pair.source_root().display(),
				pair.destination_root().display()
			);
			let worker = Arc::new(PairWorker::new(
				pair,
				self.reporter.clone(),
				self.exclusions.clone(),
				config.copy,
			));
			let root = worker.pair().source_root().to_path_buf();
			workers.push((root, tokio::spawn(worker.run(rx, stop_rx.clone()))));
			subscriptions.push(subscription);
		}

		if subscriptions.is_empty() {
			return Err(MirrorError::NoActivePairs);
		}

		debug!("Dispatcher {}", DispatcherState::Watching);
		Ok(RunningDispatcher { subscriptions, workers, stop_tx, state: DispatcherState::Watching })
	}
}

/// Handle to a dispatcher in the `Watching` state
pub struct RunningDispatcher {
	subscriptions: Vec<Subscription>,
	workers: Vec<(PathBuf, JoinHandle<EventStats>)>,
	stop_tx: watch::Sender<bool>,
	state: DispatcherState,
}

impl RunningDispatcher {
	pub fn state(&self) -> DispatcherState {
		self.state
	}

	/// Source roots with a live subscription
	pub fn watched_roots(&self) -> Vec<&Path> {
		self.subscriptions.iter().map(|s| s.root()).collect()
	}

	/// Stop notifications, drain queued events and wait for every worker
	pub async fn shutdown(mut self) -> EventStats {
		info!("Stopping watcher...");
		self.subscriptions.clear();
		let _ = self.stop_tx.send(true);

		let mut total = EventStats::default();
		for (root, handle) in self.workers.drain(..) {
			match handle.await {
				Ok(stats) => {
					debug!(
						"Worker for '{}' handled {} events ({} files copied, {} errors)",
						root.display(),
						stats.events,
						stats.copies.files_copied,
						stats.copies.errors
					);
					total += stats;
				}
				Err(e) => error!("Worker for '{}' ended abnormally: {}", root.display(), e),
			}
		}

		self.state = DispatcherState::Stopped;
		debug!("Dispatcher {}", self.state);
		total
	}
}


// vim: ts=4
