//! Filesystem subscriptions feeding a bounded channel
//!
//! The notifier invokes its handler on its own thread. The handler only
//! forwards the raw result into a bounded `tokio::sync::mpsc` channel with
//! `blocking_send`, so a slow consumer pushes back on the notifier instead of
//! piling up callbacks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::WatcherBackend;
use crate::error::MirrorError;
use crate::logging::*;

/// Raw notification as delivered by `notify`
pub type RawEvent = notify::Result<notify::Event>;

/// A live recursive subscription. Dropping it stops notifications and
/// releases the channel sender held by the handler.
pub struct Subscription {
	root: PathBuf,
	_watcher: Box<dyn Watcher + Send>,
}

impl Subscription {
	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("root", &self.root).finish()
	}
}

/// Subscribe recursively to changes below `root`.
///
/// Must not be called from inside an async task: the poll backend may invoke
/// the handler on the calling thread while it scans the tree.
pub fn subscribe(
	root: &Path,
	backend: WatcherBackend,
	poll_interval: Duration,
	tx: mpsc::Sender<RawEvent>,
) -> Result<Subscription, MirrorError> {
	let handler_root = root.to_path_buf();
	let handler = move |result: RawEvent| {
		if tx.blocking_send(result).is_err() {
			debug!(
				"Event channel for '{}' is closed, notification dropped during shutdown",
				handler_root.display()
			);
		}
	};

	let mut watcher: Box<dyn Watcher + Send> = match backend {
		WatcherBackend::Native => Box::new(
			RecommendedWatcher::new(handler, notify::Config::default())
				.map_err(|e| MirrorError::subscription(root, e))?,
		),
		WatcherBackend::Poll => Box::new(
			PollWatcher::new(handler, notify::Config::default().with_poll_interval(poll_interval))
				.map_err(|e| MirrorError::subscription(root, e))?,
		),
	};

	watcher.watch(root, RecursiveMode::Recursive).map_err(|e| MirrorError::subscription(root, e))?;
	debug!("Subscribed to '{}' using {:?} backend", root.display(), backend);

	Ok(Subscription { root: root.to_path_buf(), _watcher: watcher })
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_subscribe_missing_root_fails() {
		let tmp = TempDir::new().unwrap();
		let (tx, _rx) = mpsc::channel(8);
		let result = subscribe(
			&tmp.path().join("missing"),
			WatcherBackend::Native,
			Duration::from_millis(100),
			tx,
		);
		assert!(matches!(result, Err(MirrorError::Subscription { .. })));
	}

	#[test]
	fn test_subscribe_existing_root() {
		let tmp = TempDir::new().unwrap();
		let (tx, _rx) = mpsc::channel(8);
		let sub =
			subscribe(tmp.path(), WatcherBackend::Poll, Duration::from_millis(100), tx).unwrap();
		assert_eq!(sub.root(), tmp.path());
	}
}

// vim: ts=4
