//! Baseline sync performed once per watch pair before live monitoring

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::copier::{CopyExecutor, CopyOptions, CopyStats};
use crate::error::MirrorError;
use crate::exclusion::ExclusionFilter;
use crate::logging::*;
use crate::pair::{DestinationState, WatchPair};
use crate::reporter::SharedReporter;
use crate::validation;

/// Result of the baseline sync over all configured pairs
#[derive(Debug, Default)]
pub struct SyncReport {
	/// Pairs that were synced, with canonical roots, in configuration order
	pub ready: Vec<WatchPair>,
	/// Pairs that were skipped because they could not be used
	pub failed: Vec<WatchPair>,
	/// Copy counters summed over all ready pairs
	pub stats: CopyStats,
}

/// Runs the baseline copy for an ordered list of pairs
pub struct InitialSync {
	reporter: SharedReporter,
	exclusions: Arc<ExclusionFilter>,
	options: CopyOptions,
}

impl InitialSync {
	pub fn new(
		reporter: SharedReporter,
		exclusions: Arc<ExclusionFilter>,
		options: CopyOptions,
	) -> Self {
		InitialSync { reporter, exclusions, options }
	}

	/// Mirror every existing entry of each pair, in order.
	///
	/// A pair that cannot be used (missing source, destination inside the
	/// source, duplicate source root, roots overlapping an earlier pair) is
	/// reported once and skipped; the remaining pairs still run. Nothing is
	/// created on disk for a rejected pair.
	pub fn run(&self, pairs: &[WatchPair]) -> SyncReport {
		let mut report = SyncReport::default();
		let mut seen: HashSet<PathBuf> = HashSet::new();

		for pair in pairs {
			if seen.contains(pair.source_root()) {
				self.reject(pair, &mut report);
				continue;
			}

			let source_root = match pair.check_source() {
				Ok(source_root) => source_root,
				Err(e) => {
					self.fail(pair, e, &mut report);
					continue;
				}
			};

			// The same directory may be configured under two spellings
			if seen.contains(&source_root) {
				self.reject(pair, &mut report);
				continue;
			}

			if let Err(e) = check_overlap(pair, &source_root, &report.ready) {
				self.fail(pair, e, &mut report);
				continue;
			}

			let (ready, state) = match pair.create_destination(source_root) {
				Ok(prepared) => prepared,
				Err(e) => {
					self.fail(pair, e, &mut report);
					continue;
				}
			};
			seen.insert(pair.source_root().to_path_buf());
			seen.insert(ready.source_root().to_path_buf());

			if state == DestinationState::Created {
				info!("Created output directory: {}", ready.destination_root().display());
			}

			info!("Performing initial copy for '{}'", ready.source_root().display());
			let executor = CopyExecutor::new(
				&ready,
				self.reporter.clone(),
				self.exclusions.clone(),
				self.options,
			);
			let stats = executor.copy(ready.source_root(), ready.destination_root());
			info!(
				"Initial copy for '{}' done: {} files copied, {} directories created, {} skipped, {} errors",
				ready.source_root().display(),
				stats.files_copied,
				stats.dirs_created,
				stats.skipped,
				stats.errors
			);

			report.stats += stats;
			report.ready.push(ready);
		}

		report
	}

	fn reject(&self, pair: &WatchPair, report: &mut SyncReport) {
		self.fail(pair, MirrorError::configuration(pair.source_root(), "duplicate source root"), report);
	}

	fn fail(&self, pair: &WatchPair, e: MirrorError, report: &mut SyncReport) {
		self.reporter.on_error(&e);
		report.failed.push(pair.clone());
	}
}

/// Reject a pair whose destination lies inside an accepted pair's source, or
/// whose source contains an accepted pair's destination. Either way one
/// pair's copies show up as the other pair's events.
fn check_overlap(
	pair: &WatchPair,
	source_root: &Path,
	accepted: &[WatchPair],
) -> Result<(), MirrorError> {
	let destination = fs::canonicalize(pair.destination_root())
		.unwrap_or_else(|_| pair.destination_root().to_path_buf());

	for other in accepted {
		validation::validate_destination_outside_source(&destination, other.source_root())
			.map_err(|e| MirrorError::configuration(pair.destination_root(), e.to_string()))?;
		validation::validate_destination_outside_source(other.destination_root(), source_root)
			.map_err(|e| MirrorError::configuration(pair.source_root(), e.to_string()))?;
	}
	Ok(())
}


// vim: ts=4
