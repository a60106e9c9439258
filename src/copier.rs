//! Copy executor: mirrors a single file or a whole subtree
//!
//! Failures never propagate out of [`CopyExecutor::copy`]. Each one is handed
//! to the reporter and counted in the returned [`CopyStats`], so a failed
//! entry never stops the caller from handling the next one.

use std::fs;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetime::FileTime;

use crate::error::MirrorError;
use crate::exclusion::ExclusionFilter;
use crate::logging::*;
use crate::pair::WatchPair;
use crate::reporter::{SharedReporter, SkipReason};

/// Copy behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
	/// Carry access and modification times over to the copy
	pub preserve_timestamps: bool,
}

impl Default for CopyOptions {
	fn default() -> Self {
		CopyOptions { preserve_timestamps: true }
	}
}

/// Counters for one copy request
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
	pub files_copied: usize,
	pub dirs_created: usize,
	pub skipped: usize,
	pub errors: usize,
}

impl AddAssign for CopyStats {
	fn add_assign(&mut self, other: CopyStats) {
		self.files_copied += other.files_copied;
		self.dirs_created += other.dirs_created;
		self.skipped += other.skipped;
		self.errors += other.errors;
	}
}

/// Copies entries of one watch pair's source tree into its destination tree
pub struct CopyExecutor {
	source_root: PathBuf,
	reporter: SharedReporter,
	exclusions: Arc<ExclusionFilter>,
	options: CopyOptions,
}

impl CopyExecutor {
	pub fn new(
		pair: &WatchPair,
		reporter: SharedReporter,
		exclusions: Arc<ExclusionFilter>,
		options: CopyOptions,
	) -> Self {
		CopyExecutor { source_root: pair.source_root().to_path_buf(), reporter, exclusions, options }
	}

	/// Copy `src` to `dst`.
	///
	/// Files overwrite `dst`. Directories are mirrored recursively; entries
	/// that only exist at the destination are left alone.
	pub fn copy(&self, src: &Path, dst: &Path) -> CopyStats {
		let mut stats = CopyStats::default();
		self.copy_entry(src, dst, &mut stats);
		stats
	}

	/// Make sure `dst` exists as a directory without copying any content
	pub fn ensure_dir(&self, dst: &Path) -> CopyStats {
		let mut stats = CopyStats::default();
		self.make_dir(dst, &mut stats);
		stats
	}

	/// Check `src` and every directory between it and the source root
	/// against the exclusion patterns of this pair
	pub fn is_excluded(&self, src: &Path) -> bool {
		match src.strip_prefix(&self.source_root) {
			Ok(relative) => relative.ancestors().any(|p| self.exclusions.should_exclude(p)),
			Err(_) => false,
		}
	}

	fn copy_entry(&self, src: &Path, dst: &Path, stats: &mut CopyStats) {
		if self.is_excluded(src) {
			self.skip(src, SkipReason::Excluded, stats);
			return;
		}

		let meta = match fs::symlink_metadata(src) {
			Ok(meta) => meta,
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				self.skip(src, SkipReason::Vanished, stats);
				return;
			}
			Err(e) => {
				self.fail(MirrorError::copy_io(src, e), stats);
				return;
			}
		};

		let meta = if meta.file_type().is_symlink() {
			match fs::metadata(src) {
				Ok(target) if target.is_dir() => {
					self.skip(src, SkipReason::SymlinkedDirectory, stats);
					return;
				}
				Ok(target) => target,
				Err(e) if e.kind() == io::ErrorKind::NotFound => {
					self.skip(src, SkipReason::DanglingSymlink, stats);
					return;
				}
				Err(e) => {
					self.fail(MirrorError::copy_io(src, e), stats);
					return;
				}
			}
		} else {
			meta
		};

		if meta.is_dir() {
			self.mirror_dir(src, dst, stats);
		} else if meta.is_file() {
			self.copy_file(src, dst, &meta, stats);
		} else {
			self.skip(src, SkipReason::SpecialFile, stats);
		}
	}

	fn mirror_dir(&self, src: &Path, dst: &Path, stats: &mut CopyStats) {
		if !self.make_dir(dst, stats) {
			return;
		}

		let entries = match fs::read_dir(src) {
			Ok(entries) => entries,
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				self.skip(src, SkipReason::Vanished, stats);
				return;
			}
			Err(e) => {
				self.fail(MirrorError::copy_io(src, e), stats);
				return;
			}
		};

		let mut names = Vec::new();
		for entry_result in entries {
			match entry_result {
				Ok(entry) => names.push(entry.file_name()),
				Err(e) => self.fail(MirrorError::copy_io(src, e), stats),
			}
		}
		// Stable order keeps logs and tests deterministic
		names.sort();

		for name in names {
			self.copy_entry(&src.join(&name), &dst.join(&name), stats);
		}
	}

	/// Returns false when `dst` is not usable as a directory
	fn make_dir(&self, dst: &Path, stats: &mut CopyStats) -> bool {
		match fs::symlink_metadata(dst) {
			Ok(meta) if meta.is_dir() => return true,
			Ok(_) => {
				let e = io::Error::new(
					io::ErrorKind::AlreadyExists,
					"destination exists and is not a directory",
				);
				self.fail(MirrorError::copy_io(dst, e), stats);
				return false;
			}
			Err(e) if e.kind() == io::ErrorKind::NotFound => {}
			Err(e) => {
				self.fail(MirrorError::copy_io(dst, e), stats);
				return false;
			}
		}

		match fs::create_dir_all(dst) {
			Ok(()) => {
				stats.dirs_created += 1;
				self.reporter.on_dir_create(dst);
				true
			}
			Err(e) => {
				self.fail(MirrorError::copy_io(dst, e), stats);
				false
			}
		}
	}

	fn copy_file(&self, src: &Path, dst: &Path, meta: &fs::Metadata, stats: &mut CopyStats) {
		if let Some(parent) = dst.parent() {
			if !self.make_dir(parent, stats) {
				return;
			}
		}

		match fs::copy(src, dst) {
			Ok(_) => {
				if self.options.preserve_timestamps {
					preserve_times(meta, dst);
				}
				stats.files_copied += 1;
				self.reporter.on_copy(src, dst);
			}
			Err(e) if e.kind() == io::ErrorKind::NotFound && !src.exists() => {
				self.skip(src, SkipReason::Vanished, stats);
			}
			Err(e) => self.fail(MirrorError::copy_io(src, e), stats),
		}
	}

	fn skip(&self, path: &Path, reason: SkipReason, stats: &mut CopyStats) {
		stats.skipped += 1;
		self.reporter.on_skip(path, &reason);
	}

	fn fail(&self, error: MirrorError, stats: &mut CopyStats) {
		stats.errors += 1;
		self.reporter.on_error(&error);
	}
}

/// Best-effort timestamp preservation; permission bits come with `fs::copy`
fn preserve_times(meta: &fs::Metadata, dst: &Path) {
	let atime = FileTime::from_last_access_time(meta);
	let mtime = FileTime::from_last_modification_time(meta);
	if let Err(e) = filetime::set_file_times(dst, atime, mtime) {
		debug!("Cannot preserve timestamps on '{}': {}", dst.display(), e);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reporter::MirrorReporter;
	use std::sync::Mutex;
	use tempfile::TempDir;

	#[derive(Default)]
	struct Recorder {
		skips: Mutex<Vec<(PathBuf, SkipReason)>>,
		errors: Mutex<Vec<String>>,
	}

	impl MirrorReporter for Recorder {
		fn on_skip(&self, path: &Path, reason: &SkipReason) {
			self.skips.lock().unwrap().push((path.to_path_buf(), reason.clone()));
		}

		fn on_error(&self, error: &MirrorError) {
			self.errors.lock().unwrap().push(error.to_string());
		}
	}

	fn setup(exclude: &[&str]) -> (TempDir, PathBuf, PathBuf, Arc<Recorder>, CopyExecutor) {
		let tmp = TempDir::new().unwrap();
		let src = tmp.path().join("src");
		let dst = tmp.path().join("dst");
		fs::create_dir(&src).unwrap();

		let recorder = Arc::new(Recorder::default());
		let patterns: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
		let exclusions = Arc::new(ExclusionFilter::new(&patterns, &[]).unwrap());
		let executor = CopyExecutor::new(
			&WatchPair::new(&src, &dst),
			recorder.clone(),
			exclusions,
			CopyOptions::default(),
		);
		(tmp, src, dst, recorder, executor)
	}

	#[test]
	fn test_copy_file_creates_parents() {
		let (_tmp, src, dst, _rec, exec) = setup(&[]);
		fs::write(src.join("a.txt"), "hello").unwrap();

		let stats = exec.copy(&src.join("a.txt"), &dst.join("deep/er/a.txt"));
		assert_eq!(stats.files_copied, 1);
		assert_eq!(stats.errors, 0);
		assert_eq!(fs::read_to_string(dst.join("deep/er/a.txt")).unwrap(), "hello");
	}

	#[test]
	fn test_copy_file_overwrites() {
		let (_tmp, src, dst, _rec, exec) = setup(&[]);
		fs::create_dir_all(&dst).unwrap();
		fs::write(src.join("a.txt"), "new").unwrap();
		fs::write(dst.join("a.txt"), "old content").unwrap();

		exec.copy(&src.join("a.txt"), &dst.join("a.txt"));
		assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "new");
	}

	#[test]
	fn test_copy_preserves_mtime() {
		let (_tmp, src, dst, _rec, exec) = setup(&[]);
		let file = src.join("old.txt");
		fs::write(&file, "x").unwrap();
		let stamp = FileTime::from_unix_time(1_500_000_000, 0);
		filetime::set_file_mtime(&file, stamp).unwrap();

		exec.copy(&file, &dst.join("old.txt"));
		let meta = fs::metadata(dst.join("old.txt")).unwrap();
		assert_eq!(FileTime::from_last_modification_time(&meta), stamp);
	}

	#[test]
	fn test_copy_directory_keeps_destination_extras() {
		let (_tmp, src, dst, _rec, exec) = setup(&[]);
		fs::create_dir_all(src.join("sub/inner")).unwrap();
		fs::write(src.join("sub/b.txt"), "world").unwrap();
		fs::create_dir_all(&dst).unwrap();
		fs::write(dst.join("only-here.txt"), "keep").unwrap();

		let stats = exec.copy(&src, &dst);
		assert_eq!(stats.files_copied, 1);
		assert_eq!(stats.dirs_created, 2);
		assert_eq!(fs::read_to_string(dst.join("sub/b.txt")).unwrap(), "world");
		assert!(dst.join("sub/inner").is_dir());
		assert_eq!(fs::read_to_string(dst.join("only-here.txt")).unwrap(), "keep");
	}

	#[test]
	fn test_vanished_source_is_a_skip() {
		let (_tmp, src, dst, rec, exec) = setup(&[]);

		let stats = exec.copy(&src.join("gone.txt"), &dst.join("gone.txt"));
		assert_eq!(stats.skipped, 1);
		assert_eq!(stats.errors, 0);
		assert!(!dst.join("gone.txt").exists());
		assert_eq!(rec.skips.lock().unwrap()[0].1, SkipReason::Vanished);
	}

	#[test]
	fn test_excluded_entries_are_skipped() {
		let (_tmp, src, dst, rec, exec) = setup(&["*.swp"]);
		fs::write(src.join("keep.txt"), "k").unwrap();
		fs::write(src.join("edit.swp"), "s").unwrap();

		let stats = exec.copy(&src, &dst);
		assert_eq!(stats.files_copied, 1);
		assert!(!dst.join("edit.swp").exists());
		assert_eq!(rec.skips.lock().unwrap()[0].1, SkipReason::Excluded);
	}

	#[test]
	fn test_exclusion_covers_directory_contents() {
		let (_tmp, src, _dst, _rec, exec) = setup(&["cache"]);
		assert!(exec.is_excluded(&src.join("cache")));
		assert!(exec.is_excluded(&src.join("cache/new")));
		assert!(exec.is_excluded(&src.join("cache/deep/more")));
		assert!(!exec.is_excluded(&src.join("cached.txt")));
		assert!(!exec.is_excluded(&src));
	}

	#[test]
	fn test_file_blocking_directory_is_an_error() {
		let (_tmp, src, dst, rec, exec) = setup(&[]);
		fs::create_dir_all(src.join("sub")).unwrap();
		fs::write(src.join("sub/x"), "x").unwrap();
		fs::create_dir_all(&dst).unwrap();
		fs::write(dst.join("sub"), "i am a file").unwrap();
		fs::write(src.join("z.txt"), "after").unwrap();

		let stats = exec.copy(&src, &dst);
		assert_eq!(stats.errors, 1);
		assert_eq!(rec.errors.lock().unwrap().len(), 1);
		// Siblings are still mirrored
		assert_eq!(fs::read_to_string(dst.join("z.txt")).unwrap(), "after");
	}

	#[cfg(unix)]
	#[test]
	fn test_symlinks() {
		let (_tmp, src, dst, rec, exec) = setup(&[]);
		fs::write(src.join("target.txt"), "t").unwrap();
		fs::create_dir(src.join("realdir")).unwrap();
		std::os::unix::fs::symlink(src.join("target.txt"), src.join("link.txt")).unwrap();
		std::os::unix::fs::symlink(src.join("realdir"), src.join("linkdir")).unwrap();
		std::os::unix::fs::symlink(src.join("missing"), src.join("dangling")).unwrap();

		exec.copy(&src, &dst);
		assert_eq!(fs::read_to_string(dst.join("link.txt")).unwrap(), "t");
		assert!(!dst.join("linkdir").exists());
		assert!(!dst.join("dangling").exists());

		let skips = rec.skips.lock().unwrap();
		assert!(skips.iter().any(|(_, r)| *r == SkipReason::SymlinkedDirectory));
		assert!(skips.iter().any(|(_, r)| *r == SkipReason::DanglingSymlink));
	}

	#[test]
	fn test_ensure_dir_is_idempotent() {
		let (_tmp, _src, dst, _rec, exec) = setup(&[]);
		assert_eq!(exec.ensure_dir(&dst.join("d")).dirs_created, 1);
		assert_eq!(exec.ensure_dir(&dst.join("d")).dirs_created, 0);
	}
}

// vim: ts=4
