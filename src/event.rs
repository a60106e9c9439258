//! Filesystem events as seen by the dispatcher
//!
//! Raw `notify` events are classified into the handful of kinds the mirror
//! reacts to. One raw event may carry several paths and turns into one
//! [`FsEvent`] per affected entry.

use std::fmt;
use std::path::PathBuf;

use notify::event::{AccessKind, AccessMode, CreateKind, EventKind, ModifyKind, RenameMode};

/// Kind of change reported for an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEventKind {
	/// A new file
	CreatedFile,
	/// A new directory
	CreatedDir,
	/// A new entry whose type the facility did not report
	Created,
	/// Content or metadata changed
	Modified,
	/// The entry appeared under a new name; `from` is set when the facility
	/// reported both sides of the rename
	Moved { from: Option<PathBuf> },
	/// The entry was removed or renamed away
	Removed,
	/// Notification that does not change the entry (open, read, ...)
	Other(String),
}

/// A classified notification for a single entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
	pub kind: FsEventKind,
	pub path: PathBuf,
}

impl FsEvent {
	pub fn new(kind: FsEventKind, path: impl Into<PathBuf>) -> Self {
		FsEvent { kind, path: path.into() }
	}

	/// Classify a raw notification
	pub fn classify(event: notify::Event) -> Vec<FsEvent> {
		let notify::Event { kind, mut paths, .. } = event;

		if kind == EventKind::Modify(ModifyKind::Name(RenameMode::Both)) && paths.len() >= 2 {
			let to = paths.swap_remove(1);
			let from = paths.swap_remove(0);
			return vec![FsEvent::new(FsEventKind::Moved { from: Some(from) }, to)];
		}

		let kind = match kind {
			EventKind::Create(CreateKind::File) => FsEventKind::CreatedFile,
			EventKind::Create(CreateKind::Folder) => FsEventKind::CreatedDir,
			EventKind::Create(_) => FsEventKind::Created,
			EventKind::Modify(ModifyKind::Name(RenameMode::From)) => FsEventKind::Removed,
			EventKind::Modify(ModifyKind::Name(_)) => FsEventKind::Moved { from: None },
			EventKind::Modify(_) => FsEventKind::Modified,
			EventKind::Access(AccessKind::Close(AccessMode::Write)) => FsEventKind::Modified,
			EventKind::Remove(_) => FsEventKind::Removed,
			EventKind::Any => FsEventKind::Modified,
			EventKind::Access(access) => FsEventKind::Other(format!("{:?}", access)),
			EventKind::Other => FsEventKind::Other("other".to_string()),
		};

		paths.into_iter().map(|path| FsEvent::new(kind.clone(), path)).collect()
	}
}

impl fmt::Display for FsEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let path = self.path.display();
		match &self.kind {
			FsEventKind::CreatedFile => write!(f, "New file detected: {}", path),
			FsEventKind::CreatedDir => write!(f, "New directory detected: {}", path),
			FsEventKind::Created => write!(f, "New entry detected: {}", path),
			FsEventKind::Modified => write!(f, "Modification detected: {}", path),
			FsEventKind::Moved { from: Some(from) } => {
				write!(f, "Move detected: {} -> {}", from.display(), path)
			}
			FsEventKind::Moved { from: None } => write!(f, "Move detected: {}", path),
			FsEventKind::Removed => write!(f, "Removal detected: {}", path),
			FsEventKind::Other(kind) => write!(f, "Notification ({}) for {}", kind, path),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use notify::event::{DataChange, RemoveKind};
	use std::path::Path;

	fn raw(kind: EventKind, paths: &[&str]) -> notify::Event {
		paths.iter().fold(notify::Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
	}

	#[test]
	fn test_create_kinds() {
		let ev = FsEvent::classify(raw(EventKind::Create(CreateKind::File), &["/s/a"]));
		assert_eq!(ev, vec![FsEvent::new(FsEventKind::CreatedFile, "/s/a")]);

		let ev = FsEvent::classify(raw(EventKind::Create(CreateKind::Folder), &["/s/d"]));
		assert_eq!(ev[0].kind, FsEventKind::CreatedDir);

		let ev = FsEvent::classify(raw(EventKind::Create(CreateKind::Any), &["/s/x"]));
		assert_eq!(ev[0].kind, FsEventKind::Created);
	}

	#[test]
	fn test_modify_and_close_write() {
		let ev = FsEvent::classify(raw(
			EventKind::Modify(ModifyKind::Data(DataChange::Content)),
			&["/s/a"],
		));
		assert_eq!(ev[0].kind, FsEventKind::Modified);

		let ev = FsEvent::classify(raw(
			EventKind::Access(AccessKind::Close(AccessMode::Write)),
			&["/s/a"],
		));
		assert_eq!(ev[0].kind, FsEventKind::Modified);
	}

	#[test]
	fn test_rename_both() {
		let ev = FsEvent::classify(raw(
			EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
			&["/s/old", "/s/new"],
		));
		assert_eq!(ev.len(), 1);
		assert_eq!(ev[0].path, Path::new("/s/new"));
		assert_eq!(ev[0].kind, FsEventKind::Moved { from: Some(PathBuf::from("/s/old")) });
	}

	#[test]
	fn test_rename_halves() {
		let ev =
			FsEvent::classify(raw(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/s/a"]));
		assert_eq!(ev[0].kind, FsEventKind::Removed);

		let ev =
			FsEvent::classify(raw(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &["/s/b"]));
		assert_eq!(ev[0].kind, FsEventKind::Moved { from: None });
	}

	#[test]
	fn test_remove_and_access() {
		let ev = FsEvent::classify(raw(EventKind::Remove(RemoveKind::File), &["/s/a"]));
		assert_eq!(ev[0].kind, FsEventKind::Removed);

		let ev = FsEvent::classify(raw(
			EventKind::Access(AccessKind::Open(AccessMode::Read)),
			&["/s/a"],
		));
		assert!(matches!(ev[0].kind, FsEventKind::Other(_)));
	}

	#[test]
	fn test_multiple_paths_fan_out() {
		let ev = FsEvent::classify(raw(EventKind::Create(CreateKind::File), &["/s/a", "/s/b"]));
		assert_eq!(ev.len(), 2);
		assert_eq!(ev[1].path, Path::new("/s/b"));
	}

	#[test]
	fn test_display_matches_log_wording() {
		let ev = FsEvent::new(FsEventKind::CreatedFile, "/s/a.txt");
		assert_eq!(ev.to_string(), "New file detected: /s/a.txt");
	}
}

// vim: ts=4
