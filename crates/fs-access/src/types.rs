use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
	File,
	Directory,
	Symlink,
}

impl EntryKind {
	pub fn from_std(file_type: std::fs::FileType) -> Self {
		if file_type.is_dir() {
			Self::Directory
		} else if file_type.is_symlink() {
			Self::Symlink
		} else {
			Self::File
		}
	}
}

/// Metadata for a single path, as reported by an accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMetadata {
	pub kind: EntryKind,
	pub size: u64,
	/// `None` when the platform or backend can't report a modification time
	pub modified: Option<SystemTime>,
}

impl RawMetadata {
	pub fn is_dir(&self) -> bool {
		self.kind == EntryKind::Directory
	}
}

/// A child returned by a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirEntry {
	pub name: String,
	pub kind: EntryKind,
	pub size: u64,
	pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
	Local,
	Memory,
	/// Supplied by the embedding application, e.g. a root shell accessor
	External,
}
