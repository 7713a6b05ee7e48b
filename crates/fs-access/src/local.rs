//! Local filesystem backend implementation

use std::{
	fs,
	io::Read,
	path::{Path, PathBuf},
};

use tracing::debug;

use super::{BackendType, EntryKind, FsAccessor, FsError, RawDirEntry, RawMetadata};

/// Local filesystem accessor
///
/// Thin wrapper around `std::fs`. Relative paths resolve against `root`, absolute paths are
/// used as-is.
#[derive(Debug, Clone)]
pub struct LocalAccessor {
	root: PathBuf,
}

impl LocalAccessor {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn resolve_path(&self, path: &Path) -> PathBuf {
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.root.join(path)
		}
	}
}

impl Default for LocalAccessor {
	fn default() -> Self {
		Self::new(".")
	}
}

impl FsAccessor for LocalAccessor {
	fn metadata(&self, path: &Path) -> Result<RawMetadata, FsError> {
		let full_path = self.resolve_path(path);
		debug!("LocalAccessor::metadata: {}", full_path.display());

		fs::symlink_metadata(&full_path)
			.map(|metadata| raw_metadata(&metadata))
			.map_err(|e| FsError::from_io(&full_path, e))
	}

	fn metadata_follow(&self, path: &Path) -> Result<RawMetadata, FsError> {
		let full_path = self.resolve_path(path);
		debug!("LocalAccessor::metadata_follow: {}", full_path.display());

		fs::metadata(&full_path)
			.map(|metadata| raw_metadata(&metadata))
			.map_err(|e| FsError::from_io(&full_path, e))
	}

	fn read_dir(&self, path: &Path) -> Result<Vec<RawDirEntry>, FsError> {
		let full_path = self.resolve_path(path);
		debug!("LocalAccessor::read_dir: {}", full_path.display());

		let dir = fs::read_dir(&full_path).map_err(|e| FsError::from_io(&full_path, e))?;

		let mut entries = Vec::new();
		for entry in dir {
			let Ok(entry) = entry else {
				continue;
			};

			// DirEntry::metadata does not traverse symlinks
			let metadata = match entry.metadata() {
				Ok(m) => m,
				Err(_) => continue, // Skip entries we can't read
			};

			entries.push(RawDirEntry {
				name: entry.file_name().to_string_lossy().to_string(),
				kind: EntryKind::from_std(metadata.file_type()),
				size: metadata.len(),
				modified: metadata.modified().ok(),
			});
		}

		Ok(entries)
	}

	fn read_prefix(&self, path: &Path, limit: u64) -> Result<Vec<u8>, FsError> {
		let full_path = self.resolve_path(path);
		debug!(
			"LocalAccessor::read_prefix: {} (limit: {limit})",
			full_path.display()
		);

		let file = fs::File::open(&full_path).map_err(|e| FsError::from_io(&full_path, e))?;

		let mut buffer = Vec::new();
		file.take(limit)
			.read_to_end(&mut buffer)
			.map_err(|e| FsError::from_io_with_msg(&full_path, e, "reading file prefix"))?;

		Ok(buffer)
	}

	fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
		let full_path = self.resolve_path(path);
		debug!("LocalAccessor::create_dir_all: {}", full_path.display());

		fs::create_dir_all(&full_path).map_err(|e| FsError::from_io(&full_path, e))
	}

	fn copy_file(&self, from: &Path, to: &Path) -> Result<u64, FsError> {
		let from = self.resolve_path(from);
		let to = self.resolve_path(to);
		debug!(
			"LocalAccessor::copy_file: {} -> {}",
			from.display(),
			to.display()
		);

		fs::copy(&from, &to).map_err(|e| {
			FsError::from_io_with_msg(&from, e, format!("copying to '{}'", to.display()))
		})
	}

	fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
		let full_path = self.resolve_path(path);
		debug!("LocalAccessor::remove_dir_all: {}", full_path.display());

		let metadata =
			fs::symlink_metadata(&full_path).map_err(|e| FsError::from_io(&full_path, e))?;
		if !metadata.is_dir() {
			return Err(FsError::NotADirectory(full_path.into()));
		}

		fs::remove_dir_all(&full_path).map_err(|e| FsError::from_io(&full_path, e))
	}

	fn backend_type(&self) -> BackendType {
		BackendType::Local
	}
}

fn raw_metadata(metadata: &fs::Metadata) -> RawMetadata {
	RawMetadata {
		kind: EntryKind::from_std(metadata.file_type()),
		size: metadata.len(),
		modified: metadata.modified().ok(),
	}
}
