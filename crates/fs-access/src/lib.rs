//! Filesystem access for the AppVault core.
//!
//! Everything that touches storage goes through [`FsAccessor`], so the same scanning and
//! deduplication code runs against the plain local filesystem, a privileged accessor
//! supplied by the embedding application, or the in-memory [`MemoryFs`] used by tests.
//!
//! All calls are blocking and must run on a thread that is allowed to block.

#![warn(
	clippy::all,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro,
	deprecated
)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod local;
mod memory;
mod types;

use std::path::Path;

pub use error::FsError;
pub use local::LocalAccessor;
pub use memory::MemoryFs;
pub use types::{BackendType, EntryKind, RawDirEntry, RawMetadata};

/// Blocking access to a directory tree.
///
/// Implementations never follow symlinks when reporting metadata, and [`read_dir`] skips
/// entries whose metadata can't be read instead of failing the whole listing. Only
/// [`metadata_follow`] resolves links, for entry points such as a scan root.
///
/// [`read_dir`]: FsAccessor::read_dir
/// [`metadata_follow`]: FsAccessor::metadata_follow
pub trait FsAccessor: Send + Sync {
	fn metadata(&self, path: &Path) -> Result<RawMetadata, FsError>;

	/// Like [`metadata`](FsAccessor::metadata) but resolves `path` if it is a symlink.
	///
	/// Backends without links can rely on the default.
	fn metadata_follow(&self, path: &Path) -> Result<RawMetadata, FsError> {
		self.metadata(path)
	}

	fn read_dir(&self, path: &Path) -> Result<Vec<RawDirEntry>, FsError>;

	/// Reads at most `limit` leading bytes of a file
	fn read_prefix(&self, path: &Path, limit: u64) -> Result<Vec<u8>, FsError>;

	fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;

	/// Copies a file, returning the number of bytes written
	fn copy_file(&self, from: &Path, to: &Path) -> Result<u64, FsError>;

	fn remove_dir_all(&self, path: &Path) -> Result<(), FsError>;

	fn backend_type(&self) -> BackendType;

	fn exists(&self, path: &Path) -> bool {
		self.metadata(path).is_ok()
	}

	fn is_dir(&self, path: &Path) -> bool {
		self.metadata(path)
			.map(|metadata| metadata.kind == EntryKind::Directory)
			.unwrap_or(false)
	}

	/// Whether `path` is a directory or a symlink leading to one
	fn resolves_to_dir(&self, path: &Path) -> bool {
		self.metadata_follow(path)
			.map(|metadata| metadata.kind == EntryKind::Directory)
			.unwrap_or(false)
	}
}

impl<T: FsAccessor + ?Sized> FsAccessor for std::sync::Arc<T> {
	fn metadata(&self, path: &Path) -> Result<RawMetadata, FsError> {
		(**self).metadata(path)
	}

	fn metadata_follow(&self, path: &Path) -> Result<RawMetadata, FsError> {
		(**self).metadata_follow(path)
	}

	fn read_dir(&self, path: &Path) -> Result<Vec<RawDirEntry>, FsError> {
		(**self).read_dir(path)
	}

	fn read_prefix(&self, path: &Path, limit: u64) -> Result<Vec<u8>, FsError> {
		(**self).read_prefix(path, limit)
	}

	fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
		(**self).create_dir_all(path)
	}

	fn copy_file(&self, from: &Path, to: &Path) -> Result<u64, FsError> {
		(**self).copy_file(from, to)
	}

	fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
		(**self).remove_dir_all(path)
	}

	fn backend_type(&self) -> BackendType {
		(**self).backend_type()
	}
}
