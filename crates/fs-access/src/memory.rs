//! In-memory accessor with explicit modification times.
//!
//! Nothing here bumps a timestamp on its own: adding a child does not touch the parent's
//! mtime. Callers set every timestamp they care about, which makes traversal order and
//! threshold comparisons fully reproducible.

use std::{
	collections::{BTreeMap, HashSet},
	io,
	path::{Path, PathBuf},
	time::SystemTime,
};

use av_utils::error::FileIOError;
use parking_lot::RwLock;

use super::{BackendType, EntryKind, FsAccessor, FsError, RawDirEntry, RawMetadata};

#[derive(Debug, Clone)]
struct Node {
	kind: EntryKind,
	modified: SystemTime,
	data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MemoryFs {
	nodes: RwLock<BTreeMap<PathBuf, Node>>,
	denied: RwLock<HashSet<PathBuf>>,
}

impl MemoryFs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a directory, creating missing ancestors with a `UNIX_EPOCH` mtime
	pub fn add_dir(&self, path: impl AsRef<Path>, modified: SystemTime) -> &Self {
		let path = path.as_ref();
		let mut nodes = self.nodes.write();
		insert_ancestors(&mut nodes, path);
		nodes.insert(
			path.to_path_buf(),
			Node {
				kind: EntryKind::Directory,
				modified,
				data: Vec::new(),
			},
		);
		self
	}

	/// Adds a file, creating missing ancestors with a `UNIX_EPOCH` mtime
	pub fn add_file(
		&self,
		path: impl AsRef<Path>,
		data: impl Into<Vec<u8>>,
		modified: SystemTime,
	) -> &Self {
		let path = path.as_ref();
		let mut nodes = self.nodes.write();
		insert_ancestors(&mut nodes, path);
		nodes.insert(
			path.to_path_buf(),
			Node {
				kind: EntryKind::File,
				modified,
				data: data.into(),
			},
		);
		self
	}

	pub fn add_symlink(&self, path: impl AsRef<Path>, modified: SystemTime) -> &Self {
		let path = path.as_ref();
		let mut nodes = self.nodes.write();
		insert_ancestors(&mut nodes, path);
		nodes.insert(
			path.to_path_buf(),
			Node {
				kind: EntryKind::Symlink,
				modified,
				data: Vec::new(),
			},
		);
		self
	}

	pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) {
		if let Some(node) = self.nodes.write().get_mut(path.as_ref()) {
			node.modified = modified;
		}
	}

	pub fn set_contents(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
		if let Some(node) = self.nodes.write().get_mut(path.as_ref()) {
			node.data = data.into();
		}
	}

	/// Every access to `path` fails with `PermissionDenied` until [`allow`](Self::allow)
	pub fn deny(&self, path: impl AsRef<Path>) {
		self.denied.write().insert(path.as_ref().to_path_buf());
	}

	pub fn allow(&self, path: impl AsRef<Path>) {
		self.denied.write().remove(path.as_ref());
	}

	fn check_access(&self, path: &Path) -> Result<(), FsError> {
		if self.denied.read().contains(path) {
			return Err(FsError::FileIO(FileIOError::from_std_io_err(
				path,
				io::Error::from(io::ErrorKind::PermissionDenied),
			)));
		}

		Ok(())
	}

	fn node(&self, path: &Path) -> Result<Node, FsError> {
		self.check_access(path)?;
		self.nodes
			.read()
			.get(path)
			.cloned()
			.ok_or_else(|| FsError::NotFound(path.into()))
	}
}

fn insert_ancestors(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) {
	for ancestor in path.ancestors().skip(1) {
		if ancestor.as_os_str().is_empty() {
			break;
		}

		nodes.entry(ancestor.to_path_buf()).or_insert_with(|| Node {
			kind: EntryKind::Directory,
			modified: SystemTime::UNIX_EPOCH,
			data: Vec::new(),
		});
	}
}

impl FsAccessor for MemoryFs {
	fn metadata(&self, path: &Path) -> Result<RawMetadata, FsError> {
		let node = self.node(path)?;

		Ok(RawMetadata {
			kind: node.kind,
			size: node.data.len() as u64,
			modified: Some(node.modified),
		})
	}

	fn read_dir(&self, path: &Path) -> Result<Vec<RawDirEntry>, FsError> {
		let node = self.node(path)?;
		if node.kind != EntryKind::Directory {
			return Err(FsError::NotADirectory(path.into()));
		}

		let nodes = self.nodes.read();

		Ok(nodes
			.range(path.to_path_buf()..)
			.skip(1)
			.take_while(|(child, _)| child.starts_with(path))
			.filter(|(child, _)| child.parent() == Some(path))
			.filter_map(|(child, node)| {
				Some(RawDirEntry {
					name: child.file_name()?.to_string_lossy().to_string(),
					kind: node.kind,
					size: node.data.len() as u64,
					modified: Some(node.modified),
				})
			})
			.collect())
	}

	fn read_prefix(&self, path: &Path, limit: u64) -> Result<Vec<u8>, FsError> {
		let node = self.node(path)?;
		if node.kind == EntryKind::Directory {
			return Err(FsError::FileIO(FileIOError::from_std_io_err_with_msg(
				path,
				io::Error::from(io::ErrorKind::InvalidInput),
				"reading a directory as a file",
			)));
		}

		let end = usize::try_from(limit)
			.unwrap_or(usize::MAX)
			.min(node.data.len());

		Ok(node.data[..end].to_vec())
	}

	fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
		self.check_access(path)?;

		let mut nodes = self.nodes.write();
		if let Some(existing) = nodes.get(path) {
			if existing.kind != EntryKind::Directory {
				return Err(FsError::NotADirectory(path.into()));
			}
			return Ok(());
		}

		insert_ancestors(&mut nodes, path);
		nodes.insert(
			path.to_path_buf(),
			Node {
				kind: EntryKind::Directory,
				modified: SystemTime::now(),
				data: Vec::new(),
			},
		);

		Ok(())
	}

	fn copy_file(&self, from: &Path, to: &Path) -> Result<u64, FsError> {
		let source = self.node(from)?;
		self.check_access(to)?;

		let parent = to.parent().unwrap_or_else(|| Path::new(""));
		let mut nodes = self.nodes.write();
		match nodes.get(parent) {
			Some(node) if node.kind == EntryKind::Directory => {}
			Some(_) => return Err(FsError::NotADirectory(parent.into())),
			None => return Err(FsError::NotFound(parent.into())),
		}

		let size = source.data.len() as u64;
		nodes.insert(
			to.to_path_buf(),
			Node {
				kind: EntryKind::File,
				modified: SystemTime::now(),
				data: source.data,
			},
		);

		Ok(size)
	}

	fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
		let node = self.node(path)?;
		if node.kind != EntryKind::Directory {
			return Err(FsError::NotADirectory(path.into()));
		}

		self.nodes
			.write()
			.retain(|candidate, _| !candidate.starts_with(path));

		Ok(())
	}

	fn backend_type(&self) -> BackendType {
		BackendType::Memory
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	fn at(secs: u64) -> SystemTime {
		SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
	}

	#[test]
	fn lists_only_direct_children() {
		let fs = MemoryFs::new();
		fs.add_dir("/r", at(1))
			.add_dir("/r/a", at(2))
			.add_file("/r/a/f", "x", at(3))
			.add_file("/r/b", "yy", at(4))
			.add_file("/rr", "z", at(5));

		let mut names = fs
			.read_dir(Path::new("/r"))
			.unwrap()
			.into_iter()
			.map(|e| e.name)
			.collect::<Vec<_>>();
		names.sort();

		assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
	}

	#[test]
	fn ancestors_are_created_as_old_directories() {
		let fs = MemoryFs::new();
		fs.add_file("/data/pkg/files/db", "1", at(50));

		let metadata = fs.metadata(Path::new("/data/pkg")).unwrap();
		assert!(metadata.is_dir());
		assert_eq!(metadata.modified, Some(SystemTime::UNIX_EPOCH));
	}

	#[test]
	fn denied_paths_fail_with_io_error() {
		let fs = MemoryFs::new();
		fs.add_dir("/secret", at(1));
		fs.deny("/secret");

		assert!(matches!(
			fs.read_dir(Path::new("/secret")),
			Err(FsError::FileIO(_))
		));

		fs.allow("/secret");
		assert!(fs.read_dir(Path::new("/secret")).is_ok());
	}

	#[test]
	fn copy_requires_existing_parent() {
		let fs = MemoryFs::new();
		fs.add_file("/src/base.apk", vec![0u8; 10], at(1));

		assert!(fs
			.copy_file(Path::new("/src/base.apk"), Path::new("/dst/base.apk"))
			.unwrap_err()
			.is_not_found());

		fs.create_dir_all(Path::new("/dst")).unwrap();
		assert_eq!(
			fs.copy_file(Path::new("/src/base.apk"), Path::new("/dst/base.apk"))
				.unwrap(),
			10
		);
	}

	#[test]
	fn remove_dir_all_drops_descendants() {
		let fs = MemoryFs::new();
		fs.add_file("/store/a/base.apk", "1", at(1))
			.add_file("/store/ab/base.apk", "2", at(1));

		fs.remove_dir_all(Path::new("/store/a")).unwrap();

		assert!(!fs.exists(Path::new("/store/a/base.apk")));
		assert!(fs.exists(Path::new("/store/ab/base.apk")));
	}
}
