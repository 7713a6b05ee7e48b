use std::{
	collections::HashSet,
	path::{Component, Path, PathBuf},
};

use av_fs_access::{EntryKind, FsAccessor, FsError};
use av_utils::error::report_error;
use tracing::{info, warn};

use super::{
	compute_key, count_references, verify_match, ApkSet, BackupRecord, DedupConfig, DedupError,
	DedupKey, PackageLocks,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredApks {
	pub key: DedupKey,
	pub dir: PathBuf,
	/// The dedup directory already held these APKs and nothing was copied
	pub reused: bool,
	pub bytes_copied: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
	pub removed: Vec<DedupKey>,
	pub failed: Vec<DedupKey>,
}

/// Dedup directories laid out as `<root>/<package>/<key>/<apk files>`
#[derive(Debug)]
pub struct DedupStore<F: FsAccessor> {
	fs: F,
	root: PathBuf,
	config: DedupConfig,
	locks: PackageLocks,
}

impl<F: FsAccessor> DedupStore<F> {
	pub fn new(fs: F, root: impl Into<PathBuf>, config: DedupConfig) -> Self {
		Self {
			fs,
			root: root.into(),
			config,
			locks: PackageLocks::new(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn config(&self) -> &DedupConfig {
		&self.config
	}

	pub fn package_dir(&self, package: &str) -> Result<PathBuf, DedupError> {
		check_package_name(package)?;
		Ok(self.root.join(package))
	}

	pub fn dedup_dir(&self, package: &str, key: &DedupKey) -> Result<PathBuf, DedupError> {
		Ok(self.package_dir(package)?.join(key.as_str()))
	}

	pub fn compute_key(&self, apk_set: &ApkSet) -> DedupKey {
		compute_key(&self.fs, apk_set, &self.config)
	}

	/// Makes sure the dedup directory for `apk_set` holds its APKs, copying them only when
	/// no matching directory exists yet.
	///
	/// The returned key is what callers persist as [`BackupRecord::apk_location`].
	pub fn store_apks(&self, package: &str, apk_set: &ApkSet) -> Result<StoredApks, DedupError> {
		if apk_set.file_paths.is_empty() {
			return Err(DedupError::NoApks);
		}

		// Every APK lands in the dedup directory under its own file name
		if let Some(name) = duplicate_name(&apk_set.file_paths) {
			return Err(DedupError::DuplicateName(name));
		}

		let package_dir = self.package_dir(package)?;

		self.locks.with_package_lock(package, || {
			let key = self.compute_key(apk_set);
			let dir = package_dir.join(key.as_str());

			if verify_match(&self.fs, &dir, &apk_set.file_paths) {
				info!(%package, %key, "Reusing stored APKs");
				return Ok(StoredApks {
					key,
					dir,
					reused: true,
					bytes_copied: 0,
				});
			}

			// Leftovers of an interrupted copy
			if self.fs.exists(&dir) {
				warn!(%package, %key, "Replacing incomplete dedup directory");
				self.fs.remove_dir_all(&dir)?;
			}
			self.fs.create_dir_all(&dir)?;

			let bytes_copied = self.copy_apks(&dir, apk_set);

			let missing = missing_names(&self.fs, &dir, &apk_set.file_paths);
			if !missing.is_empty() {
				report_error(&self.fs.remove_dir_all(&dir));
				return Err(DedupError::Incomplete { key, missing });
			}

			info!(
				%package,
				%key,
				bytes_copied,
				backend = ?self.fs.backend_type(),
				"Stored APKs in new dedup directory"
			);

			Ok(StoredApks {
				key,
				dir,
				reused: false,
				bytes_copied,
			})
		})
	}

	fn copy_apks(&self, dir: &Path, apk_set: &ApkSet) -> u64 {
		apk_set
			.file_paths
			.iter()
			.filter_map(|source| {
				let name = source.file_name()?;
				match self.fs.copy_file(source, &dir.join(name)) {
					Ok(bytes) => Some(bytes),
					Err(e) => {
						warn!(source = %source.display(), "Failed to copy APK: {e}");
						None
					}
				}
			})
			.sum()
	}

	/// Every dedup directory currently stored for `package`
	pub fn dedup_keys(&self, package: &str) -> Result<Vec<DedupKey>, DedupError> {
		let package_dir = self.package_dir(package)?;

		let entries = match self.fs.read_dir(&package_dir) {
			Ok(entries) => entries,
			Err(FsError::NotFound(_)) => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};

		let mut keys = entries
			.into_iter()
			.filter(|entry| entry.kind == EntryKind::Directory)
			.map(|entry| DedupKey::new(entry.name))
			.collect::<Vec<_>>();
		keys.sort();

		Ok(keys)
	}

	/// Dedup directories of `package` that no record points at anymore
	pub fn unreferenced(
		&self,
		package: &str,
		records: &[BackupRecord],
	) -> Result<Vec<DedupKey>, DedupError> {
		let package_records = records
			.iter()
			.filter(|record| record.package_name == package)
			.cloned()
			.collect::<Vec<_>>();

		Ok(self
			.dedup_keys(package)?
			.into_iter()
			.filter(|key| count_references(&package_records, key.as_str()) == 0)
			.collect())
	}

	/// Deletes every unreferenced dedup directory of `package`.
	///
	/// Must not run while a backup of the same package is between [`store_apks`] and
	/// persisting its record, or the fresh directory looks unreferenced.
	///
	/// [`store_apks`]: Self::store_apks
	pub fn prune_unreferenced(
		&self,
		package: &str,
		records: &[BackupRecord],
	) -> Result<PruneReport, DedupError> {
		let package_dir = self.package_dir(package)?;

		self.locks.with_package_lock(package, || {
			let mut report = PruneReport::default();

			for key in self.unreferenced(package, records)? {
				match self.fs.remove_dir_all(&package_dir.join(key.as_str())) {
					Ok(()) => {
						info!(%package, %key, "Removed unreferenced dedup directory");
						report.removed.push(key);
					}
					Err(e) => {
						warn!(%package, %key, "Failed to remove dedup directory: {e}");
						report.failed.push(key);
					}
				}
			}

			Ok(report)
		})
	}
}

fn duplicate_name(file_paths: &[PathBuf]) -> Option<String> {
	let mut seen = HashSet::new();
	file_paths
		.iter()
		.filter_map(|path| path.file_name())
		.find(|name| !seen.insert(*name))
		.map(|name| name.to_string_lossy().to_string())
}

fn missing_names<F: FsAccessor + ?Sized>(fs: &F, dir: &Path, file_paths: &[PathBuf]) -> Vec<String> {
	let present = fs
		.read_dir(dir)
		.map(|entries| {
			entries
				.into_iter()
				.filter(|entry| entry.kind == EntryKind::File)
				.map(|entry| entry.name)
				.collect::<HashSet<_>>()
		})
		.unwrap_or_default();

	file_paths
		.iter()
		.map(|path| {
			path.file_name().map_or_else(
				|| path.display().to_string(),
				|name| name.to_string_lossy().to_string(),
			)
		})
		.filter(|name| !present.contains(name))
		.collect()
}

fn check_package_name(package: &str) -> Result<(), DedupError> {
	let mut components = Path::new(package).components();

	match (components.next(), components.next()) {
		(Some(Component::Normal(_)), None) => Ok(()),
		_ => Err(DedupError::InvalidPackage(package.to_string())),
	}
}
