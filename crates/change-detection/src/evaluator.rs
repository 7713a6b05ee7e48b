use std::{path::PathBuf, time::SystemTime};

use av_fs_access::FsAccessor;
use tracing::{debug, info};

use super::{ChangeDetector, DataCategory, HotPathCache, ScanOptions, ScanRequest};

/// Every data directory of one package, in the order they should be checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDataDirs {
	pub package: String,
	pub dirs: Vec<(DataCategory, PathBuf)>,
}

impl PackageDataDirs {
	pub fn new(package: impl Into<String>) -> Self {
		Self {
			package: package.into(),
			dirs: Vec::new(),
		}
	}

	#[must_use]
	pub fn with(mut self, category: DataCategory, dir: impl Into<PathBuf>) -> Self {
		self.dirs.push((category, dir.into()));
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupDecision {
	pub needs_backup: bool,
	pub is_new_package: bool,
	/// First category found changed, `None` for new packages and unchanged ones
	pub changed_category: Option<DataCategory>,
}

/// Decides whether a package needs a new backup
pub struct ChangeEvaluator<'a, F: FsAccessor + ?Sized> {
	fs: &'a F,
	cache: &'a HotPathCache,
	options: ScanOptions,
}

impl<'a, F: FsAccessor + ?Sized> ChangeEvaluator<'a, F> {
	pub fn new(fs: &'a F, cache: &'a HotPathCache, options: ScanOptions) -> Self {
		Self { fs, cache, options }
	}

	/// `last_backup` is `None` for packages that were never backed up
	pub fn evaluate(
		&self,
		package_dirs: &PackageDataDirs,
		last_backup: Option<SystemTime>,
	) -> BackupDecision {
		let Some(last_backup) = last_backup else {
			info!(package = %package_dirs.package, "New package, backup needed");
			return BackupDecision {
				needs_backup: true,
				is_new_package: true,
				changed_category: None,
			};
		};

		let changed_category = self.has_data_changed_since(package_dirs, last_backup);

		BackupDecision {
			needs_backup: changed_category.is_some(),
			is_new_package: false,
			changed_category,
		}
	}

	/// Scans each category until one shows a change, starting with the category that
	/// changed most recently for this package.
	pub fn has_data_changed_since(
		&self,
		package_dirs: &PackageDataDirs,
		last_backup: SystemTime,
	) -> Option<DataCategory> {
		let package = package_dirs.package.as_str();
		let detector = ChangeDetector::new(self.fs);

		let preferred = self
			.options
			.use_hot_path
			.then(|| self.cache.last_changed_category(package))
			.flatten();

		let ordered = package_dirs
			.dirs
			.iter()
			.filter(|(category, _)| Some(*category) == preferred)
			.chain(
				package_dirs
					.dirs
					.iter()
					.filter(|(category, _)| Some(*category) != preferred),
			);

		for (category, dir) in ordered {
			let hint = self
				.options
				.use_hot_path
				.then(|| self.cache.get(package, *category))
				.flatten();

			let request = ScanRequest::new(dir, last_backup)
				.with_max_depth(self.options.max_depth)
				.with_optional_hot_path(hint);

			if let Some(found_path) = detector.scan(&request).found_path() {
				if self.options.use_hot_path {
					self.cache.record_change(package, *category, found_path);
				}

				info!(
					%package,
					%category,
					found_path = %found_path.display(),
					"Data changed since last backup"
				);
				return Some(*category);
			}
		}

		debug!(%package, "No data changes since last backup");

		None
	}
}
