//! Cache of where each package's data last changed.
//!
//! Entries are filled in opportunistically after every scan that finds a change and are
//! never invalidated: a stale hint only costs one failed hot path check before the full scan
//! takes over. Every write overwrites a single independent entry, so concurrent scans for
//! different packages never need to coordinate beyond the map lock itself.

use std::{
	collections::{BTreeMap, HashMap},
	path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::DataCategory;

#[derive(Debug, Default)]
pub struct HotPathCache {
	paths: RwLock<HashMap<(String, DataCategory), PathBuf>>,
	last_changed: RwLock<HashMap<String, DataCategory>>,
}

/// Serializable copy of a [`HotPathCache`], sorted for stable output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotPathSnapshot {
	pub entries: Vec<HotPathEntry>,
	pub last_changed: BTreeMap<String, DataCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotPathEntry {
	pub package: String,
	pub category: DataCategory,
	pub path: PathBuf,
}

impl HotPathCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, package: &str, category: DataCategory) -> Option<PathBuf> {
		self.paths
			.read()
			.get(&(package.to_string(), category))
			.cloned()
	}

	pub fn put(&self, package: &str, category: DataCategory, path: impl AsRef<Path>) {
		self.paths
			.write()
			.insert((package.to_string(), category), path.as_ref().to_path_buf());
	}

	/// The category whose data changed most recently for this package
	pub fn last_changed_category(&self, package: &str) -> Option<DataCategory> {
		self.last_changed.read().get(package).copied()
	}

	/// Stores the hot path for `(package, category)` and marks `category` as the package's
	/// most recent change
	pub fn record_change(&self, package: &str, category: DataCategory, path: impl AsRef<Path>) {
		self.put(package, category, path);
		self.last_changed
			.write()
			.insert(package.to_string(), category);
	}

	/// Drops every entry of an uninstalled package
	pub fn forget_package(&self, package: &str) {
		self.paths.write().retain(|(owner, _), _| owner != package);
		self.last_changed.write().remove(package);
	}

	pub fn len(&self) -> usize {
		self.paths.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.read().is_empty()
	}

	pub fn snapshot(&self) -> HotPathSnapshot {
		let mut entries = self
			.paths
			.read()
			.iter()
			.map(|((package, category), path)| HotPathEntry {
				package: package.clone(),
				category: *category,
				path: path.clone(),
			})
			.collect::<Vec<_>>();
		entries.sort_by(|a, b| (&a.package, a.category).cmp(&(&b.package, b.category)));

		HotPathSnapshot {
			entries,
			last_changed: self
				.last_changed
				.read()
				.iter()
				.map(|(package, category)| (package.clone(), *category))
				.collect(),
		}
	}

	pub fn from_snapshot(snapshot: HotPathSnapshot) -> Self {
		Self {
			paths: RwLock::new(
				snapshot
					.entries
					.into_iter()
					.map(|entry| ((entry.package, entry.category), entry.path))
					.collect(),
			),
			last_changed: RwLock::new(snapshot.last_changed.into_iter().collect()),
		}
	}
}
