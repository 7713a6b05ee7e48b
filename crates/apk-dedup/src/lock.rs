use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

/// Mutual exclusion per package name.
///
/// Work for the same package runs one at a time; work for different packages never waits
/// on each other beyond the brief lookup of the package's mutex.
#[derive(Debug, Default)]
pub struct PackageLocks {
	locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PackageLocks {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_package_lock<R>(&self, package: &str, f: impl FnOnce() -> R) -> R {
		let lock = Arc::clone(self.locks.lock().entry(package.to_string()).or_default());

		let _guard = lock.lock();
		f()
	}

	/// Number of packages that ever took a lock
	pub fn tracked_packages(&self) -> usize {
		self.locks.lock().len()
	}
}
