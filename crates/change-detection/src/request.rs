use std::{
	path::{Path, PathBuf},
	time::SystemTime,
};

use serde::{Deserialize, Serialize};

/// A single "did anything change under `root` after `threshold`?" question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
	pub root: PathBuf,
	/// Only modification times strictly greater than this count as changes
	pub threshold: SystemTime,
	/// How deep the full scan descends, `0` means the root alone
	pub max_depth: u32,
	/// Relative path checked before the full scan, `"."` addresses the root itself
	pub hot_path_hint: Option<PathBuf>,
}

impl ScanRequest {
	pub fn new(root: impl Into<PathBuf>, threshold: SystemTime) -> Self {
		Self {
			root: root.into(),
			threshold,
			max_depth: ScanOptions::DEFAULT_MAX_DEPTH,
			hot_path_hint: None,
		}
	}

	#[must_use]
	pub fn with_max_depth(mut self, max_depth: u32) -> Self {
		self.max_depth = max_depth;
		self
	}

	#[must_use]
	pub fn with_hot_path(mut self, hint: impl Into<PathBuf>) -> Self {
		self.hot_path_hint = Some(hint.into());
		self
	}

	#[must_use]
	pub fn with_optional_hot_path(mut self, hint: Option<PathBuf>) -> Self {
		self.hot_path_hint = hint;
		self
	}
}

/// Outcome of a scan.
///
/// A found path and timestamp exist exactly when a change was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
	Unchanged,
	Changed {
		/// Relative path of the directory holding the change, `"."` for the root
		found_path: PathBuf,
		/// Modification time of the node that tripped the threshold
		found_at: SystemTime,
	},
}

impl ScanResult {
	pub fn has_changes(&self) -> bool {
		matches!(self, Self::Changed { .. })
	}

	pub fn found_path(&self) -> Option<&Path> {
		match self {
			Self::Changed { found_path, .. } => Some(found_path),
			Self::Unchanged => None,
		}
	}

	pub fn found_at(&self) -> Option<SystemTime> {
		match self {
			Self::Changed { found_at, .. } => Some(*found_at),
			Self::Unchanged => None,
		}
	}
}

/// Scan tuning shared by every category of every package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
	pub max_depth: u32,
	/// Consult and update the hot path cache
	pub use_hot_path: bool,
}

impl ScanOptions {
	pub const DEFAULT_MAX_DEPTH: u32 = 10;
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			max_depth: Self::DEFAULT_MAX_DEPTH,
			use_hot_path: true,
		}
	}
}
