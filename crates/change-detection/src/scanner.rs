use std::{
	collections::VecDeque,
	path::{Component, Path, PathBuf},
	time::SystemTime,
};

use av_fs_access::{EntryKind, FsAccessor};
use av_utils::time::system_time_to_millis;
use tracing::{debug, trace};

use super::{ScanRequest, ScanResult};

/// Which phase produced a scan's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
	HotPath,
	FullScan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
	pub nodes_visited: u64,
	pub dirs_listed: u64,
	pub listing_failures: u64,
	/// `None` when nothing changed
	pub found_in: Option<ScanPhase>,
}

/// Runs change detection scans against a filesystem accessor
#[derive(Debug)]
pub struct ChangeDetector<'a, F: FsAccessor + ?Sized> {
	fs: &'a F,
}

/// Shorthand for [`ChangeDetector::scan`]
pub fn scan<F: FsAccessor + ?Sized>(fs: &F, request: &ScanRequest) -> ScanResult {
	ChangeDetector::new(fs).scan(request)
}

struct Pending {
	relative: PathBuf,
	depth: u32,
	kind: EntryKind,
	modified: Option<SystemTime>,
}

impl<'a, F: FsAccessor + ?Sized> ChangeDetector<'a, F> {
	pub fn new(fs: &'a F) -> Self {
		Self { fs }
	}

	pub fn scan(&self, request: &ScanRequest) -> ScanResult {
		self.scan_with_stats(request).0
	}

	pub fn scan_with_stats(&self, request: &ScanRequest) -> (ScanResult, ScanStats) {
		let mut stats = ScanStats::default();

		// The root may be reached through a link, nothing below it is
		let root_metadata = match self.fs.metadata_follow(&request.root) {
			Ok(metadata) if metadata.is_dir() => metadata,
			Ok(_) => {
				debug!(root = %request.root.display(), "Scan root is not a directory");
				return (ScanResult::Unchanged, stats);
			}
			Err(e) => {
				debug!(root = %request.root.display(), "Scan root unavailable: {e}");
				return (ScanResult::Unchanged, stats);
			}
		};

		if let Some(result) = self.check_hot_path(request, &mut stats) {
			stats.found_in = Some(ScanPhase::HotPath);
			log_outcome(request, &result, &stats);
			return (result, stats);
		}

		let result = self.full_scan(request, root_metadata.modified, &mut stats);
		if result.has_changes() {
			stats.found_in = Some(ScanPhase::FullScan);
		}
		log_outcome(request, &result, &stats);

		(result, stats)
	}

	fn check_hot_path(&self, request: &ScanRequest, stats: &mut ScanStats) -> Option<ScanResult> {
		let hint = request.hot_path_hint.as_deref()?;
		if hint.as_os_str().is_empty() {
			return None;
		}

		let Some(hint_depth) = relative_depth(hint) else {
			debug!(hint = %hint.display(), "Ignoring hot path that escapes the scan root");
			return None;
		};

		// The full scan never looks past max_depth, neither does the hot path
		if hint_depth > request.max_depth {
			trace!(hint = %hint.display(), "Hot path deeper than max depth");
			return None;
		}

		let (resolved, metadata) = if hint_depth == 0 {
			(request.root.clone(), self.fs.metadata_follow(&request.root))
		} else {
			let resolved = request.root.join(hint);
			let metadata = self.fs.metadata(&resolved);
			(resolved, metadata)
		};

		let metadata = match metadata {
			Ok(metadata) if metadata.is_dir() => metadata,
			_ => {
				trace!(path = %resolved.display(), "Hot path is gone, falling back to full scan");
				return None;
			}
		};
		stats.nodes_visited += 1;

		if let Some(modified) = metadata.modified.filter(|m| *m > request.threshold) {
			return Some(ScanResult::Changed {
				found_path: hint.to_path_buf(),
				found_at: modified,
			});
		}

		if hint_depth == request.max_depth {
			return None;
		}

		let children = match self.fs.read_dir(&resolved) {
			Ok(children) => children,
			Err(e) => {
				stats.listing_failures += 1;
				trace!(path = %resolved.display(), "Failed to list hot path: {e}");
				return None;
			}
		};
		stats.dirs_listed += 1;

		children.into_iter().find_map(|child| {
			stats.nodes_visited += 1;
			child
				.modified
				.filter(|m| *m > request.threshold)
				.map(|found_at| ScanResult::Changed {
					// Report the hot directory itself so it stays cheap to re-check
					found_path: hint.to_path_buf(),
					found_at,
				})
		})
	}

	fn full_scan(
		&self,
		request: &ScanRequest,
		root_modified: Option<SystemTime>,
		stats: &mut ScanStats,
	) -> ScanResult {
		let mut queue = VecDeque::from([Pending {
			relative: PathBuf::new(),
			depth: 0,
			kind: EntryKind::Directory,
			modified: root_modified,
		}]);

		while let Some(node) = queue.pop_front() {
			stats.nodes_visited += 1;

			if let Some(found_at) = node.modified.filter(|m| *m > request.threshold) {
				return ScanResult::Changed {
					found_path: parent_of(&node.relative),
					found_at,
				};
			}

			if node.kind != EntryKind::Directory || node.depth >= request.max_depth {
				continue;
			}

			let absolute = if node.relative.as_os_str().is_empty() {
				request.root.clone()
			} else {
				request.root.join(&node.relative)
			};

			match self.fs.read_dir(&absolute) {
				Ok(children) => {
					stats.dirs_listed += 1;
					queue.extend(children.into_iter().map(|child| Pending {
						relative: node.relative.join(&child.name),
						depth: node.depth + 1,
						kind: child.kind,
						modified: child.modified,
					}));
				}
				Err(e) => {
					stats.listing_failures += 1;
					trace!(path = %absolute.display(), "Skipping unreadable directory: {e}");
				}
			}
		}

		ScanResult::Unchanged
	}
}

/// Number of normal components in a relative path, `None` if it is absolute or climbs out
/// through `..`
fn relative_depth(path: &Path) -> Option<u32> {
	let mut depth = 0u32;
	for component in path.components() {
		match component {
			Component::Normal(_) => depth = depth.saturating_add(1),
			Component::CurDir => {}
			Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
		}
	}

	Some(depth)
}

fn parent_of(relative: &Path) -> PathBuf {
	match relative.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => PathBuf::from("."),
	}
}

fn log_outcome(request: &ScanRequest, result: &ScanResult, stats: &ScanStats) {
	match result {
		ScanResult::Changed {
			found_path,
			found_at,
		} => debug!(
			root = %request.root.display(),
			found_path = %found_path.display(),
			found_at_ms = system_time_to_millis(*found_at),
			phase = ?stats.found_in,
			nodes_visited = stats.nodes_visited,
			"Change detected"
		),
		ScanResult::Unchanged => debug!(
			root = %request.root.display(),
			threshold_ms = system_time_to_millis(request.threshold),
			nodes_visited = stats.nodes_visited,
			dirs_listed = stats.dirs_listed,
			listing_failures = stats.listing_failures,
			"No changes since threshold"
		),
	}
}
