//!
//! # Change Detection
//!
//! Answers "has anything under this directory changed since `T`?" as cheaply as possible.
//!
//! A scan runs in two phases:
//! - **Hot path**: a relative path cached from a previous scan is checked first. The
//!   directory's own mtime and then the mtimes of its immediate children are compared to the
//!   threshold; apps tend to keep touching the same places, so this usually answers in a
//!   single listing;
//! - **Full scan**: a breadth-first walk bounded by `max_depth` that stops at the first node
//!   newer than the threshold.
//!
//! A change is always reported against the *parent* of the node that changed, so the next
//! hot path check only has to list one shallow directory.
//!
//! No filesystem failure ever escapes a scan. Unreadable nodes count as "no signal", so the
//! worst case is a missed change, never a blocked backup.
//!
//! ## Basic example
//!
//! ```
//! use std::time::{Duration, SystemTime};
//!
//! use av_change_detection::{scan, ScanRequest};
//! use av_fs_access::MemoryFs;
//!
//! let at = |secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
//!
//! let fs = MemoryFs::new();
//! fs.add_dir("/r", at(0))
//!     .add_dir("/r/a", at(100))
//!     .add_file("/r/a/f", "data", at(500));
//!
//! let result = scan(&fs, &ScanRequest::new("/r", at(200)).with_max_depth(2));
//!
//! assert!(result.has_changes());
//! assert_eq!(result.found_path().unwrap().to_str(), Some("a"));
//! assert_eq!(result.found_at(), Some(at(500)));
//! ```

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

mod category;
mod evaluator;
mod hot_path;
mod request;
mod scanner;

pub use category::DataCategory;
pub use evaluator::{BackupDecision, ChangeEvaluator, PackageDataDirs};
pub use hot_path::{HotPathCache, HotPathEntry, HotPathSnapshot};
pub use request::{ScanOptions, ScanRequest, ScanResult};
pub use scanner::{scan, ChangeDetector, ScanPhase, ScanStats};
