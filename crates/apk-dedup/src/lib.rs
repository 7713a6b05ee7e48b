//!
//! # APK Deduplication
//!
//! Most backups of an app store the exact same APK files as the previous one. Instead of
//! copying them again, every backup points at a shared *dedup directory* named after a key
//! derived from the APK set:
//! - [`DedupStrategy::Metadata`]: version code, file count and total size. Fast; collisions are
//!   accepted as negligible because APKs are compressed archives whose length shifts with
//!   almost any content change;
//! - [`DedupStrategy::ContentHash`]: a blake3 digest over each file's length and leading bytes,
//!   combined with the sanitized version name and version code.
//!
//! Key computation never fails. Files that can't be read are skipped, and when nothing at
//! all could be read a fallback key derived from the path strings is produced instead.
//!
//! [`DedupStore`] creates and reuses dedup directories, serializing all work for one package
//! through [`PackageLocks`] while different packages proceed in parallel.

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
mod key;
mod lock;
mod records;
mod sanitize;
mod store;
mod verify;

pub use error::DedupError;
pub use key::{compute_key, ApkSet, DedupConfig, DedupKey, DedupStrategy};
pub use lock::PackageLocks;
pub use records::{count_references, BackupRecord};
pub use sanitize::sanitize;
pub use store::{DedupStore, PruneReport, StoredApks};
pub use verify::verify_match;
