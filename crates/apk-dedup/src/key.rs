use std::{
	fmt::{self, Display},
	path::PathBuf,
};

use av_fs_access::FsAccessor;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::sanitize;

/// Identifier of an APK payload, also the name of its dedup directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
	const FALLBACK_MARKER: &'static str = "fallback-";

	pub fn new(key: impl Into<String>) -> Self {
		Self(key.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Whether this key came from path strings instead of file contents
	pub fn is_fallback(&self) -> bool {
		self.0
			.rsplit_once('_')
			.is_some_and(|(_, last)| last.starts_with(Self::FALLBACK_MARKER))
	}
}

impl Display for DedupKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for DedupKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
	/// `{version_code}_{file_count}_{total_bytes}`
	Metadata,
	/// `{version_name}_{version_code}_{digest suffix}`
	#[default]
	ContentHash,
}

/// How dedup keys are derived and where dedup directories live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
	pub strategy: DedupStrategy,
	/// Leading bytes of each APK fed to the digest
	pub hash_prefix_bytes: u64,
	/// Hex characters kept from the end of the digest, clamped to `1..=64`
	pub digest_suffix_len: usize,
	/// Directory name of the dedup store, relative to the data directory
	pub store_dir: String,
}

impl Default for DedupConfig {
	fn default() -> Self {
		Self {
			strategy: DedupStrategy::default(),
			hash_prefix_bytes: 1024 * 1024, // 1 MiB
			digest_suffix_len: 16,
			store_dir: "apks".to_string(),
		}
	}
}

/// The APK files of one installed app version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApkSet {
	pub version_name: Option<String>,
	pub version_code: i64,
	/// Base APK first, then splits, in the order the package manager reports them
	pub file_paths: Vec<PathBuf>,
}

impl ApkSet {
	pub fn new(version_code: i64, file_paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
		Self {
			version_name: None,
			version_code,
			file_paths: file_paths.into_iter().map(Into::into).collect(),
		}
	}

	#[must_use]
	pub fn with_version_name(mut self, version_name: impl Into<String>) -> Self {
		self.version_name = Some(version_name.into());
		self
	}

	fn sanitized_version_name(&self) -> String {
		sanitize(self.version_name.as_deref().unwrap_or_default())
	}
}

/// Computes the dedup key of an APK set. Never fails, see the crate docs.
pub fn compute_key<F: FsAccessor + ?Sized>(
	fs: &F,
	apk_set: &ApkSet,
	config: &DedupConfig,
) -> DedupKey {
	let key = match config.strategy {
		DedupStrategy::Metadata => metadata_key(fs, apk_set),
		DedupStrategy::ContentHash => content_hash_key(fs, apk_set, config),
	};

	let key = key.unwrap_or_else(|| {
		let key = fallback_key(apk_set);
		warn!(
			%key,
			files = apk_set.file_paths.len(),
			"No APK could be read, using fallback dedup key"
		);
		key
	});

	debug!(%key, strategy = ?config.strategy, "Computed dedup key");

	key
}

fn metadata_key<F: FsAccessor + ?Sized>(fs: &F, apk_set: &ApkSet) -> Option<DedupKey> {
	let mut count = 0u64;
	let mut total_size = 0u64;

	for path in &apk_set.file_paths {
		match fs.metadata(path) {
			Ok(metadata) if !metadata.is_dir() => {
				count += 1;
				total_size += metadata.size;
			}
			Ok(_) => warn!(path = %path.display(), "Skipping directory given as APK"),
			Err(e) => warn!(path = %path.display(), "Skipping unreadable APK: {e}"),
		}
	}

	(count > 0).then(|| DedupKey(format!("{}_{count}_{total_size}", apk_set.version_code)))
}

fn content_hash_key<F: FsAccessor + ?Sized>(
	fs: &F,
	apk_set: &ApkSet,
	config: &DedupConfig,
) -> Option<DedupKey> {
	let mut hasher = blake3::Hasher::new();
	let mut hashed = 0usize;

	for path in &apk_set.file_paths {
		let size = match fs.metadata(path) {
			Ok(metadata) if !metadata.is_dir() => metadata.size,
			Ok(_) => {
				warn!(path = %path.display(), "Skipping directory given as APK");
				continue;
			}
			Err(e) => {
				warn!(path = %path.display(), "Skipping APK that can't be sized: {e}");
				continue;
			}
		};

		let prefix = match fs.read_prefix(path, config.hash_prefix_bytes) {
			Ok(prefix) => prefix,
			Err(e) => {
				warn!(path = %path.display(), "Skipping APK that can't be read: {e}");
				continue;
			}
		};

		// Size first so files sharing a prefix but differing in length never collide
		hasher.update(&size.to_le_bytes());
		hasher.update(&prefix);
		hashed += 1;
	}

	if hashed == 0 {
		return None;
	}

	let digest = hasher.finalize().to_hex();
	let suffix_len = config.digest_suffix_len.clamp(1, digest.len());

	Some(DedupKey(format!(
		"{}_{}_{}",
		apk_set.sanitized_version_name(),
		apk_set.version_code,
		&digest[digest.len() - suffix_len..]
	)))
}

fn fallback_key(apk_set: &ApkSet) -> DedupKey {
	let joined = apk_set
		.file_paths
		.iter()
		.map(|path| path.to_string_lossy())
		.collect::<Vec<_>>()
		.join("\n");

	let digest = blake3::hash(joined.as_bytes()).to_hex();

	DedupKey(format!(
		"{}_{}_{}{}",
		apk_set.sanitized_version_name(),
		apk_set.version_code,
		DedupKey::FALLBACK_MARKER,
		&digest[..16]
	))
}
