use av_fs_access::FsError;
use thiserror::Error;

use super::DedupKey;

#[derive(Debug, Error)]
pub enum DedupError {
	#[error("no APK files given")]
	NoApks,
	#[error("more than one APK named '{0}'")]
	DuplicateName(String),
	#[error("invalid package name: '{0}'")]
	InvalidPackage(String),
	#[error("dedup directory <key='{key}'> is missing files after copy: {missing:?}")]
	Incomplete { key: DedupKey, missing: Vec<String> },

	#[error(transparent)]
	Fs(#[from] FsError),
}
