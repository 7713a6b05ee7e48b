use av_utils::error::FileIOError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("could not determine a data directory for this platform")]
	NoDataDir,
	#[error("unknown config version: {0}")]
	UnknownVersion(u32),
	#[error("malformed config: {0}")]
	Parse(#[from] serde_json::Error),

	#[error(transparent)]
	FileIO(#[from] FileIOError),
}
