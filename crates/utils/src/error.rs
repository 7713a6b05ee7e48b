//! Errors shared by the scanning and deduplication crates.
//!
//! Storage failures always carry the path that failed, so a skipped directory or an APK that
//! could not be copied can be traced back from the logs.

use std::{fmt::Display, path::Path};

use thiserror::Error;
use tracing::error;

/// Logs the error of a best-effort step whose outcome the caller can't act on, such as
/// cleaning up a half-written dedup directory.
pub fn report_error<T>(res: &Result<T, impl Display>) {
	if let Err(e) = res {
		error!("{e:#}");
	}
}

/// An [`std::io::Error`] tied to the scanned, hashed or copied path that produced it
#[derive(Error, Debug)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: std::io::Error,
	/// What was being done when it failed, e.g. "reading file prefix"
	pub maybe_context: Option<String>,
}

impl Display for FileIOError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.maybe_context {
			Some(context) => write!(
				f,
				"storage access failed while {context} at '{}': {}",
				self.path.display(),
				self.source
			),
			None => write!(
				f,
				"storage access failed at '{}': {}",
				self.path.display(),
				self.source
			),
		}
	}
}

impl FileIOError {
	pub fn from_std_io_err(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}

	pub fn from_std_io_err_with_msg(
		path: impl AsRef<Path>,
		source: std::io::Error,
		msg: impl Into<String>,
	) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(msg.into()),
		}
	}

	/// Lets callers tell a permission problem from a vanished file
	pub fn kind(&self) -> std::io::ErrorKind {
		self.source.kind()
	}
}
