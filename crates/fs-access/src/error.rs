use std::{io, path::Path};

use av_utils::error::FileIOError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
	#[error("path not found: '{}'", .0.display())]
	NotFound(Box<Path>),
	#[error("not a directory: '{}'", .0.display())]
	NotADirectory(Box<Path>),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
}

impl FsError {
	pub fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
		if source.kind() == io::ErrorKind::NotFound {
			Self::NotFound(path.as_ref().into())
		} else {
			Self::FileIO(FileIOError::from_std_io_err(path, source))
		}
	}

	pub fn from_io_with_msg(path: impl AsRef<Path>, source: io::Error, msg: impl Into<String>) -> Self {
		if source.kind() == io::ErrorKind::NotFound {
			Self::NotFound(path.as_ref().into())
		} else {
			Self::FileIO(FileIOError::from_std_io_err_with_msg(path, source, msg))
		}
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}
}
