use std::{collections::HashSet, path::Path};

use av_fs_access::{EntryKind, FsAccessor};
use tracing::trace;

/// Cheap sanity check that `candidate_dir` holds a file named like each of `file_paths`.
///
/// Only names are compared, never contents. Any listing failure means no match.
pub fn verify_match<F: FsAccessor + ?Sized>(
	fs: &F,
	candidate_dir: &Path,
	file_paths: &[impl AsRef<Path>],
) -> bool {
	if !fs.resolves_to_dir(candidate_dir) {
		return false;
	}

	let names = match fs.read_dir(candidate_dir) {
		Ok(entries) => entries
			.into_iter()
			.filter(|entry| entry.kind == EntryKind::File)
			.map(|entry| entry.name)
			.collect::<HashSet<_>>(),
		Err(e) => {
			trace!(dir = %candidate_dir.display(), "Can't list dedup candidate: {e}");
			return false;
		}
	};

	file_paths.iter().all(|path| {
		path.as_ref()
			.file_name()
			.is_some_and(|name| names.contains(name.to_string_lossy().as_ref()))
	})
}
