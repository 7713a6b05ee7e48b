use std::{
	fs,
	path::Path,
	time::{Duration, SystemTime},
};

use av_fs_access::{EntryKind, FsAccessor, LocalAccessor};
use filetime::{set_file_mtime, FileTime};
use tempfile::tempdir;

#[test]
fn reports_pinned_mtimes_for_files_and_directories() {
	let temp = tempdir().unwrap();
	let dir = temp.path().join("files");
	let file = dir.join("prefs.xml");
	fs::create_dir(&dir).unwrap();
	fs::write(&file, b"<map/>").unwrap();

	set_file_mtime(&file, FileTime::from_unix_time(500, 0)).unwrap();
	set_file_mtime(&dir, FileTime::from_unix_time(100, 0)).unwrap();

	let accessor = LocalAccessor::default();

	let dir_meta = accessor.metadata(&dir).unwrap();
	assert_eq!(dir_meta.kind, EntryKind::Directory);
	assert_eq!(
		dir_meta.modified,
		Some(SystemTime::UNIX_EPOCH + Duration::from_secs(100))
	);

	let listing = accessor.read_dir(&dir).unwrap();
	assert_eq!(listing.len(), 1);
	assert_eq!(listing[0].name, "prefs.xml");
	assert_eq!(
		listing[0].modified,
		Some(SystemTime::UNIX_EPOCH + Duration::from_secs(500))
	);
}

#[cfg(unix)]
#[test]
fn symlinks_are_reported_without_following() {
	let temp = tempdir().unwrap();
	fs::create_dir(temp.path().join("real")).unwrap();
	std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

	let accessor = LocalAccessor::new(temp.path());

	let link = accessor.metadata(Path::new("link")).unwrap();
	assert_eq!(link.kind, EntryKind::Symlink);
	assert!(!accessor.is_dir(Path::new("link")));
}

#[cfg(unix)]
#[test]
fn followed_symlink_reports_target_directory() {
	let temp = tempdir().unwrap();
	let real = temp.path().join("real");
	fs::create_dir(&real).unwrap();
	set_file_mtime(&real, FileTime::from_unix_time(100, 0)).unwrap();
	std::os::unix::fs::symlink(&real, temp.path().join("link")).unwrap();

	let accessor = LocalAccessor::new(temp.path());

	let followed = accessor.metadata_follow(Path::new("link")).unwrap();
	assert_eq!(followed.kind, EntryKind::Directory);
	assert_eq!(
		followed.modified,
		Some(SystemTime::UNIX_EPOCH + Duration::from_secs(100))
	);
	assert!(accessor.resolves_to_dir(Path::new("link")));
	assert!(!accessor.is_dir(Path::new("link")));

	// Children of a followed directory stay unresolved
	std::os::unix::fs::symlink(&real, real.join("loop")).unwrap();
	let listing = accessor.read_dir(Path::new("link")).unwrap();
	assert_eq!(listing.len(), 1);
	assert_eq!(listing[0].kind, EntryKind::Symlink);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_not_found_when_followed() {
	let temp = tempdir().unwrap();
	std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("link")).unwrap();

	let accessor = LocalAccessor::new(temp.path());

	assert!(accessor.metadata(Path::new("link")).is_ok());
	assert!(accessor
		.metadata_follow(Path::new("link"))
		.unwrap_err()
		.is_not_found());
}
