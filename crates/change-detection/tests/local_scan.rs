use std::{
	fs,
	path::Path,
	time::{Duration, SystemTime},
};

use av_change_detection::{ChangeDetector, ScanPhase, ScanRequest};
use av_fs_access::LocalAccessor;
use filetime::{set_file_mtime, FileTime};
use tempfile::{tempdir, TempDir};

fn at(secs: u64) -> SystemTime {
	SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

fn pin(path: &Path, secs: i64) {
	set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
}

/// Builds `files/notes.txt`, `databases/main.db` with every mtime pinned to 100
fn old_app_dir() -> TempDir {
	let temp = tempdir().unwrap();
	let root = temp.path();

	fs::create_dir_all(root.join("files")).unwrap();
	fs::create_dir_all(root.join("databases")).unwrap();
	fs::write(root.join("files/notes.txt"), b"hello").unwrap();
	fs::write(root.join("databases/main.db"), b"sqlite").unwrap();

	// Children first, creating them bumped their parents
	for rel in ["files/notes.txt", "databases/main.db", "files", "databases", ""] {
		pin(&root.join(rel), 100);
	}

	temp
}

#[test]
fn pinned_file_mtime_is_found_by_full_scan() {
	let temp = old_app_dir();
	pin(&temp.path().join("files/notes.txt"), 500);

	let accessor = LocalAccessor::default();
	let (result, stats) = ChangeDetector::new(&accessor)
		.scan_with_stats(&ScanRequest::new(temp.path(), at(200)).with_max_depth(2));

	assert_eq!(result.found_path(), Some(Path::new("files")));
	assert_eq!(result.found_at(), Some(at(500)));
	assert_eq!(stats.found_in, Some(ScanPhase::FullScan));
}

#[test]
fn untouched_tree_reports_no_changes() {
	let temp = old_app_dir();

	let accessor = LocalAccessor::default();
	let result = ChangeDetector::new(&accessor)
		.scan(&ScanRequest::new(temp.path(), at(200)).with_max_depth(5));

	assert!(!result.has_changes());
}

#[test]
fn new_file_bumps_directory_for_hot_path() {
	let temp = old_app_dir();
	fs::write(temp.path().join("databases/main.db-journal"), b"wal").unwrap();

	let accessor = LocalAccessor::default();
	let (result, stats) = ChangeDetector::new(&accessor).scan_with_stats(
		&ScanRequest::new(temp.path(), at(200))
			.with_max_depth(5)
			.with_hot_path("databases"),
	);

	assert_eq!(result.found_path(), Some(Path::new("databases")));
	assert_eq!(stats.found_in, Some(ScanPhase::HotPath));
}

#[test]
fn file_as_root_is_unchanged() {
	let temp = old_app_dir();
	pin(&temp.path().join("files/notes.txt"), 900);

	let accessor = LocalAccessor::default();
	let result = ChangeDetector::new(&accessor).scan(&ScanRequest::new(
		temp.path().join("files/notes.txt"),
		at(200),
	));

	assert!(!result.has_changes());
}

#[cfg(unix)]
#[test]
fn symlinked_root_is_scanned_like_its_target() {
	let temp = tempdir().unwrap();
	let real = temp.path().join("real");
	fs::create_dir(&real).unwrap();
	fs::write(real.join("new.bin"), b"payload").unwrap();
	pin(&real.join("new.bin"), 500);
	pin(&real, 100);

	let link = temp.path().join("sdcard_pkg");
	std::os::unix::fs::symlink(&real, &link).unwrap();

	let fs = LocalAccessor::default();
	let detector = ChangeDetector::new(&fs);

	let direct = detector.scan(&ScanRequest::new(&real, at(200)).with_max_depth(2));
	let (through_link, stats) =
		detector.scan_with_stats(&ScanRequest::new(&link, at(200)).with_max_depth(2));

	assert_eq!(through_link, direct);
	assert_eq!(through_link.found_path(), Some(Path::new(".")));
	assert_eq!(through_link.found_at(), Some(at(500)));
	assert_eq!(stats.found_in, Some(ScanPhase::FullScan));

	// A hot path naming the root goes through the link as well
	let (hinted, stats) = detector.scan_with_stats(
		&ScanRequest::new(&link, at(200))
			.with_max_depth(2)
			.with_hot_path("."),
	);
	assert_eq!(hinted.found_at(), Some(at(500)));
	assert_eq!(stats.found_in, Some(ScanPhase::HotPath));
}

#[cfg(unix)]
#[test]
fn symlinks_below_the_root_are_not_followed() {
	let temp = old_app_dir();
	let root = temp.path();

	let outside = tempdir().unwrap();
	fs::write(outside.path().join("fresh.txt"), b"new").unwrap();
	pin(&outside.path().join("fresh.txt"), 500);
	pin(outside.path(), 100);

	std::os::unix::fs::symlink(outside.path(), root.join("files/external")).unwrap();
	filetime::set_symlink_file_times(
		root.join("files/external"),
		FileTime::from_unix_time(100, 0),
		FileTime::from_unix_time(100, 0),
	)
	.unwrap();
	pin(&root.join("files"), 100);

	let fs = LocalAccessor::default();
	let result = ChangeDetector::new(&fs).scan(&ScanRequest::new(root, at(200)).with_max_depth(5));

	assert!(!result.has_changes());
}
