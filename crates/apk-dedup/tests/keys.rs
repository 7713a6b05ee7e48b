use std::{fs, path::PathBuf};

use av_apk_dedup::{compute_key, ApkSet, DedupConfig, DedupStrategy};
use av_fs_access::LocalAccessor;
use tempfile::{tempdir, TempDir};
use tracing_test::traced_test;

fn write_apks(files: &[(&str, &[u8])]) -> (TempDir, Vec<PathBuf>) {
	let temp = tempdir().unwrap();
	let paths = files
		.iter()
		.map(|(name, data)| {
			let path = temp.path().join(name);
			fs::write(&path, data).unwrap();
			path
		})
		.collect();
	(temp, paths)
}

fn metadata() -> DedupConfig {
	DedupConfig {
		strategy: DedupStrategy::Metadata,
		..DedupConfig::default()
	}
}

#[test]
fn metadata_scenario_on_disk() {
	let (_temp, paths) = write_apks(&[("x.apk", &[1u8; 1000])]);

	let key = compute_key(&LocalAccessor::default(), &ApkSet::new(5, paths), &metadata());

	assert_eq!(key.as_str(), "5_1_1000");
}

#[test]
fn keys_are_deterministic() {
	let (_temp, paths) = write_apks(&[("base.apk", b"PK base"), ("split.apk", b"PK split")]);
	let set = ApkSet::new(9, paths).with_version_name("9.0");
	let accessor = LocalAccessor::default();

	for config in [DedupConfig::default(), metadata()] {
		let first = compute_key(&accessor, &set, &config);
		for _ in 0..3 {
			assert_eq!(compute_key(&accessor, &set, &config), first);
		}
	}
}

#[test]
fn metadata_key_follows_size() {
	let (_temp, paths) = write_apks(&[("base.apk", b"0123456789")]);
	let set = ApkSet::new(3, paths.clone());
	let accessor = LocalAccessor::default();

	let before = compute_key(&accessor, &set, &metadata());
	fs::write(&paths[0], b"01234567890").unwrap();
	let after = compute_key(&accessor, &set, &metadata());

	assert_ne!(before, after);
	assert_eq!(after.as_str(), "3_1_11");
}

#[test]
fn content_key_follows_content_at_same_size() {
	let (_temp, paths) = write_apks(&[("base.apk", b"aaaaaaaaaa")]);
	let set = ApkSet::new(3, paths.clone());
	let accessor = LocalAccessor::default();

	let before = compute_key(&accessor, &set, &DedupConfig::default());
	let metadata_before = compute_key(&accessor, &set, &metadata());

	fs::write(&paths[0], b"aaaaabaaaa").unwrap();

	assert_ne!(compute_key(&accessor, &set, &DedupConfig::default()), before);
	// Same size, so the metadata strategy can't tell
	assert_eq!(compute_key(&accessor, &set, &metadata()), metadata_before);
}

#[test]
fn content_beyond_prefix_only_counts_through_length() {
	let (_temp, paths) = write_apks(&[("base.apk", &[0u8; 64])]);
	let set = ApkSet::new(1, paths.clone());
	let accessor = LocalAccessor::default();
	let config = DedupConfig {
		hash_prefix_bytes: 16,
		..DedupConfig::default()
	};

	let before = compute_key(&accessor, &set, &config);

	let mut changed_tail = vec![0u8; 64];
	changed_tail[40] = 1;
	fs::write(&paths[0], &changed_tail).unwrap();
	assert_eq!(compute_key(&accessor, &set, &config), before);

	fs::write(&paths[0], [0u8; 65]).unwrap();
	assert_ne!(compute_key(&accessor, &set, &config), before);
}

#[test]
fn file_order_matters_for_content_key() {
	let (_temp, paths) = write_apks(&[("a.apk", b"first"), ("b.apk", b"second")]);
	let accessor = LocalAccessor::default();

	let forward = compute_key(&accessor, &ApkSet::new(1, paths.clone()), &DedupConfig::default());
	let reversed = compute_key(
		&accessor,
		&ApkSet::new(1, paths.into_iter().rev()),
		&DedupConfig::default(),
	);

	assert_ne!(forward, reversed);
}

#[test]
#[traced_test]
fn missing_file_is_skipped_not_fatal() {
	let (temp, mut paths) = write_apks(&[("base.apk", b"PK base")]);
	let accessor = LocalAccessor::default();

	let only_base = compute_key(&accessor, &ApkSet::new(2, paths.clone()), &DedupConfig::default());

	paths.push(temp.path().join("split_gone.apk"));
	let with_missing = compute_key(&accessor, &ApkSet::new(2, paths), &DedupConfig::default());

	assert_eq!(only_base, with_missing);
	assert!(!with_missing.is_fallback());
	assert!(logs_contain("Skipping APK that can't be sized"));
}
