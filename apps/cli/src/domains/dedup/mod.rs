mod args;

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use av_apk_dedup::{
	compute_key, count_references, verify_match, BackupRecord, DedupKey, DedupStore,
	DedupStrategy,
};
use av_fs_access::LocalAccessor;
use serde::Serialize;

use crate::{context::Context, print_output};

pub use self::args::*;

#[derive(Debug, Serialize)]
struct KeyOutput {
	key: DedupKey,
	strategy: DedupStrategy,
	fallback: bool,
}

#[derive(Debug, Serialize)]
struct VerifyOutput {
	dir: PathBuf,
	matches: bool,
}

#[derive(Debug, Serialize)]
struct StoreOutput {
	key: DedupKey,
	dir: PathBuf,
	reused: bool,
	bytes_copied: u64,
}

#[derive(Debug, Serialize)]
struct RefsOutput {
	identifier: String,
	references: usize,
}

#[derive(Debug, Serialize)]
struct PruneOutput {
	package: String,
	dry_run: bool,
	removed: Vec<DedupKey>,
	failed: Vec<DedupKey>,
}

fn dedup_store(ctx: &Context) -> DedupStore<LocalAccessor> {
	DedupStore::new(
		LocalAccessor::default(),
		ctx.config.dedup_root(),
		ctx.config.dedup.clone(),
	)
}

fn read_records(path: &Path) -> Result<Vec<BackupRecord>> {
	let json = fs::read_to_string(path)
		.with_context(|| format!("Failed to read backup records from {}", path.display()))?;
	serde_json::from_str(&json)
		.with_context(|| format!("Malformed backup records in {}", path.display()))
}

pub fn run_key(ctx: &Context, args: KeyArgs) -> Result<()> {
	let mut config = ctx.config.dedup.clone();
	if let Some(strategy) = args.strategy {
		config.strategy = strategy.into();
	}

	let key = compute_key(&LocalAccessor::default(), &args.apk_set.to_apk_set(), &config);

	let out = KeyOutput {
		fallback: key.is_fallback(),
		key,
		strategy: config.strategy,
	};

	print_output!(ctx, &out, |o: &KeyOutput| {
		println!("{}", o.key);
		if o.fallback {
			eprintln!("No APK could be read, this is a fallback key");
		}
	});

	Ok(())
}

pub fn run_verify(ctx: &Context, args: VerifyArgs) -> Result<()> {
	let out = VerifyOutput {
		matches: verify_match(&LocalAccessor::default(), &args.dir, &args.apks),
		dir: args.dir,
	};

	print_output!(ctx, &out, |o: &VerifyOutput| {
		if o.matches {
			println!("{} holds every APK", o.dir.display());
		} else {
			println!("{} does not match", o.dir.display());
		}
	});

	Ok(())
}

pub fn run_store(ctx: &Context, args: StoreArgs) -> Result<()> {
	let stored = dedup_store(ctx)
		.store_apks(&args.package, &args.apk_set.to_apk_set())
		.with_context(|| format!("Failed to store APKs of {}", args.package))?;

	let out = StoreOutput {
		key: stored.key,
		dir: stored.dir,
		reused: stored.reused,
		bytes_copied: stored.bytes_copied,
	};

	print_output!(ctx, &out, |o: &StoreOutput| {
		if o.reused {
			println!("Reused {} ({})", o.key, o.dir.display());
		} else {
			println!(
				"Stored {} ({}, {} bytes copied)",
				o.key,
				o.dir.display(),
				o.bytes_copied
			);
		}
	});

	Ok(())
}

pub fn run_refs(ctx: &Context, args: RefsArgs) -> Result<()> {
	let records = read_records(&args.records)?;

	let out = RefsOutput {
		references: count_references(&records, &args.identifier),
		identifier: args.identifier,
	};

	print_output!(ctx, &out, |o: &RefsOutput| {
		println!("{}: {} reference(s)", o.identifier, o.references);
	});

	Ok(())
}

pub fn run_prune(ctx: &Context, args: PruneArgs) -> Result<()> {
	let records = read_records(&args.records)?;
	let store = dedup_store(ctx);

	let (removed, failed) = if args.dry_run {
		(store.unreferenced(&args.package, &records)?, Vec::new())
	} else {
		let report = store.prune_unreferenced(&args.package, &records)?;
		(report.removed, report.failed)
	};

	let out = PruneOutput {
		package: args.package,
		dry_run: args.dry_run,
		removed,
		failed,
	};

	print_output!(ctx, &out, |o: &PruneOutput| {
		let verb = if o.dry_run { "Would remove" } else { "Removed" };
		if o.removed.is_empty() && o.failed.is_empty() {
			println!("{}: nothing to prune", o.package);
		}
		for key in &o.removed {
			println!("{verb} {key}");
		}
		for key in &o.failed {
			println!("Failed to remove {key}");
		}
	});

	Ok(())
}

#[cfg(test)]
mod tests {
	use av_config::AppConfig;
	use chrono::Utc;

	use super::*;
	use crate::context::OutputFormat;

	fn context(data_dir: &Path) -> Context {
		let config = AppConfig::default_with_dir(data_dir.to_path_buf());
		config.ensure_directories().unwrap();
		Context::new(OutputFormat::Json, config)
	}

	fn record(backup_id: &str, apk_location: Option<&str>) -> BackupRecord {
		BackupRecord {
			package_name: "com.example".to_string(),
			backup_id: backup_id.to_string(),
			created_at: Utc::now(),
			version_name: Some("1.0".to_string()),
			version_code: 1,
			apk_location: apk_location.map(str::to_string),
		}
	}

	#[test]
	fn records_are_read_from_json() {
		let temp = tempfile::tempdir().unwrap();
		let path = temp.path().join("records.json");
		let records = vec![record("b1", Some("k1")), record("b2", None)];
		fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

		assert_eq!(read_records(&path).unwrap(), records);
		assert!(read_records(&temp.path().join("missing.json")).is_err());
	}

	#[test]
	fn dry_run_prune_keeps_directories() {
		let temp = tempfile::tempdir().unwrap();
		let ctx = context(temp.path());

		let apk = temp.path().join("base.apk");
		fs::write(&apk, vec![7u8; 128]).unwrap();

		let stored = dedup_store(&ctx)
			.store_apks(
				"com.example",
				&av_apk_dedup::ApkSet::new(1, [&apk]).with_version_name("1.0"),
			)
			.unwrap();

		let records_path = temp.path().join("records.json");
		fs::write(&records_path, "[]").unwrap();

		run_prune(
			&ctx,
			PruneArgs {
				package: "com.example".to_string(),
				records: records_path.clone(),
				dry_run: true,
			},
		)
		.unwrap();
		assert!(stored.dir.is_dir());

		run_prune(
			&ctx,
			PruneArgs {
				package: "com.example".to_string(),
				records: records_path,
				dry_run: false,
			},
		)
		.unwrap();
		assert!(!stored.dir.exists());
	}
}
