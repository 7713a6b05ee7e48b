mod args;

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use av_change_detection::{
	ChangeDetector, ChangeEvaluator, DataCategory, HotPathCache, HotPathSnapshot,
	PackageDataDirs, ScanPhase, ScanRequest,
};
use av_fs_access::LocalAccessor;
use av_utils::time::to_datetime;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::{context::Context, print_output};

pub use self::args::*;

#[derive(Debug, Serialize)]
struct ScanOutput {
	changed: bool,
	found_path: Option<PathBuf>,
	found_at: Option<DateTime<Utc>>,
	found_in: Option<&'static str>,
	nodes_visited: u64,
	dirs_listed: u64,
	listing_failures: u64,
}

#[derive(Debug, Serialize)]
struct EvaluateOutput {
	package: String,
	needs_backup: bool,
	is_new_package: bool,
	changed_category: Option<DataCategory>,
}

pub fn run_scan(ctx: &Context, args: ScanArgs) -> Result<()> {
	let fs = LocalAccessor::default();
	let request = ScanRequest::new(args.root, args.since)
		.with_max_depth(args.max_depth.unwrap_or(ctx.config.scan.max_depth))
		.with_optional_hot_path(args.hint);

	let (result, stats) = ChangeDetector::new(&fs).scan_with_stats(&request);

	let out = ScanOutput {
		changed: result.has_changes(),
		found_path: result.found_path().map(Path::to_path_buf),
		found_at: result.found_at().map(to_datetime),
		found_in: stats.found_in.map(|phase| match phase {
			ScanPhase::HotPath => "hot_path",
			ScanPhase::FullScan => "full_scan",
		}),
		nodes_visited: stats.nodes_visited,
		dirs_listed: stats.dirs_listed,
		listing_failures: stats.listing_failures,
	};

	print_output!(ctx, &out, |o: &ScanOutput| {
		match (&o.found_path, o.found_at) {
			(Some(path), Some(at)) => {
				println!("Changed: {} (modified {at})", path.display())
			}
			_ => println!("Unchanged"),
		}
		println!(
			"Visited {} nodes, listed {} directories",
			o.nodes_visited, o.dirs_listed
		);
	});

	Ok(())
}

pub fn run_evaluate(ctx: &Context, args: EvaluateArgs) -> Result<()> {
	let fs = LocalAccessor::default();
	let cache_path = ctx.hot_path_cache_path();
	let cache = load_hot_paths(&cache_path);

	let package_dirs = args
		.dirs
		.into_iter()
		.fold(PackageDataDirs::new(&args.package), |dirs, dir| {
			dirs.with(dir.category, dir.path)
		});

	let decision =
		ChangeEvaluator::new(&fs, &cache, ctx.config.scan).evaluate(&package_dirs, args.since);

	save_hot_paths(&cache_path, &cache)?;

	let out = EvaluateOutput {
		package: args.package,
		needs_backup: decision.needs_backup,
		is_new_package: decision.is_new_package,
		changed_category: decision.changed_category,
	};

	print_output!(ctx, &out, |o: &EvaluateOutput| {
		if o.is_new_package {
			println!("{}: new package, backup needed", o.package);
		} else if let Some(category) = o.changed_category {
			println!("{}: {category} changed, backup needed", o.package);
		} else {
			println!("{}: unchanged", o.package);
		}
	});

	Ok(())
}

/// A missing or unreadable cache only costs the hot path shortcut
fn load_hot_paths(path: &Path) -> HotPathCache {
	if !path.exists() {
		return HotPathCache::new();
	}

	let snapshot = fs::read_to_string(path)
		.map_err(anyhow::Error::from)
		.and_then(|json| serde_json::from_str::<HotPathSnapshot>(&json).map_err(Into::into));

	match snapshot {
		Ok(snapshot) => HotPathCache::from_snapshot(snapshot),
		Err(e) => {
			warn!(path = %path.display(), "Ignoring unreadable hot path cache: {e}");
			HotPathCache::new()
		}
	}
}

fn save_hot_paths(path: &Path, cache: &HotPathCache) -> Result<()> {
	let json = serde_json::to_string_pretty(&cache.snapshot())?;
	fs::write(path, json)
		.with_context(|| format!("Failed to write hot path cache to {}", path.display()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hot_paths_survive_a_restart() {
		let temp = tempfile::tempdir().unwrap();
		let path = temp.path().join("hot_paths.json");

		let cache = HotPathCache::new();
		cache.record_change("com.example", DataCategory::AppData, "files/saves");
		save_hot_paths(&path, &cache).unwrap();

		let restored = load_hot_paths(&path);
		assert_eq!(
			restored.get("com.example", DataCategory::AppData),
			Some(PathBuf::from("files/saves"))
		);
		assert_eq!(
			restored.last_changed_category("com.example"),
			Some(DataCategory::AppData)
		);
	}

	#[test]
	fn corrupt_cache_starts_empty() {
		let temp = tempfile::tempdir().unwrap();
		let path = temp.path().join("hot_paths.json");
		fs::write(&path, "[[[").unwrap();

		assert!(load_hot_paths(&path).is_empty());
	}
}
