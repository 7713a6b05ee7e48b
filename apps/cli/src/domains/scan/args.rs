use std::{
	path::PathBuf,
	str::FromStr,
	time::SystemTime,
};

use av_change_detection::DataCategory;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
	/// Directory to scan
	pub root: PathBuf,

	/// Time of the last backup, RFC 3339 or unix milliseconds
	#[arg(long, value_parser = parse_since)]
	pub since: SystemTime,

	/// Maximum depth below the root (defaults to the configured depth)
	#[arg(long)]
	pub max_depth: Option<u32>,

	/// Directory, relative to the root, to check before the full scan
	#[arg(long)]
	pub hint: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
	/// Package name
	pub package: String,

	/// Data directory of the package as `<category>=<path>`, repeatable
	#[arg(long = "dir", value_parser = parse_category_dir, required = true)]
	pub dirs: Vec<CategoryDir>,

	/// Time of the last backup; omit for packages that were never backed up
	#[arg(long, value_parser = parse_since)]
	pub since: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDir {
	pub category: DataCategory,
	pub path: PathBuf,
}

fn parse_since(raw: &str) -> Result<SystemTime, String> {
	av_utils::time::parse_timestamp(raw)
		.ok_or_else(|| format!("'{raw}' is neither RFC 3339 nor unix milliseconds"))
}

fn parse_category_dir(raw: &str) -> Result<CategoryDir, String> {
	let (category, path) = raw
		.split_once('=')
		.ok_or_else(|| format!("expected <category>=<path>, got '{raw}'"))?;

	if path.is_empty() {
		return Err(format!("missing path for category '{category}'"));
	}

	Ok(CategoryDir {
		category: DataCategory::from_str(category.trim())
			.map_err(|_| format!("unknown data category '{category}'"))?,
		path: PathBuf::from(path),
	})
}

#[cfg(test)]
mod tests {
	use av_utils::time::millis_to_system_time;
	use clap::Parser;

	use super::*;

	#[derive(Parser, Debug)]
	struct ScanHarness {
		#[command(flatten)]
		args: ScanArgs,
	}

	#[derive(Parser, Debug)]
	struct EvaluateHarness {
		#[command(flatten)]
		args: EvaluateArgs,
	}

	#[test]
	fn since_accepts_millis_and_rfc3339() {
		let millis = ScanHarness::try_parse_from(["scan", "/data", "--since", "1700000000000"])
			.unwrap()
			.args;
		let rfc = ScanHarness::try_parse_from([
			"scan",
			"/data",
			"--since",
			"2023-11-14T22:13:20Z",
		])
		.unwrap()
		.args;

		assert_eq!(millis.since, millis_to_system_time(1_700_000_000_000));
		assert_eq!(millis.since, rfc.since);
		assert_eq!(millis.max_depth, None);
	}

	#[test]
	fn since_is_required_for_scans() {
		assert!(ScanHarness::try_parse_from(["scan", "/data"]).is_err());
		assert!(ScanHarness::try_parse_from(["scan", "/data", "--since", "yesterday"]).is_err());
	}

	#[test]
	fn category_dirs_are_parsed() {
		let args = EvaluateHarness::try_parse_from([
			"evaluate",
			"com.example",
			"--dir",
			"app_data=/data/data/com.example",
			"--dir",
			"obb=/sdcard/Android/obb/com.example",
		])
		.unwrap()
		.args;

		assert_eq!(args.since, None);
		assert_eq!(
			args.dirs,
			vec![
				CategoryDir {
					category: DataCategory::AppData,
					path: PathBuf::from("/data/data/com.example"),
				},
				CategoryDir {
					category: DataCategory::Obb,
					path: PathBuf::from("/sdcard/Android/obb/com.example"),
				},
			]
		);
	}

	#[test]
	fn bad_category_dirs_are_rejected() {
		assert!(parse_category_dir("app_data").is_err());
		assert!(parse_category_dir("app_data=").is_err());
		assert!(parse_category_dir("cache=/tmp").is_err());
	}
}
