use std::path::PathBuf;

use av_apk_dedup::{ApkSet, DedupStrategy};
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
	Metadata,
	ContentHash,
}

impl From<StrategyArg> for DedupStrategy {
	fn from(s: StrategyArg) -> Self {
		match s {
			StrategyArg::Metadata => Self::Metadata,
			StrategyArg::ContentHash => Self::ContentHash,
		}
	}
}

/// Identifies one installed version of a package and its APK files
#[derive(Args, Debug, Clone)]
pub struct ApkSetArgs {
	/// Version code of the installed package
	#[arg(long)]
	pub version_code: i64,

	/// Version name of the installed package
	#[arg(long)]
	pub version_name: Option<String>,

	/// APK files, base first
	#[arg(required = true)]
	pub apks: Vec<PathBuf>,
}

impl ApkSetArgs {
	pub fn to_apk_set(&self) -> ApkSet {
		let set = ApkSet::new(self.version_code, self.apks.iter().cloned());
		match &self.version_name {
			Some(name) => set.with_version_name(name),
			None => set,
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
	/// Key derivation strategy (defaults to the configured one)
	#[arg(long, value_enum)]
	pub strategy: Option<StrategyArg>,

	#[command(flatten)]
	pub apk_set: ApkSetArgs,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
	/// Candidate dedup directory
	pub dir: PathBuf,

	/// APK files expected in the directory
	#[arg(required = true)]
	pub apks: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
	/// Package name
	pub package: String,

	#[command(flatten)]
	pub apk_set: ApkSetArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RefsArgs {
	/// JSON file holding an array of backup records
	pub records: PathBuf,

	/// Dedup directory identifier to count references to
	pub identifier: String,
}

#[derive(Args, Debug, Clone)]
pub struct PruneArgs {
	/// Package name
	pub package: String,

	/// JSON file holding an array of backup records
	pub records: PathBuf,

	/// Only list what would be deleted
	#[arg(long, default_value_t = false)]
	pub dry_run: bool,
}
