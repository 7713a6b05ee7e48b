use std::path::PathBuf;

use anyhow::{Context as _, Result};
use av_config::{default_data_dir, AppConfig};
use clap::{Parser, Subcommand};

mod context;
mod domains;
mod logging;
mod util;

use crate::context::{Context, OutputFormat};
use crate::domains::{dedup, scan};

#[derive(Parser, Debug)]
#[command(name = "appvault", about = "AppVault change detection and APK deduplication")]
struct Cli {
	/// Path to the AppVault data directory
	#[arg(long, global = true)]
	data_dir: Option<PathBuf>,

	/// Config file to use instead of `<data-dir>/appvault.json`
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	/// Output format
	#[arg(long, value_enum, default_value = "human", global = true)]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Check a directory tree for changes since a timestamp
	Scan(scan::ScanArgs),
	/// Decide whether a package's data needs a new backup
	Evaluate(scan::EvaluateArgs),
	/// Compute the dedup key of a set of APKs
	Key(dedup::KeyArgs),
	/// Check whether a directory already holds a set of APKs
	Verify(dedup::VerifyArgs),
	/// Store a set of APKs in the dedup store
	Store(dedup::StoreArgs),
	/// Count backup records pointing at a dedup directory
	Refs(dedup::RefsArgs),
	/// Delete dedup directories no backup record points at
	Prune(dedup::PruneArgs),
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
	let mut config = match &cli.config {
		Some(path) => AppConfig::read(path)
			.with_context(|| format!("Failed to read config at {}", path.display()))?,
		None => {
			let data_dir = match &cli.data_dir {
				Some(dir) => dir.clone(),
				None => default_data_dir()?,
			};
			AppConfig::load_from(&data_dir)?
		}
	};

	if let Some(dir) = &cli.data_dir {
		config.data_dir = dir.clone();
	}

	Ok(config)
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = load_config(&cli)?;
	config
		.ensure_directories()
		.context("Failed to create data directories")?;
	logging::init(&config)?;

	let ctx = Context::new(cli.format, config);

	match cli.command {
		Commands::Scan(args) => scan::run_scan(&ctx, args),
		Commands::Evaluate(args) => scan::run_evaluate(&ctx, args),
		Commands::Key(args) => dedup::run_key(&ctx, args),
		Commands::Verify(args) => dedup::run_verify(&ctx, args),
		Commands::Store(args) => dedup::run_store(&ctx, args),
		Commands::Refs(args) => dedup::run_refs(&ctx, args),
		Commands::Prune(args) => dedup::run_prune(&ctx, args),
	}
}
