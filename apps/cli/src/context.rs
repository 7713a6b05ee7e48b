use std::path::PathBuf;

use av_config::AppConfig;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

#[derive(Debug, Clone)]
pub struct Context {
	pub format: OutputFormat,
	pub config: AppConfig,
}

impl Context {
	pub fn new(format: OutputFormat, config: AppConfig) -> Self {
		Self { format, config }
	}

	pub fn hot_path_cache_path(&self) -> PathBuf {
		self.config.hot_path_cache_path()
	}
}
