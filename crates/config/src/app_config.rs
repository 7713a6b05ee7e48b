use std::{
	fs,
	path::{Path, PathBuf},
};

use av_apk_dedup::DedupConfig;
use av_change_detection::ScanOptions;
use av_utils::error::FileIOError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{default_data_dir, ConfigError, Migrate};

const CONFIG_FILE_NAME: &str = "appvault.json";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Logging level
	pub log_level: String,

	/// Change detection tuning
	#[serde(default)]
	pub scan: ScanOptions,

	/// APK deduplication
	#[serde(default)]
	pub dedup: DedupConfig,
}

impl AppConfig {
	/// Load configuration from the default location
	pub fn load() -> Result<Self, ConfigError> {
		Self::load_from(&default_data_dir()?)
	}

	/// Load configuration from a data directory, creating a default one if absent
	pub fn load_from(data_dir: &Path) -> Result<Self, ConfigError> {
		let config_path = data_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			Self::read(&config_path)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	/// Read an existing config file, migrating and re-saving it when it is outdated
	pub fn read(config_path: &Path) -> Result<Self, ConfigError> {
		info!("Loading config from {:?}", config_path);

		let json = fs::read_to_string(config_path)
			.map_err(|e| FileIOError::from_std_io_err(config_path, e))?;
		let mut config: Self = serde_json::from_str(&json)?;

		if config.version > Self::target_version() {
			return Err(ConfigError::UnknownVersion(config.version));
		}

		if config.needs_migration() {
			info!(
				"Migrating config from v{} to v{}",
				config.version,
				Self::target_version()
			);
			config.migrate()?;
			config.save()?;
		}

		Ok(config)
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			log_level: "info".to_string(),
			scan: ScanOptions::default(),
			dedup: DedupConfig::default(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<(), ConfigError> {
		fs::create_dir_all(&self.data_dir)
			.map_err(|e| FileIOError::from_std_io_err(&self.data_dir, e))?;

		let config_path = self.config_path();
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json).map_err(|e| FileIOError::from_std_io_err(&config_path, e))?;

		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	pub fn config_path(&self) -> PathBuf {
		self.data_dir.join(CONFIG_FILE_NAME)
	}

	pub fn logs_dir(&self) -> PathBuf {
		self.data_dir.join("logs")
	}

	/// Root of the APK dedup store
	pub fn dedup_root(&self) -> PathBuf {
		self.data_dir.join(&self.dedup.store_dir)
	}

	/// Where the hot path cache snapshot is kept between runs
	pub fn hot_path_cache_path(&self) -> PathBuf {
		self.data_dir.join("hot_paths.json")
	}

	/// Ensure all required directories exist
	pub fn ensure_directories(&self) -> Result<(), ConfigError> {
		for dir in [self.data_dir.clone(), self.logs_dir(), self.dedup_root()] {
			fs::create_dir_all(&dir).map_err(|e| FileIOError::from_std_io_err(&dir, e))?;
		}
		Ok(())
	}
}

impl Migrate for AppConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		2 // Scan options became configurable
	}

	fn migrate(&mut self) -> Result<(), ConfigError> {
		match self.version {
			0 => {
				self.version = 1;
				self.migrate() // Continue migration chain
			}
			1 => {
				// v1 had a hard-coded scan depth and always used the hot path. A missing
				// `scan` block was already filled with those defaults on load, one that is
				// present is kept as written.
				self.version = 2;
				Ok(())
			}
			2 => Ok(()), // Already at target version
			v => Err(ConfigError::UnknownVersion(v)),
		}
	}
}
