//! Application configuration management

use std::path::PathBuf;

use directories::ProjectDirs;

mod app_config;
mod error;
mod migration;

pub use app_config::AppConfig;
pub use error::ConfigError;
pub use migration::Migrate;

/// Platform-specific data directory, e.g. `~/.local/share/appvault` on Linux
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
	ProjectDirs::from("", "", "appvault")
		.map(|dirs| dirs.data_local_dir().to_path_buf())
		.ok_or(ConfigError::NoDataDir)
}
