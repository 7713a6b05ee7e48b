use super::ConfigError;

/// Versioned configs upgrade themselves one version at a time
pub trait Migrate {
	fn current_version(&self) -> u32;

	fn target_version() -> u32;

	fn migrate(&mut self) -> Result<(), ConfigError>;

	fn needs_migration(&self) -> bool {
		self.current_version() < Self::target_version()
	}
}
