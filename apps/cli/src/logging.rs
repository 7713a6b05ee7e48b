use anyhow::{anyhow, Result};
use av_config::AppConfig;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logs to stderr and to a daily rotated `{data_dir}/logs/appvault.log`
pub fn init(config: &AppConfig) -> Result<()> {
	let default_filter = format!("av_={level},appvault={level}", level = config.log_level);

	let file_appender = RollingFileAppender::new(Rotation::DAILY, config.logs_dir(), "appvault.log");

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
		.with(
			fmt::layer()
				.with_target(true)
				.with_writer(std::io::stderr),
		)
		.with(
			fmt::layer()
				.with_target(true)
				.with_thread_ids(true)
				.with_ansi(false) // No ANSI colors in log files
				.with_writer(file_appender),
		)
		.try_init()
		.map_err(|e| anyhow!("Failed to initialize tracing: {e}"))
}
