pub mod config;
pub mod error;

pub use config::{CacheConfig, Config, DocumentConfig, FeedConfig, LoggingConfig, Margins, Rgb};
pub use error::{AppError, CacheError, ConfigError, NetworkError};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` wins over `default_level` when it is set.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::debug!("Roomweek core initialized");
    Ok(())
}
