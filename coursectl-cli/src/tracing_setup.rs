//! Tracing setup for the coursectl CLI
//!
//! Usage:
//!   coursectl --debug serve               # Debug logging to console
//!   RUST_LOG=coursectl_core=debug ...     # Fine-grained log control
//!
//! Filter precedence: RUST_LOG, then `--debug`, then `log_level` from the
//! config file, then `info`.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (unless RUST_LOG is explicitly set)
    pub debug: bool,
    /// Fallback filter from the config file
    pub default_level: Option<String>,
}

impl TracingConfig {
    fn fallback_filter(&self) -> String {
        if self.debug {
            "debug".to_string()
        } else {
            self.default_level
                .clone()
                .unwrap_or_else(|| "info".to_string())
        }
    }
}

/// Initialize console tracing
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.fallback_filter()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
