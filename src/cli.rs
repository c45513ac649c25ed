//! Command-line interface.
//!
//! Flags override values from the optional TOML file; the merged result is
//! validated the same way a file on its own would be.

use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::{read_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::{BackendConfig, BalancerConfig};

#[derive(Debug, Parser)]
#[command(name = "rr-balancer")]
#[command(version, about = "Round-robin HTTP load balancer with active health checks", long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend address (repeatable or comma separated). Replaces the file's list.
    #[arg(short, long = "backend", value_delimiter = ',')]
    pub backends: Vec<String>,

    /// Listener bind address.
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Seconds between health check cycles.
    #[arg(long)]
    pub health_interval: Option<u64>,

    /// Per-probe connect timeout in seconds.
    #[arg(long)]
    pub probe_timeout: Option<u64>,

    /// Log level when RUST_LOG is unset.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Merge file and flags into a validated configuration.
    pub fn into_config(self) -> Result<BalancerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => BalancerConfig::default(),
        };

        if !self.backends.is_empty() {
            config.backends = self.backends.into_iter().map(BackendConfig::new).collect();
        }
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(secs) = self.health_interval {
            config.health_check.interval_secs = secs;
        }
        if let Some(secs) = self.probe_timeout {
            config.health_check.timeout_secs = secs;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
