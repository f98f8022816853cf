//! Shared setup for commands that replay a log.

use std::path::Path;

use mapreplay::config::ConfigFile;
use mapreplay::logging::{init_logging, LoggingOptions, WorkerGuard};
use tracing::{info, warn};

use crate::error::CliError;

/// Loads configuration and installs logging for the lifetime of a command.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load configuration (from `config_path` if given) and start logging.
    ///
    /// `verbose` raises the configured level to `debug`.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let mut options: LoggingOptions = config.logging_options();
        if verbose {
            options.level = "debug".to_string();
        }

        let log_guard = match init_logging(&options) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: logging disabled: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run along with the effective settings.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = mapreplay::VERSION,
            command,
            zoom = self.config.map.zoom,
            missing_locations = %self.config.replay.missing_locations,
            "MapReplay starting"
        );
        if self.config.replay.speed.abs() > mapreplay::clock::SPEED_WARN_THRESHOLD {
            warn!(
                speed = self.config.replay.speed,
                "Configured speed is high; animation may skip over short events"
            );
        }
    }
}
