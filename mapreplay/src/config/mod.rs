//! Configuration file support.
//!
//! Settings live in `config.ini` under the platform configuration directory
//! (`~/.config/mapreplay/config.ini` on Linux):
//!
//! ```text
//! [map]
//! crop_min_lat = -5
//! crop_min_lon = -120
//! zoom = 2
//! max_width = 3840
//! max_height = 2160
//!
//! [replay]
//! step = 0.002
//! speed = 1
//! missing_locations = hide
//!
//! [logging]
//! level = info
//! file = /path/to/mapreplay.log
//! ```
//!
//! A missing file means defaults. Individual settings are addressed as
//! `section.key` through [`ConfigKey`].

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, ConfigFile, LoggingSettings, MapSettings, ReplaySettings,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}
