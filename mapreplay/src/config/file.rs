//! INI-backed configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::{debug, info};

use super::keys::ConfigKey;
use super::ConfigError;
use crate::clock::DEFAULT_STEP;
use crate::coord::{CoordError, Projector};
use crate::logging::{LoggingOptions, DEFAULT_LOG_LEVEL};
use crate::replay::MissingLocationPolicy;

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mapreplay")
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// `[map]` section: region and screen size.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub crop_min_lat: f64,
    pub crop_min_lon: f64,
    pub zoom: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            crop_min_lat: -5.0,
            crop_min_lon: -120.0,
            zoom: 2,
            max_width: 3840,
            max_height: 2160,
        }
    }
}

impl MapSettings {
    /// A projector for this region and screen size.
    pub fn projector(&self) -> Result<Projector, CoordError> {
        let mut projector = Projector::new();
        projector.configure(self.crop_min_lat, self.crop_min_lon, self.zoom)?;
        projector.set_resolution(self.max_width, self.max_height)?;
        Ok(projector)
    }
}

/// `[replay]` section: playback defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySettings {
    pub step: f64,
    pub speed: f64,
    pub missing_locations: MissingLocationPolicy,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            speed: 1.0,
            missing_locations: MissingLocationPolicy::Hide,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub map: MapSettings,
    pub replay: ReplaySettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ini_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse INI text. Absent keys keep their defaults; unknown keys are ignored.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Render every key, unset optional keys omitted.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// A projector for the configured region and screen size.
    pub fn projector(&self) -> Result<Projector, CoordError> {
        self.map.projector()
    }

    pub fn logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            level: self.logging.level.clone(),
            file: self.logging.file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.map.zoom, 2);
        assert_eq!(config.map.crop_min_lat, -5.0);
        assert_eq!(config.replay.step, 0.002);
        assert_eq!(config.replay.missing_locations, MissingLocationPolicy::Hide);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_projector_is_valid() {
        let projector = ConfigFile::default().projector().unwrap();
        let viewport = projector.viewport().unwrap();
        assert_eq!(viewport.pixel_width, 3600);
        assert_eq!(viewport.max_lat, 85.0);
        assert_eq!(viewport.max_lon, 60.0);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ConfigFile::from_ini_str(
            "[map]\nzoom = 1\ncrop_min_lat = -90\ncrop_min_lon = -180\n\n[replay]\nmissing_locations = abort\n\n[other]\nfoo = bar\n",
        )
        .unwrap();
        assert_eq!(config.map.zoom, 1);
        assert_eq!(config.map.max_width, 3840);
        assert_eq!(config.replay.missing_locations, MissingLocationPolicy::Abort);
        assert_eq!(config.replay.speed, 1.0);
    }

    #[test]
    fn test_invalid_value_reports_key() {
        let err = ConfigFile::from_ini_str("[replay]\nspeed = fast\n").unwrap_err();
        assert!(err.to_string().contains("replay.speed"));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.map.zoom = 4;
        config.logging.file = Some(PathBuf::from("/var/log/mapreplay.log"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unset_file_not_written() {
        let ini = ConfigFile::default().to_ini();
        assert!(ini
            .section(Some("logging"))
            .and_then(|props| props.get("file"))
            .is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = ConfigFile::load_from(&temp.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
