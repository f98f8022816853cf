//! Addressable configuration keys (`section.key`).

use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFile;
use super::ConfigError;
use crate::clock::MAX_SPEED;
use crate::coord::{MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::logging::parse_filter;
use crate::replay::MissingLocationPolicy;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    MapCropMinLat,
    MapCropMinLon,
    MapZoom,
    MapMaxWidth,
    MapMaxHeight,
    ReplayStep,
    ReplaySpeed,
    ReplayMissingLocations,
    LoggingLevel,
    LoggingFile,
}

const ALL_KEYS: [ConfigKey; 10] = [
    ConfigKey::MapCropMinLat,
    ConfigKey::MapCropMinLon,
    ConfigKey::MapZoom,
    ConfigKey::MapMaxWidth,
    ConfigKey::MapMaxHeight,
    ConfigKey::ReplayStep,
    ConfigKey::ReplaySpeed,
    ConfigKey::ReplayMissingLocations,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFile,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::MapCropMinLat
            | ConfigKey::MapCropMinLon
            | ConfigKey::MapZoom
            | ConfigKey::MapMaxWidth
            | ConfigKey::MapMaxHeight => "map",
            ConfigKey::ReplayStep | ConfigKey::ReplaySpeed | ConfigKey::ReplayMissingLocations => {
                "replay"
            }
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::MapCropMinLat => "crop_min_lat",
            ConfigKey::MapCropMinLon => "crop_min_lon",
            ConfigKey::MapZoom => "zoom",
            ConfigKey::MapMaxWidth => "max_width",
            ConfigKey::MapMaxHeight => "max_height",
            ConfigKey::ReplayStep => "step",
            ConfigKey::ReplaySpeed => "speed",
            ConfigKey::ReplayMissingLocations => "missing_locations",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::MapCropMinLat => config.map.crop_min_lat.to_string(),
            ConfigKey::MapCropMinLon => config.map.crop_min_lon.to_string(),
            ConfigKey::MapZoom => config.map.zoom.to_string(),
            ConfigKey::MapMaxWidth => config.map.max_width.to_string(),
            ConfigKey::MapMaxHeight => config.map.max_height.to_string(),
            ConfigKey::ReplayStep => config.replay.step.to_string(),
            ConfigKey::ReplaySpeed => config.replay.speed.to_string(),
            ConfigKey::ReplayMissingLocations => config.replay.missing_locations.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::MapCropMinLat => {
                config.map.crop_min_lat = self.parse_in_range(value, MIN_LAT, MAX_LAT)?
            }
            ConfigKey::MapCropMinLon => {
                config.map.crop_min_lon = self.parse_in_range(value, MIN_LON, MAX_LON)?
            }
            ConfigKey::MapZoom => config.map.zoom = self.parse_positive(value)?,
            ConfigKey::MapMaxWidth => config.map.max_width = self.parse_positive(value)?,
            ConfigKey::MapMaxHeight => config.map.max_height = self.parse_positive(value)?,
            ConfigKey::ReplayStep => {
                let step: f64 = self.parse(value)?;
                if !step.is_finite() || step <= 0.0 {
                    return Err(self.invalid(value, "must be a positive number"));
                }
                config.replay.step = step;
            }
            ConfigKey::ReplaySpeed => {
                config.replay.speed = self.parse_in_range(value, -MAX_SPEED, MAX_SPEED)?
            }
            ConfigKey::ReplayMissingLocations => {
                config.replay.missing_locations = value
                    .parse::<MissingLocationPolicy>()
                    .map_err(|reason| self.invalid(value, &reason))?
            }
            ConfigKey::LoggingLevel => {
                parse_filter(value).map_err(|e| self.invalid(value, &e.to_string()))?;
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigError> {
        value
            .parse()
            .map_err(|_| self.invalid(value, "not a valid number"))
    }

    fn parse_in_range(&self, value: &str, min: f64, max: f64) -> Result<f64, ConfigError> {
        let parsed: f64 = self.parse(value)?;
        if !(min..=max).contains(&parsed) {
            return Err(self.invalid(value, &format!("must be between {} and {}", min, max)));
        }
        Ok(parsed)
    }

    fn parse_positive(&self, value: &str) -> Result<u32, ConfigError> {
        let parsed: u32 = self.parse(value)?;
        if parsed == 0 {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(parsed)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!("map.zoom".parse::<ConfigKey>().unwrap(), ConfigKey::MapZoom);
        assert_eq!(
            " Replay.Missing_Locations ".parse::<ConfigKey>().unwrap(),
            ConfigKey::ReplayMissingLocations
        );
        assert!(matches!(
            "map.colour".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_its_default() {
        let defaults = ConfigFile::default();
        for key in ConfigKey::all() {
            let mut config = ConfigFile::default();
            let value = key.get(&defaults);
            key.set(&mut config, &value).unwrap();
            assert_eq!(config, defaults, "{}", key.name());
        }
    }

    #[test]
    fn test_set_validates() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::MapZoom.set(&mut config, "0").is_err());
        assert!(ConfigKey::MapCropMinLat.set(&mut config, "91").is_err());
        assert!(ConfigKey::ReplayStep.set(&mut config, "-0.1").is_err());
        assert!(ConfigKey::ReplaySpeed.set(&mut config, "250").is_err());
        assert!(ConfigKey::ReplayMissingLocations.set(&mut config, "ignore").is_err());
        assert!(ConfigKey::LoggingLevel.set(&mut config, "mapreplay=loudest").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_set_values() {
        let mut config = ConfigFile::default();
        ConfigKey::ReplaySpeed.set(&mut config, "-8").unwrap();
        ConfigKey::LoggingFile.set(&mut config, "replay.log").unwrap();
        ConfigKey::LoggingLevel.set(&mut config, "debug").unwrap();

        assert_eq!(config.replay.speed, -8.0);
        assert_eq!(ConfigKey::LoggingFile.get(&config), "replay.log");
        assert_eq!(config.logging.level, "debug");

        ConfigKey::LoggingFile.set(&mut config, "").unwrap();
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_names_grouped_by_section() {
        let sections: Vec<&str> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut deduped = sections.clone();
        deduped.dedup();
        assert_eq!(deduped, vec!["map", "replay", "logging"]);
        assert_eq!(ConfigKey::LoggingFile.name(), "logging.file");
    }
}
