//! Location registry.
//!
//! The event log refers to places by string key. Keys may carry a
//! disambiguating suffix after [`LOCATION_SEPARATOR`] (for example
//! `KFCS_2` for a second berth at `KFCS`); the suffix is stripped before
//! lookup, so several log strings can resolve to the same physical node.
//!
//! The registry itself is an external collaborator of the replay engine,
//! consumed through the [`LocationRegistry`] trait. [`StaticRegistry`] is the
//! in-memory implementation backed by a JSON location file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::coord::{parse_dms, CoordError, GeoPoint};

/// Separator between a node name and its disambiguating suffix.
pub const LOCATION_SEPARATOR: char = '_';

/// Strip the disambiguating suffix from a location key.
///
/// ```
/// use mapreplay::registry::canonical_name;
///
/// assert_eq!(canonical_name("KFCS_2"), "KFCS");
/// assert_eq!(canonical_name("KFCS"), "KFCS");
/// ```
pub fn canonical_name(location: &str) -> &str {
    match location.split_once(LOCATION_SEPARATOR) {
        Some((node, _)) => node,
        None => location,
    }
}

/// Resolves node names to geographic coordinates.
pub trait LocationRegistry {
    /// Look up a location key, returning `None` when the node is unknown.
    ///
    /// Implementations must strip the disambiguating suffix themselves.
    fn lookup(&self, name: &str) -> Option<GeoPoint>;
}

/// Errors loading or populating a location registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read location file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid location file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Location name must not be empty")]
    EmptyName,

    /// Names may not contain the separator, it would be stripped on lookup.
    #[error("'{separator}' not allowed in location name '{name}'")]
    ReservedSeparator { name: String, separator: char },

    #[error("Invalid coordinate for location '{name}': {source}")]
    Coordinate {
        name: String,
        #[source]
        source: CoordError,
    },
}

/// A coordinate as written in a location file: decimal degrees or a DMS string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordValue {
    Degrees(f64),
    Text(String),
}

impl CoordValue {
    /// Convert to signed decimal degrees.
    pub fn to_degrees(&self) -> Result<f64, CoordError> {
        match self {
            CoordValue::Degrees(value) => Ok(*value),
            CoordValue::Text(text) => parse_dms(text),
        }
    }
}

/// One entry of a location file.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRecord {
    #[serde(alias = "ICAO", alias = "icao")]
    pub name: String,
    pub lat: CoordValue,
    #[serde(alias = "LNG_180", alias = "lng")]
    pub lon: CoordValue,
}

/// In-memory location registry.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    nodes: HashMap<String, GeoPoint>,
    /// Insertion order, for deterministic iteration.
    order: Vec<String>,
}

impl StaticRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named node. A later entry with the same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, point: GeoPoint) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name.contains(LOCATION_SEPARATOR) {
            return Err(RegistryError::ReservedSeparator {
                name,
                separator: LOCATION_SEPARATOR,
            });
        }

        if self.nodes.insert(name.clone(), point).is_some() {
            warn!(location = %name, "Duplicate location replaced");
        } else {
            self.order.push(name);
        }
        Ok(())
    }

    /// Build a registry from parsed location records.
    pub fn from_records(records: Vec<LocationRecord>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for record in records {
            let lat = record
                .lat
                .to_degrees()
                .map_err(|source| RegistryError::Coordinate {
                    name: record.name.clone(),
                    source,
                })?;
            let lon = record
                .lon
                .to_degrees()
                .map_err(|source| RegistryError::Coordinate {
                    name: record.name.clone(),
                    source,
                })?;
            registry.insert(record.name, GeoPoint::new(lat, lon))?;
        }
        Ok(registry)
    }

    /// Parse a JSON array of location records.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let records: Vec<LocationRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Load a JSON location file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&contents)?;
        info!(path = %path.display(), locations = registry.len(), "Location registry loaded");
        Ok(registry)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, GeoPoint)> {
        self.order
            .iter()
            .filter_map(|name| self.nodes.get(name).map(|point| (name.as_str(), *point)))
    }
}

impl LocationRegistry for StaticRegistry {
    fn lookup(&self, name: &str) -> Option<GeoPoint> {
        self.nodes.get(canonical_name(name)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_canonical_name_strips_suffix() {
        assert_eq!(canonical_name("KGRK_pier_2"), "KGRK");
        assert_eq!(canonical_name("ETAD"), "ETAD");
        assert_eq!(canonical_name("_x"), "");
    }

    #[test]
    fn test_lookup_with_suffix() {
        let mut registry = StaticRegistry::new();
        registry.insert("KFCS", GeoPoint::new(38.68, -104.76)).unwrap();

        assert_eq!(registry.lookup("KFCS"), Some(GeoPoint::new(38.68, -104.76)));
        assert_eq!(registry.lookup("KFCS_1"), Some(GeoPoint::new(38.68, -104.76)));
        assert_eq!(registry.lookup("KGRK"), None);
    }

    #[test]
    fn test_insert_rejects_separator() {
        let mut registry = StaticRegistry::new();
        let err = registry
            .insert("KFCS_1", GeoPoint::new(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ReservedSeparator { .. }));
        assert!(err.to_string().contains("'_' not allowed"));
        assert!(matches!(
            registry.insert("", GeoPoint::new(0.0, 0.0)),
            Err(RegistryError::EmptyName)
        ));
    }

    #[test]
    fn test_duplicate_replaces_and_keeps_order() {
        let mut registry = StaticRegistry::new();
        registry.insert("A", GeoPoint::new(1.0, 1.0)).unwrap();
        registry.insert("B", GeoPoint::new(2.0, 2.0)).unwrap();
        registry.insert("A", GeoPoint::new(3.0, 3.0)).unwrap();

        let names: Vec<_> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(registry.lookup("A"), Some(GeoPoint::new(3.0, 3.0)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_from_json_mixed_notation() {
        let json = r#"[
            {"name": "KFCS", "lat": 38.68, "lon": -104.76},
            {"ICAO": "ETAD", "lat": "49°58'N", "LNG_180": "6°42'E"}
        ]"#;
        let registry = StaticRegistry::from_json_str(json).unwrap();

        let etad = registry.lookup("ETAD").unwrap();
        assert!((etad.lat - (49.0 + 58.0 / 60.0)).abs() < 1e-9);
        assert!((etad.lon - 6.7).abs() < 1e-9);
    }

    #[test]
    fn test_from_json_invalid_coordinate() {
        let json = r#"[{"name": "BAD", "lat": "north", "lon": 0}]"#;
        let err = StaticRegistry::from_json_str(json).unwrap_err();
        assert!(matches!(err, RegistryError::Coordinate { ref name, .. } if name == "BAD"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "KBGR", "lat": 44.8, "lon": -68.8}}]"#).unwrap();

        let registry = StaticRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("KBGR_3").is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let err = StaticRegistry::load(Path::new("/nonexistent/locations.json")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }
}
