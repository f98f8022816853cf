//! Mission event schema.
//!
//! The simulation engine emits one [`Event`] per vehicle departure, arrival
//! or in-place cargo transfer. Events are immutable once loaded; the
//! [`crate::timeline`] module turns them into per-entity timelines and the
//! [`crate::inventory`] module into per-node stock levels.
//!
//! The on-disk carrier is a JSON array. Kind strings from the simulator
//! (`taking off`, `arriving`, `loading cargo`) are accepted alongside the
//! canonical `depart`, `arrive`, `transfer`.
//!
//! ```
//! use mapreplay::event::{parse_events, EventKind};
//!
//! let events = parse_events(r#"[
//!     {"entity": "C17 1", "event": "taking off", "time": 1.0, "location": "KBGR"},
//!     {"entity": "C17 1", "event": "arriving", "time": 1.5, "location": "ETAD"}
//! ]"#).unwrap();
//!
//! assert_eq!(events[0].kind, EventKind::Depart);
//! assert_eq!(events[1].model(), "C17");
//! ```

mod entity;

pub use entity::EntityKind;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::registry::canonical_name;

/// What happened to an entity at an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Entity leaves its current location.
    Depart,
    /// Entity reaches a new location.
    Arrive,
    /// Cargo moves without the entity changing location.
    Transfer,
    /// Kind string outside the known vocabulary; rejected at ingestion.
    Unrecognized(String),
}

impl EventKind {
    /// Canonical name of the kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Depart => "depart",
            EventKind::Arrive => "arrive",
            EventKind::Transfer => "transfer",
            EventKind::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for EventKind {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "depart" | "departure" | "taking off" => EventKind::Depart,
            "arrive" | "arrival" | "arriving" => EventKind::Arrive,
            "transfer" | "loading cargo" => EventKind::Transfer,
            _ => EventKind::Unrecognized(raw.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(raw: String) -> Self {
        EventKind::from(raw.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cargo moved by an event.
///
/// For [`EventKind::Transfer`] the quantity is signed (positive = into the
/// node). For departures and arrivals the sign comes from the event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoRecord {
    #[serde(alias = "c_type")]
    pub commodity: String,
    #[serde(alias = "cargo_moved")]
    pub quantity: f64,
}

/// A single timestamped log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Vehicle identifier, e.g. `C17 3`.
    #[serde(rename = "entity", alias = "entity_id", alias = "Vehicle_name")]
    pub entity_id: String,
    /// Vehicle model; derived from the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "event", alias = "kind")]
    pub kind: EventKind,
    /// Simulation time in days (1.0 = 24h).
    pub time: f64,
    /// Location key, possibly with a disambiguating suffix.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<CargoRecord>,
}

impl Event {
    /// Create an event without model or cargo.
    pub fn new(
        entity_id: impl Into<String>,
        kind: EventKind,
        time: f64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            model: None,
            kind,
            time,
            location: location.into(),
            cargo: None,
        }
    }

    /// Shorthand for a departure event.
    pub fn depart(entity_id: impl Into<String>, time: f64, location: impl Into<String>) -> Self {
        Self::new(entity_id, EventKind::Depart, time, location)
    }

    /// Shorthand for an arrival event.
    pub fn arrive(entity_id: impl Into<String>, time: f64, location: impl Into<String>) -> Self {
        Self::new(entity_id, EventKind::Arrive, time, location)
    }

    /// Shorthand for a transfer event.
    pub fn transfer(entity_id: impl Into<String>, time: f64, location: impl Into<String>) -> Self {
        Self::new(entity_id, EventKind::Transfer, time, location)
    }

    /// Set the model string.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attach cargo.
    pub fn with_cargo(mut self, commodity: impl Into<String>, quantity: f64) -> Self {
        self.cargo = Some(CargoRecord {
            commodity: commodity.into(),
            quantity,
        });
        self
    }

    /// The model string, falling back to the first word of the entity id.
    pub fn model(&self) -> &str {
        match &self.model {
            Some(model) => model,
            None => self.entity_id.split_whitespace().next().unwrap_or(""),
        }
    }

    /// Entity class derived from the model string.
    pub fn entity_kind(&self) -> EntityKind {
        EntityKind::from_model(self.model())
    }

    /// Location key with its disambiguating suffix removed.
    pub fn node(&self) -> &str {
        canonical_name(&self.location)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T{:04.1}: {} @ {} ({})",
            self.time, self.entity_id, self.location, self.kind
        )
    }
}

/// Errors loading an event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("Failed to read event log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid event log: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a JSON event array, skipping records without an entity id.
pub fn parse_events(json: &str) -> Result<Vec<Event>, EventLogError> {
    let raw: Vec<Event> = serde_json::from_str(json)?;
    let total = raw.len();

    let events: Vec<Event> = raw
        .into_iter()
        .filter(|event| !event.entity_id.trim().is_empty())
        .collect();

    if events.len() < total {
        debug!(
            skipped = total - events.len(),
            "Skipped events without entity id"
        );
    }
    Ok(events)
}

/// Load a JSON event log from disk.
pub fn load_events(path: &Path) -> Result<Vec<Event>, EventLogError> {
    let contents = fs::read_to_string(path).map_err(|source| EventLogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let events = parse_events(&contents)?;
    info!(path = %path.display(), events = events.len(), "Event log loaded");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_vocabulary() {
        assert_eq!(EventKind::from("depart"), EventKind::Depart);
        assert_eq!(EventKind::from("Taking Off"), EventKind::Depart);
        assert_eq!(EventKind::from("arriving"), EventKind::Arrive);
        assert_eq!(EventKind::from("loading cargo"), EventKind::Transfer);
        assert_eq!(
            EventKind::from("refuel"),
            EventKind::Unrecognized("refuel".to_string())
        );
    }

    #[test]
    fn test_model_falls_back_to_id_prefix() {
        let event = Event::depart("LMSR 4", 0.0, "KJAX");
        assert_eq!(event.model(), "LMSR");
        assert_eq!(event.entity_kind(), EntityKind::Ship);

        let event = event.with_model("truck_US");
        assert_eq!(event.entity_kind(), EntityKind::Truck);
    }

    #[test]
    fn test_node_strips_suffix() {
        let event = Event::arrive("C17 1", 2.0, "KGRK_2");
        assert_eq!(event.node(), "KGRK");
        assert_eq!(event.location, "KGRK_2");
    }

    #[test]
    fn test_parse_with_cargo_and_legacy_fields() {
        let json = r#"[
            {"Vehicle_name": "C17 1", "event": "arriving", "time": 0.5,
             "location": "KFCS", "cargo": {"c_type": "PAX", "cargo_moved": 20}}
        ]"#;
        let events = parse_events(json).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].cargo,
            Some(CargoRecord {
                commodity: "PAX".to_string(),
                quantity: 20.0
            })
        );
    }

    #[test]
    fn test_parse_skips_blank_entities() {
        let json = r#"[
            {"entity": "", "event": "depart", "time": 0.0, "location": "A"},
            {"entity": "B777 2", "event": "depart", "time": 0.0, "location": "A"}
        ]"#;
        let events = parse_events(json).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_id, "B777 2");
    }

    #[test]
    fn test_parse_keeps_unknown_kind_for_ingestion() {
        let json = r#"[{"entity": "X 1", "event": "teleport", "time": 1.0, "location": "A"}]"#;
        let events = parse_events(json).unwrap();
        assert_eq!(events[0].kind, EventKind::Unrecognized("teleport".to_string()));
    }

    #[test]
    fn test_serialize_uses_canonical_kind() {
        let event = Event::transfer("Truck_US 1", 1.25, "KFCS").with_cargo("cargo", -5.0);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"transfer""#));
        assert!(!json.contains("model"));
    }

    #[test]
    fn test_display() {
        let event = Event::depart("C17 1", 1.0, "KBGR");
        assert_eq!(event.to_string(), "T01.0: C17 1 @ KBGR (depart)");
    }

    #[test]
    fn test_load_events_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"entity": "C17 1", "event": "depart", "time": 1.0, "location": "KBGR"}}]"#
        )
        .unwrap();

        let events = load_events(file.path()).unwrap();
        assert_eq!(events, vec![Event::depart("C17 1", 1.0, "KBGR")]);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_events(file.path()),
            Err(EventLogError::Parse(_))
        ));
    }
}
