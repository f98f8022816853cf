//! Loading a replay: ingestion, location resolution and inventory.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use super::error::ReplayError;
use super::view::ReplayView;
use crate::clock::{ClockError, ReplayClock};
use crate::coord::{PixelPoint, Projector};
use crate::event::{load_events, Event};
use crate::inventory::{Inventory, InventoryReconstructor};
use crate::registry::{canonical_name, LocationRegistry, StaticRegistry};
use crate::timeline::{Leg, Timeline, TimelineBuilder};

/// What to do with entities whose timeline references a location that
/// cannot be placed on the map.
///
/// A location cannot be placed when the registry does not know it, or when
/// it lies outside the projected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingLocationPolicy {
    /// Log a warning and hide the affected entities.
    #[default]
    Hide,
    /// Fail the load.
    Abort,
}

impl MissingLocationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingLocationPolicy::Hide => "hide",
            MissingLocationPolicy::Abort => "abort",
        }
    }
}

impl fmt::Display for MissingLocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingLocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hide" | "skip" => Ok(MissingLocationPolicy::Hide),
            "abort" | "fail" => Ok(MissingLocationPolicy::Abort),
            other => Err(format!(
                "unknown missing-location policy '{}' (expected hide or abort)",
                other
            )),
        }
    }
}

/// Immutable replay state shared by every view.
#[derive(Debug)]
pub struct ReplayData {
    timelines: Vec<Timeline>,
    index: HashMap<String, usize>,
    legs: Vec<Leg>,
    inventory: Inventory,
    pixels: HashMap<String, PixelPoint>,
    hidden: HashSet<String>,
    missing: BTreeSet<String>,
    projector: Projector,
    end_time: f64,
}

impl ReplayData {
    /// Timelines in order of first appearance in the log.
    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    pub fn timeline(&self, entity_id: &str) -> Option<&Timeline> {
        self.index.get(entity_id).map(|&i| &self.timelines[i])
    }

    pub(crate) fn timeline_index(&self, entity_id: &str) -> Option<usize> {
        self.index.get(entity_id).copied()
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Latest timestamp in the log.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Pixel table keyed by node name.
    pub fn pixels(&self) -> &HashMap<String, PixelPoint> {
        &self.pixels
    }

    /// Pixel position of a location key; the suffix is ignored.
    pub fn pixel(&self, location: &str) -> Option<PixelPoint> {
        self.pixels.get(canonical_name(location)).copied()
    }

    /// Whether the entity is hidden because of an unplaceable location.
    pub fn is_hidden(&self, entity_id: &str) -> bool {
        self.hidden.contains(entity_id)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    /// Node names that could not be placed on the map, sorted.
    pub fn missing_locations(&self) -> impl Iterator<Item = &str> {
        self.missing.iter().map(String::as_str)
    }

    pub fn entity_count(&self) -> usize {
        self.timelines.len()
    }
}

/// Entry point for loading a replay.
///
/// # Example
///
/// ```
/// use mapreplay::coord::{GeoPoint, Projector};
/// use mapreplay::event::Event;
/// use mapreplay::query::Usage;
/// use mapreplay::registry::StaticRegistry;
/// use mapreplay::replay::{MissingLocationPolicy, ReplayEngine};
///
/// let mut registry = StaticRegistry::new();
/// registry.insert("KBGR", GeoPoint::new(44.8, -68.8)).unwrap();
/// registry.insert("KFCS", GeoPoint::new(38.7, -104.8)).unwrap();
///
/// let mut projector = Projector::new();
/// projector.set_resolution(1900, 1000).unwrap();
///
/// let events = vec![
///     Event::depart("C17 1", 1.0, "KBGR"),
///     Event::arrive("C17 1", 5.0, "KFCS"),
/// ];
/// let engine =
///     ReplayEngine::load(&events, &registry, projector, MissingLocationPolicy::Hide).unwrap();
///
/// let mut view = engine.view();
/// let state = view.query("C17 1", 3.0).unwrap();
/// assert_eq!(state.usage, Usage::Moving);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    data: Arc<ReplayData>,
}

impl ReplayEngine {
    /// Build a replay from a complete event log.
    ///
    /// The projector must have a resolution selected. Everything is
    /// validated here; queries on the returned engine never fail for
    /// reasons found in the log.
    pub fn load<R>(
        events: &[Event],
        registry: &R,
        projector: Projector,
        policy: MissingLocationPolicy,
    ) -> Result<Self, ReplayError>
    where
        R: LocationRegistry + ?Sized,
    {
        projector.viewport()?;

        let ingested = TimelineBuilder::ingest(events)?;

        let mut pixels: HashMap<String, PixelPoint> = HashMap::new();
        let mut missing: BTreeSet<String> = BTreeSet::new();
        let mut hidden: HashSet<String> = HashSet::new();

        for timeline in &ingested.timelines {
            for location in timeline.locations() {
                let node = canonical_name(&location);
                if !pixels.contains_key(node) && !missing.contains(node) {
                    match resolve_node(registry, &projector, &location) {
                        Some(point) => {
                            pixels.insert(node.to_string(), point);
                        }
                        None => {
                            missing.insert(node.to_string());
                        }
                    }
                }

                if missing.contains(node) {
                    if policy == MissingLocationPolicy::Abort {
                        return Err(ReplayError::UnknownLocation {
                            location: location.to_string(),
                            entity_id: timeline.entity_id().to_string(),
                        });
                    }
                    if hidden.insert(timeline.entity_id().to_string()) {
                        warn!(
                            entity = %timeline.entity_id(),
                            location = %location,
                            "Hiding entity with unplaceable location"
                        );
                    }
                }
            }
        }

        let inventory = InventoryReconstructor::from_events(events);

        let index = ingested
            .timelines
            .iter()
            .enumerate()
            .map(|(i, t)| (t.entity_id().to_string(), i))
            .collect();

        info!(
            entities = ingested.timelines.len(),
            legs = ingested.legs.len(),
            nodes = pixels.len(),
            missing = missing.len(),
            hidden = hidden.len(),
            cargo_nodes = inventory.len(),
            end_time = ingested.end_time,
            "Replay loaded"
        );

        Ok(Self {
            data: Arc::new(ReplayData {
                timelines: ingested.timelines,
                index,
                legs: ingested.legs,
                inventory,
                pixels,
                hidden,
                missing,
                projector,
                end_time: ingested.end_time,
            }),
        })
    }

    /// Load the event log and location file from disk.
    pub fn from_files(
        events_path: &Path,
        locations_path: &Path,
        projector: Projector,
        policy: MissingLocationPolicy,
    ) -> Result<Self, ReplayError> {
        let registry = StaticRegistry::load(locations_path)?;
        let events = load_events(events_path)?;
        Self::load(&events, &registry, projector, policy)
    }

    /// Shared replay state.
    pub fn data(&self) -> &Arc<ReplayData> {
        &self.data
    }

    /// A new view with its own query caches.
    pub fn view(&self) -> ReplayView {
        ReplayView::new(Arc::clone(&self.data))
    }

    /// A clock spanning the whole log.
    pub fn clock(&self, step: f64, speed: f64) -> Result<ReplayClock, ClockError> {
        ReplayClock::try_new(self.data.end_time, step, speed)
    }
}

fn resolve_node<R>(registry: &R, projector: &Projector, location: &str) -> Option<PixelPoint>
where
    R: LocationRegistry + ?Sized,
{
    let point = match registry.lookup(location) {
        Some(point) => point,
        None => {
            warn!(location = %location, "Location not found in registry");
            return None;
        }
    };
    match projector.project_point(point) {
        Ok(pixel) => Some(pixel),
        Err(e) => {
            warn!(location = %location, error = %e, "Location outside the projected region");
            None
        }
    }
}
