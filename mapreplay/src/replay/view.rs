//! Per-viewer query surface.

use std::collections::HashMap;
use std::sync::Arc;

use super::engine::ReplayData;
use super::error::ReplayError;
use crate::coord::PixelPoint;
use crate::event::EntityKind;
use crate::inventory::{LevelQuery, Levels};
use crate::query::{Bracket, CacheStats, PositionQuery, Usage, UsageSummary};
use crate::timeline::Move;

/// State of one entity at one query time.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub entity_id: String,
    pub kind: EntityKind,
    /// Pixel position; `None` when the entity is hidden.
    pub position: Option<PixelPoint>,
    pub usage: Usage,
    /// Location the entity is at, or is leaving.
    pub location: Arc<str>,
    /// Destination while moving.
    pub heading_to: Option<Arc<str>>,
}

impl EntityState {
    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }
}

/// Queries over a loaded replay.
///
/// Each view owns one position cache per entity and one level cache per
/// node. Views are cheap; create one per independent viewer rather than
/// sharing one.
#[derive(Debug)]
pub struct ReplayView {
    data: Arc<ReplayData>,
    positions: Vec<PositionQuery>,
    levels: HashMap<String, LevelQuery>,
}

impl ReplayView {
    pub(crate) fn new(data: Arc<ReplayData>) -> Self {
        let positions = (0..data.entity_count()).map(|_| PositionQuery::new()).collect();
        Self {
            data,
            positions,
            levels: HashMap::new(),
        }
    }

    pub fn data(&self) -> &Arc<ReplayData> {
        &self.data
    }

    /// State of an entity at time `t`.
    pub fn query(&mut self, entity_id: &str, t: f64) -> Result<EntityState, ReplayError> {
        check_time(t)?;
        let index = self
            .data
            .timeline_index(entity_id)
            .ok_or_else(|| ReplayError::UnknownEntity(entity_id.to_string()))?;
        self.query_index(index, t)
    }

    /// States of every entity at time `t`, in log order.
    pub fn query_all(&mut self, t: f64) -> Result<Vec<EntityState>, ReplayError> {
        check_time(t)?;
        (0..self.positions.len())
            .map(|index| self.query_index(index, t))
            .collect()
    }

    /// Entity counts per usage and kind at time `t`.
    pub fn usage_summary(&mut self, t: f64) -> Result<UsageSummary, ReplayError> {
        let mut summary = UsageSummary::new();
        for state in self.query_all(t)? {
            summary.record(state.usage, state.kind);
        }
        Ok(summary)
    }

    /// Cargo levels at a node at time `t`. The location suffix is ignored.
    pub fn query_level(&mut self, node: &str, t: f64) -> Result<Levels, ReplayError> {
        check_time(t)?;
        let series = self
            .data
            .inventory()
            .get(node)
            .ok_or_else(|| ReplayError::UnknownNode(node.to_string()))?;
        let query = self.levels.entry(series.node().to_string()).or_default();
        Ok(query.resolve(series, t).clone())
    }

    /// Combined cache counters across all entity and node caches.
    pub fn cache_stats(&self) -> CacheStats {
        let positions = self.positions.iter().map(PositionQuery::cache_stats);
        let levels = self.levels.values().map(LevelQuery::cache_stats);
        positions
            .chain(levels)
            .fold(CacheStats::default(), |acc, s| CacheStats {
                hits: acc.hits + s.hits,
                misses: acc.misses + s.misses,
            })
    }

    fn query_index(&mut self, index: usize, t: f64) -> Result<EntityState, ReplayError> {
        let timeline = &self.data.timelines()[index];
        let query = &mut self.positions[index];

        let (position, bracket, location, heading_to) =
            if self.data.is_hidden(timeline.entity_id()) {
                let bracket = query.locate(timeline, t);
                let (location, heading_to) = referenced(timeline.moves(), bracket);
                (None, bracket, location, heading_to)
            } else {
                let fix = query.resolve(timeline, self.data.pixels(), t)?;
                (Some(fix.point), fix.bracket, fix.location, fix.heading_to)
            };

        Ok(EntityState {
            entity_id: timeline.entity_id().to_string(),
            kind: timeline.kind(),
            position,
            usage: Usage::classify(timeline.moves(), bracket),
            location,
            heading_to,
        })
    }
}

fn check_time(t: f64) -> Result<(), ReplayError> {
    if t.is_nan() {
        return Err(ReplayError::InvalidTime(t));
    }
    Ok(())
}

/// Locations named by a bracket, without pixel resolution.
fn referenced(moves: &[Move], bracket: Bracket) -> (Arc<str>, Option<Arc<str>>) {
    let at = |i: usize| Arc::clone(&moves[i].location);
    match bracket {
        Bracket::Before => (at(0), None),
        Bracket::After => (at(moves.len() - 1), None),
        Bracket::Within { start, end } => {
            if moves[start].same_node(&moves[end]) {
                (at(start), None)
            } else {
                (at(start), Some(at(end)))
            }
        }
    }
}
