//! Timeline data types.

use std::fmt;
use std::sync::Arc;

use crate::event::EntityKind;
use crate::registry::canonical_name;

/// One waypoint in an entity's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    /// Simulation time in days.
    pub time: f64,
    /// Location key as logged, suffix included.
    pub location: Arc<str>,
}

impl Move {
    /// Create a new move.
    pub fn new(time: f64, location: impl Into<Arc<str>>) -> Self {
        Self {
            time,
            location: location.into(),
        }
    }

    /// Physical node of this move (suffix stripped).
    pub fn node(&self) -> &str {
        canonical_name(&self.location)
    }

    /// Whether two moves are at the same physical node.
    pub fn same_node(&self, other: &Move) -> bool {
        self.node() == other.node()
    }
}

/// Time-ordered waypoints of a single entity.
///
/// Always holds at least one move. Times are non-decreasing; moves with equal
/// times keep their ingestion order.
#[derive(Debug, Clone)]
pub struct Timeline {
    entity_id: String,
    model: String,
    kind: EntityKind,
    moves: Vec<Move>,
}

impl Timeline {
    /// Start a timeline with its first move.
    pub(crate) fn new(entity_id: String, model: String, first: Move) -> Self {
        let kind = EntityKind::from_model(&model);
        Self {
            entity_id,
            model,
            kind,
            moves: vec![first],
        }
    }

    /// Build a timeline from moves in any order; ties keep the given order.
    ///
    /// Returns `None` for an empty move list.
    pub fn from_moves(
        entity_id: impl Into<String>,
        model: impl Into<String>,
        moves: impl IntoIterator<Item = Move>,
    ) -> Option<Self> {
        let mut iter = moves.into_iter();
        let mut timeline = Self::new(entity_id.into(), model.into(), iter.next()?);
        for mv in iter {
            timeline.insert(mv);
        }
        Some(timeline)
    }

    /// Insert a move after every move with a time less than or equal to it.
    pub(crate) fn insert(&mut self, mv: Move) {
        let index = self.moves.partition_point(|existing| existing.time <= mv.time);
        self.moves.insert(index, mv);
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn first(&self) -> &Move {
        &self.moves[0]
    }

    pub fn last(&self) -> &Move {
        &self.moves[self.moves.len() - 1]
    }

    /// Time of the first move.
    pub fn start_time(&self) -> f64 {
        self.first().time
    }

    /// Time of the last move.
    pub fn end_time(&self) -> f64 {
        self.last().time
    }

    /// Distinct location keys referenced by this timeline, in first-seen order.
    pub fn locations(&self) -> Vec<Arc<str>> {
        let mut seen: Vec<Arc<str>> = Vec::new();
        for mv in &self.moves {
            if !seen.iter().any(|loc| *loc == mv.location) {
                seen.push(Arc::clone(&mv.location));
            }
        }
        seen
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) with {} moves",
            self.entity_id,
            self.model,
            self.moves.len()
        )
    }
}

/// A point-to-point movement inferred from a matched depart/arrive pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub entity_id: String,
    pub from: Arc<str>,
    pub to: Arc<str>,
    pub depart_time: f64,
    pub arrive_time: f64,
}

impl Leg {
    /// `(start, end)` location keys.
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.from, &self.to)
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} (T{:.3} to T{:.3})",
            self.entity_id, self.from, self.to, self.depart_time, self.arrive_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_time_order_and_stable_ties() {
        let timeline = Timeline::from_moves(
            "C17 1",
            "C17",
            vec![
                Move::new(5.0, "C"),
                Move::new(1.0, "A"),
                Move::new(3.0, "B1"),
                Move::new(3.0, "B2"),
                Move::new(3.0, "B3"),
            ],
        )
        .unwrap();

        let order: Vec<&str> = timeline.moves().iter().map(|m| &*m.location).collect();
        assert_eq!(order, vec!["A", "B1", "B2", "B3", "C"]);
        assert_eq!(timeline.start_time(), 1.0);
        assert_eq!(timeline.end_time(), 5.0);
    }

    #[test]
    fn test_from_moves_empty() {
        assert!(Timeline::from_moves("X", "X", Vec::new()).is_none());
    }

    #[test]
    fn test_kind_from_model() {
        let timeline = Timeline::from_moves("S 1", "LMSR", vec![Move::new(0.0, "A")]).unwrap();
        assert_eq!(timeline.kind(), EntityKind::Ship);
        assert_eq!(timeline.to_string(), "S 1 (LMSR) with 1 moves");
    }

    #[test]
    fn test_same_node_ignores_suffix() {
        assert!(Move::new(0.0, "KFCS_1").same_node(&Move::new(1.0, "KFCS_2")));
        assert!(!Move::new(0.0, "KFCS").same_node(&Move::new(1.0, "KGRK")));
    }

    #[test]
    fn test_locations_distinct() {
        let timeline = Timeline::from_moves(
            "T 1",
            "truck",
            vec![
                Move::new(0.0, "A"),
                Move::new(1.0, "B"),
                Move::new(2.0, "A"),
            ],
        )
        .unwrap();
        let locations: Vec<String> = timeline.locations().iter().map(|l| l.to_string()).collect();
        assert_eq!(locations, vec!["A", "B"]);
    }
}
