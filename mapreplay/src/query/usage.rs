//! What an entity is doing at a point in time.

use std::collections::BTreeMap;
use std::fmt;

use super::Bracket;
use crate::event::EntityKind;
use crate::timeline::Move;

/// Activity of an entity at a query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Usage {
    /// Waiting at a node, before its first move or between legs.
    Loading,
    /// Travelling between two different nodes.
    Moving,
    /// Past its last move.
    Done,
}

impl Usage {
    pub const ALL: [Usage; 3] = [Usage::Loading, Usage::Moving, Usage::Done];

    /// Classify from the bracket shared with the position query.
    ///
    /// A bracket that does not index into `moves` classifies as `Loading`.
    pub fn classify(moves: &[Move], bracket: Bracket) -> Usage {
        match bracket {
            Bracket::Before => Usage::Loading,
            Bracket::After => Usage::Done,
            Bracket::Within { start, end } => match (moves.get(start), moves.get(end)) {
                (Some(from), Some(to)) if !from.same_node(to) => Usage::Moving,
                _ => Usage::Loading,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Usage::Loading => "Loading",
            Usage::Moving => "Moving",
            Usage::Done => "Done",
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entity counts per (usage, kind) at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageSummary {
    counts: BTreeMap<(Usage, EntityKind), usize>,
}

impl UsageSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one entity.
    pub fn record(&mut self, usage: Usage, kind: EntityKind) {
        *self.counts.entry((usage, kind)).or_insert(0) += 1;
    }

    pub fn count(&self, usage: Usage, kind: EntityKind) -> usize {
        self.counts.get(&(usage, kind)).copied().unwrap_or(0)
    }

    /// Entities with this usage, all kinds.
    pub fn total(&self, usage: Usage) -> usize {
        self.counts
            .iter()
            .filter(|((u, _), _)| *u == usage)
            .map(|(_, n)| n)
            .sum()
    }

    /// Entities of this kind, all usages.
    pub fn total_kind(&self, kind: EntityKind) -> usize {
        self.counts
            .iter()
            .filter(|((_, k), _)| *k == kind)
            .map(|(_, n)| n)
            .sum()
    }

    /// Non-zero counts in (usage, kind) order.
    pub fn iter(&self) -> impl Iterator<Item = (Usage, EntityKind, usize)> + '_ {
        self.counts.iter().map(|(&(u, k), &n)| (u, k, n))
    }
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Usage::ALL
            .iter()
            .map(|usage| format!("{}: {}", usage, self.total(*usage)))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::BracketCache;

    fn scenario() -> Vec<Move> {
        vec![
            Move::new(0.0, "KFCS"),
            Move::new(2.0, "KFCS"),
            Move::new(2.0, "KGRK"),
            Move::new(5.0, "KGRK"),
        ]
    }

    #[test]
    fn test_zero_duration_hop_reads_as_moving() {
        let moves = vec![Move::new(2.0, "A"), Move::new(2.0, "B"), Move::new(3.0, "B")];
        let bracket = Bracket::locate(&moves, 2.5);
        assert_eq!(bracket, Bracket::Within { start: 0, end: 2 });
        assert_eq!(Usage::classify(&moves, bracket), Usage::Moving);
    }

    #[test]
    fn test_scenario_usage() {
        let moves = scenario();
        let at = |t| Usage::classify(&moves, Bracket::locate(&moves, t));

        assert_eq!(at(-1.0), Usage::Loading);
        assert_eq!(at(1.0), Usage::Loading);
        assert_eq!(at(3.5), Usage::Moving);
        assert_eq!(at(5.0), Usage::Done);
        assert_eq!(at(6.0), Usage::Done);
    }

    #[test]
    fn test_suffix_does_not_count_as_movement() {
        let moves = vec![Move::new(0.0, "KFCS_1"), Move::new(1.0, "KFCS_2")];
        let bracket = BracketCache::new().locate(&moves, 0.5);
        assert_eq!(Usage::classify(&moves, bracket), Usage::Loading);
    }

    #[test]
    fn test_foreign_bracket_is_loading() {
        let moves = scenario();
        assert_eq!(
            Usage::classify(&moves, Bracket::Within { start: 7, end: 9 }),
            Usage::Loading
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = UsageSummary::new();
        summary.record(Usage::Moving, EntityKind::Airplane);
        summary.record(Usage::Moving, EntityKind::Airplane);
        summary.record(Usage::Moving, EntityKind::Ship);
        summary.record(Usage::Done, EntityKind::Truck);

        assert_eq!(summary.count(Usage::Moving, EntityKind::Airplane), 2);
        assert_eq!(summary.count(Usage::Loading, EntityKind::Airplane), 0);
        assert_eq!(summary.total(Usage::Moving), 3);
        assert_eq!(summary.total_kind(EntityKind::Truck), 1);
        assert_eq!(summary.to_string(), "Loading: 0, Moving: 3, Done: 1");
        assert_eq!(summary.iter().count(), 3);
    }
}
