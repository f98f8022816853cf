//! Per-node cargo levels reconstructed from cargo movements.
//!
//! The event log records what moves in and out of a node, never what the
//! node held to begin with. The reconstruction picks, per commodity, the
//! smallest starting stock that keeps the running level non-negative:
//!
//! ```text
//! deltas:        +10   -15   +20
//! running sum:    10    -5    15     minimum -5
//! initial:         5
//! levels:         15     0    20
//! ```
//!
//! This is a heuristic estimate of unknown initial stock, not a ledger. A
//! node that really started with more cargo is shown with less; the shape of
//! the series is exact, its baseline is a lower bound.
//!
//! # Cargo deltas
//!
//! | Event    | Delta at its node       |
//! |----------|-------------------------|
//! | Arrive   | `+|quantity|`           |
//! | Depart   | `-|quantity|`           |
//! | Transfer | `quantity` as signed    |
//!
//! Events without a cargo record do not touch inventory. Nodes are keyed by
//! the location name with its suffix stripped.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::event::{Event, EventKind};
use crate::query::{Bracket, BracketCache, CacheStats, Timed};
use crate::registry::canonical_name;

/// Quantity per commodity.
pub type Levels = BTreeMap<String, f64>;

/// A change in one commodity at one node.
#[derive(Debug, Clone, PartialEq)]
pub struct CargoDelta {
    pub time: f64,
    pub commodity: String,
    pub amount: f64,
}

impl CargoDelta {
    /// Derive the delta an event applies, with the node it applies to.
    ///
    /// Returns `None` for events without cargo, unrecognized kinds and
    /// non-finite quantities.
    pub fn from_event(event: &Event) -> Option<(&str, CargoDelta)> {
        let cargo = event.cargo.as_ref()?;
        if !cargo.quantity.is_finite() {
            warn!(
                entity = %event.entity_id,
                time = event.time,
                "Ignoring non-finite cargo quantity"
            );
            return None;
        }

        let amount = match event.kind {
            EventKind::Arrive => cargo.quantity.abs(),
            EventKind::Depart => -cargo.quantity.abs(),
            EventKind::Transfer => cargo.quantity,
            EventKind::Unrecognized(_) => return None,
        };

        Some((
            event.node(),
            CargoDelta {
                time: event.time,
                commodity: cargo.commodity.clone(),
                amount,
            },
        ))
    }
}

/// Levels held from one cargo event until the next.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSample {
    pub time: f64,
    pub levels: Levels,
}

impl Timed for LevelSample {
    fn time(&self) -> f64 {
        self.time
    }
}

/// Step-function level series for one node.
///
/// Holds at least one sample. Every sample and the initial levels carry the
/// same set of commodities.
#[derive(Debug, Clone)]
pub struct LevelSeries {
    node: String,
    initial: Levels,
    samples: Vec<LevelSample>,
    maximums: Levels,
}

impl LevelSeries {
    /// Reconstruct a series from time-ordered deltas; `None` when empty.
    pub fn from_deltas(node: impl Into<String>, deltas: &[CargoDelta]) -> Option<Self> {
        if deltas.is_empty() {
            return None;
        }

        let mut running = Levels::new();
        let mut minimum = Levels::new();
        let mut prefix = Vec::with_capacity(deltas.len());
        for delta in deltas {
            let level = running.entry(delta.commodity.clone()).or_insert(0.0);
            *level += delta.amount;
            prefix.push(*level);
            let low = minimum.entry(delta.commodity.clone()).or_insert(0.0);
            if *level < *low {
                *low = *level;
            }
        }

        let initial: Levels = minimum
            .into_iter()
            .map(|(commodity, low)| (commodity, if low < 0.0 { -low } else { 0.0 }))
            .collect();

        let mut current = initial.clone();
        let mut maximums = initial.clone();
        let mut samples = Vec::with_capacity(deltas.len());
        for (delta, sum) in deltas.iter().zip(prefix) {
            // Same prefix sums as the minimum, so the lowest level is exactly zero
            let start = initial.get(&delta.commodity).copied().unwrap_or(0.0);
            if let Some(level) = current.get_mut(&delta.commodity) {
                *level = (start + sum).max(0.0);
                if let Some(max) = maximums.get_mut(&delta.commodity) {
                    if *level > *max {
                        *max = *level;
                    }
                }
            }
            samples.push(LevelSample {
                time: delta.time,
                levels: current.clone(),
            });
        }

        Some(Self {
            node: node.into(),
            initial,
            samples,
            maximums,
        })
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    /// Estimated levels before the first cargo event.
    pub fn initial(&self) -> &Levels {
        &self.initial
    }

    pub fn samples(&self) -> &[LevelSample] {
        &self.samples
    }

    /// Highest level reached per commodity, initial levels included.
    pub fn maximums(&self) -> &Levels {
        &self.maximums
    }

    pub fn commodities(&self) -> impl Iterator<Item = &str> {
        self.initial.keys().map(String::as_str)
    }

    /// Levels held over a bracket of this series.
    ///
    /// Within a bracket the value is the one after the last sample at or
    /// before the query time.
    pub fn levels_in(&self, bracket: Bracket) -> &Levels {
        let index = match bracket {
            Bracket::Before => return &self.initial,
            Bracket::Within { end, .. } => end.saturating_sub(1),
            Bracket::After => self.samples.len() - 1,
        };
        self.samples
            .get(index)
            .map(|sample| &sample.levels)
            .unwrap_or(&self.initial)
    }

    /// Levels at time `t`, without a cache.
    pub fn level_at(&self, t: f64) -> &Levels {
        self.levels_in(Bracket::locate(&self.samples, t))
    }
}

impl fmt::Display for LevelSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {} samples", self.node, self.samples.len())
    }
}

/// Level series for every node with cargo activity.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    series: BTreeMap<String, LevelSeries>,
}

impl Inventory {
    /// Series for a node; the location suffix is ignored.
    pub fn get(&self, node: &str) -> Option<&LevelSeries> {
        self.series.get(canonical_name(node))
    }

    /// Node names in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelSeries> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Builds an [`Inventory`] from an event log.
pub struct InventoryReconstructor;

impl InventoryReconstructor {
    /// Group cargo deltas by node, order them by time and reconstruct each
    /// node's series. Deltas at equal times keep their log order.
    pub fn from_events(events: &[Event]) -> Inventory {
        let mut by_node: BTreeMap<String, Vec<CargoDelta>> = BTreeMap::new();
        let mut skipped = 0usize;

        for event in events {
            match CargoDelta::from_event(event) {
                Some((node, delta)) => by_node.entry(node.to_string()).or_default().push(delta),
                None if event.cargo.is_some() => skipped += 1,
                None => {}
            }
        }

        let series: BTreeMap<String, LevelSeries> = by_node
            .into_iter()
            .filter_map(|(node, mut deltas)| {
                deltas.sort_by(|a, b| a.time.total_cmp(&b.time));
                let series = LevelSeries::from_deltas(node.clone(), &deltas)?;
                debug!(node = %node, initial = ?series.initial(), "Reconstructed cargo levels");
                Some((node, series))
            })
            .collect();

        info!(nodes = series.len(), skipped, "Inventory reconstructed");
        Inventory { series }
    }
}

/// Per-node level querier with its own bracket cache.
#[derive(Debug, Clone, Default)]
pub struct LevelQuery {
    cache: BracketCache,
}

impl LevelQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels held at time `t`.
    pub fn resolve<'a>(&mut self, series: &'a LevelSeries, t: f64) -> &'a Levels {
        let bracket = self.cache.locate(series.samples(), t);
        series.levels_in(bracket)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
