//! Point-in-time queries over ordered samples.
//!
//! Every time-indexed series in the replay (entity timelines, inventory
//! level series) is answered the same way: find the [`Bracket`] surrounding
//! the query time, then derive the value from the bracket's endpoints.
//!
//! # Caching
//!
//! Replay time moves by small steps between frames, so the bracket found for
//! the previous frame usually still contains the new time. [`BracketCache`]
//! remembers the last bracket and tests containment in O(1) before falling
//! back to a binary search. Containment is direction-agnostic, so rewinding
//! or jumping needs no reset, and a miss only costs time: the result is the
//! same either way.
//!
//! Caches are per querier. Two viewers over the same timelines each own
//! their own caches.

mod position;
mod usage;

pub use position::{PixelLocator, PositionFix, PositionQuery};
pub use usage::{Usage, UsageSummary};

use thiserror::Error;
use tracing::trace;

use crate::timeline::Move;

/// A sample with a timestamp.
pub trait Timed {
    fn time(&self) -> f64;
}

impl Timed for Move {
    fn time(&self) -> f64 {
        self.time
    }
}

/// Position of a query time relative to a non-empty, time-ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    /// Earlier than the first sample.
    Before,
    /// Between two samples with `time[start] <= t < time[end]`.
    ///
    /// `start` is the first of the samples sharing the greatest time not
    /// after `t`; `end` is the first sample later than `t`. Samples between
    /// them at the start time are skipped, so moves `(2, A) (2, B) (3, B)`
    /// at `t = 2.5` bracket A to B rather than B to B.
    Within { start: usize, end: usize },
    /// At or after the last sample.
    After,
}

impl Bracket {
    /// Find the bracket for `t` with a binary search.
    ///
    /// An empty sequence or a NaN time yields [`Bracket::Before`].
    pub fn locate<T: Timed>(samples: &[T], t: f64) -> Bracket {
        let (first, last) = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => (first.time(), last.time()),
            _ => return Bracket::Before,
        };

        if t.is_nan() || t < first {
            return Bracket::Before;
        }
        if t >= last {
            return Bracket::After;
        }

        // first <= t < last, so 1 <= end < len
        let end = samples.partition_point(|s| s.time() <= t);
        let start_time = samples[end - 1].time();
        let start = samples.partition_point(|s| s.time() < start_time);
        Bracket::Within { start, end }
    }

    /// Whether this bracket is still the correct bracket for `t`.
    pub fn contains<T: Timed>(&self, samples: &[T], t: f64) -> bool {
        let (first, last) = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => (first.time(), last.time()),
            _ => return false,
        };

        match *self {
            Bracket::Before => t < first,
            Bracket::After => t >= last,
            Bracket::Within { start, end } => {
                if start >= end || end >= samples.len() {
                    return false;
                }
                let start_time = samples[start].time();
                let tie_group_ok = (start == 0 || samples[start - 1].time() < start_time)
                    && samples[end - 1].time() == start_time;
                tie_group_ok && start_time <= t && t < samples[end].time()
            }
        }
    }
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Remembers the last bracket found for one series.
#[derive(Debug, Clone, Default)]
pub struct BracketCache {
    last: Option<Bracket>,
    stats: CacheStats,
}

impl BracketCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the bracket for `t`, reusing the cached bracket when it still applies.
    pub fn locate<T: Timed>(&mut self, samples: &[T], t: f64) -> Bracket {
        if let Some(cached) = self.last {
            if cached.contains(samples, t) {
                self.stats.hits += 1;
                return cached;
            }
        }

        self.stats.misses += 1;
        let bracket = Bracket::locate(samples, t);
        trace!(?bracket, t, "Bracket cache miss");
        self.last = Some(bracket);
        bracket
    }

    /// The most recently returned bracket.
    pub fn last(&self) -> Option<Bracket> {
        self.last
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Forget the cached bracket; counters are kept.
    pub fn clear(&mut self) {
        self.last = None;
    }
}

/// Errors from a single point-in-time query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A referenced location has no pixel position.
    #[error("Location '{0}' has no resolved position")]
    UnresolvedLocation(String),
}
