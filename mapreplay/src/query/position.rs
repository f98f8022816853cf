//! Interpolated entity positions.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Bracket, BracketCache, CacheStats, QueryError};
use crate::coord::PixelPoint;
use crate::registry::canonical_name;
use crate::timeline::{Move, Timeline};

/// Source of pixel positions for location keys.
pub trait PixelLocator {
    /// Pixel position of a location key, suffix included.
    fn pixel(&self, location: &str) -> Option<PixelPoint>;
}

/// Tables are keyed by physical node name.
impl PixelLocator for HashMap<String, PixelPoint> {
    fn pixel(&self, location: &str) -> Option<PixelPoint> {
        self.get(canonical_name(location)).copied()
    }
}

/// Position of an entity at one query time.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    pub point: PixelPoint,
    /// Location the entity is at, or is leaving.
    pub location: Arc<str>,
    /// Destination while moving between two nodes.
    pub heading_to: Option<Arc<str>>,
    /// Fraction of the current leg covered, while moving.
    pub progress: Option<f64>,
    /// Bracket the fix was derived from.
    pub bracket: Bracket,
}

impl PositionFix {
    fn stationary(mv: &Move, point: PixelPoint, bracket: Bracket) -> Self {
        Self {
            point,
            location: Arc::clone(&mv.location),
            heading_to: None,
            progress: None,
            bracket,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.heading_to.is_some()
    }
}

/// Per-entity position querier.
///
/// Owns a [`BracketCache`] and the last stationary fix, so consecutive
/// frames inside one bracket cost a containment test. The timeline itself is
/// borrowed for each call and never modified.
///
/// # Example
///
/// ```text
/// moves:  (0, KFCS) (2, KFCS) (2, KGRK) (5, KGRK)
/// t=1   → at KFCS
/// t=3.5 → halfway KFCS → KGRK
/// t=6   → at KGRK
/// ```
#[derive(Debug, Clone, Default)]
pub struct PositionQuery {
    cache: BracketCache,
    memo: Option<PositionFix>,
}

impl PositionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the entity's position at time `t`.
    ///
    /// Returns [`QueryError::UnresolvedLocation`] when a referenced location
    /// has no pixel position in `locator`.
    pub fn resolve<L>(
        &mut self,
        timeline: &Timeline,
        locator: &L,
        t: f64,
    ) -> Result<PositionFix, QueryError>
    where
        L: PixelLocator + ?Sized,
    {
        let moves = timeline.moves();
        let bracket = self.cache.locate(moves, t);

        if let Some(memo) = &self.memo {
            if memo.bracket == bracket && !memo.is_moving() {
                return Ok(memo.clone());
            }
        }

        let fix = match bracket {
            Bracket::Before => {
                let first = timeline.first();
                PositionFix::stationary(first, pixel_of(locator, first)?, bracket)
            }
            Bracket::After => {
                let last = timeline.last();
                PositionFix::stationary(last, pixel_of(locator, last)?, bracket)
            }
            Bracket::Within { start, end } => {
                let from = &moves[start];
                let to = &moves[end];
                if from.same_node(to) {
                    PositionFix::stationary(from, pixel_of(locator, from)?, bracket)
                } else {
                    let ratio = (t - from.time) / (to.time - from.time);
                    let point = pixel_of(locator, from)?.lerp(pixel_of(locator, to)?, ratio);
                    PositionFix {
                        point,
                        location: Arc::clone(&from.location),
                        heading_to: Some(Arc::clone(&to.location)),
                        progress: Some(ratio),
                        bracket,
                    }
                }
            }
        };

        self.memo = Some(fix.clone());
        Ok(fix)
    }

    /// Locate the bracket for `t` without resolving pixels.
    ///
    /// Shares the cache with [`PositionQuery::resolve`], for entities that
    /// are tracked but not drawn.
    pub fn locate(&mut self, timeline: &Timeline, t: f64) -> Bracket {
        self.cache.locate(timeline.moves(), t)
    }

    /// Bracket used by the most recent query.
    pub fn last_bracket(&self) -> Option<Bracket> {
        self.cache.last()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn pixel_of<L>(locator: &L, mv: &Move) -> Result<PixelPoint, QueryError>
where
    L: PixelLocator + ?Sized,
{
    locator
        .pixel(&mv.location)
        .ok_or_else(|| QueryError::UnresolvedLocation(mv.location.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels() -> HashMap<String, PixelPoint> {
        let mut table = HashMap::new();
        table.insert("KFCS".to_string(), PixelPoint::new(100.0, 200.0));
        table.insert("KGRK".to_string(), PixelPoint::new(300.0, 400.0));
        table.insert("KBGR".to_string(), PixelPoint::new(0.0, 0.0));
        table
    }

    fn scenario() -> Timeline {
        Timeline::from_moves(
            "C17 1",
            "C17",
            vec![
                Move::new(0.0, "KFCS"),
                Move::new(2.0, "KFCS"),
                Move::new(2.0, "KGRK"),
                Move::new(5.0, "KGRK"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_scenario_positions() {
        let timeline = scenario();
        let table = pixels();
        let mut query = PositionQuery::new();

        let at_origin = query.resolve(&timeline, &table, 1.0).unwrap();
        assert_eq!(at_origin.point, PixelPoint::new(100.0, 200.0));
        assert_eq!(&*at_origin.location, "KFCS");
        assert!(!at_origin.is_moving());

        let halfway = query.resolve(&timeline, &table, 3.5).unwrap();
        assert_eq!(halfway.point, PixelPoint::new(200.0, 300.0));
        assert_eq!(halfway.heading_to.as_deref(), Some("KGRK"));
        assert_eq!(halfway.progress, Some(0.5));

        // Leaving at the shared timestamp starts from the origin
        let leaving = query.resolve(&timeline, &table, 2.0).unwrap();
        assert_eq!(leaving.point, PixelPoint::new(100.0, 200.0));
        assert_eq!(leaving.progress, Some(0.0));
        assert_eq!(leaving.heading_to.as_deref(), Some("KGRK"));

        let landing = query.resolve(&timeline, &table, 5.0 - 1e-9).unwrap();
        assert!((landing.point.x - 300.0).abs() < 1e-6);
        assert!((landing.point.y - 400.0).abs() < 1e-6);
        assert!(landing.is_moving());

        let done = query.resolve(&timeline, &table, 6.0).unwrap();
        assert_eq!(done.point, PixelPoint::new(300.0, 400.0));
        assert_eq!(&*done.location, "KGRK");
    }

    #[test]
    fn test_clamps_before_first_and_after_last() {
        let timeline = Timeline::from_moves(
            "A",
            "truck",
            vec![Move::new(1.0, "KBGR"), Move::new(3.0, "KFCS")],
        )
        .unwrap();
        let table = pixels();
        let mut query = PositionQuery::new();

        let before = query.resolve(&timeline, &table, 0.0).unwrap();
        assert_eq!(before.point, PixelPoint::new(0.0, 0.0));
        assert_eq!(before.bracket, Bracket::Before);

        let after = query.resolve(&timeline, &table, 10.0).unwrap();
        assert_eq!(after.point, PixelPoint::new(100.0, 200.0));
        assert_eq!(after.bracket, Bracket::After);
    }

    #[test]
    fn test_suffixed_locations_resolve_to_node() {
        let timeline = Timeline::from_moves(
            "A",
            "ship",
            vec![Move::new(0.0, "KFCS_2"), Move::new(1.0, "KGRK_1")],
        )
        .unwrap();
        let mut query = PositionQuery::new();

        let fix = query.resolve(&timeline, &pixels(), 0.5).unwrap();
        assert_eq!(fix.point, PixelPoint::new(200.0, 300.0));
        assert_eq!(&*fix.location, "KFCS_2");
    }

    #[test]
    fn test_unresolved_location() {
        let timeline = Timeline::from_moves(
            "A",
            "ship",
            vec![Move::new(0.0, "KFCS"), Move::new(1.0, "NOWHERE")],
        )
        .unwrap();
        let mut query = PositionQuery::new();

        let err = query.resolve(&timeline, &pixels(), 0.5).unwrap_err();
        assert_eq!(err, QueryError::UnresolvedLocation("NOWHERE".to_string()));
        // The stationary start is still answerable
        assert!(query.resolve(&timeline, &pixels(), -1.0).is_ok());
    }

    #[test]
    fn test_stationary_memo_hits_cache() {
        let timeline = scenario();
        let table = pixels();
        let mut query = PositionQuery::new();

        for step in 0..10 {
            query.resolve(&timeline, &table, 0.1 * step as f64).unwrap();
        }
        let stats = query.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 9);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_answers_independent_of_history(
                history in prop::collection::vec(-2.0..8.0_f64, 0..30),
                t in -2.0..8.0_f64,
            ) {
                let timeline = scenario();
                let table = pixels();

                let mut warmed = PositionQuery::new();
                for h in history {
                    warmed.resolve(&timeline, &table, h).unwrap();
                }
                let mut fresh = PositionQuery::new();

                prop_assert_eq!(
                    warmed.resolve(&timeline, &table, t).unwrap(),
                    fresh.resolve(&timeline, &table, t).unwrap()
                );
            }

            #[test]
            fn test_progress_monotone_within_leg(a in 2.0..5.0_f64, b in 2.0..5.0_f64) {
                let timeline = scenario();
                let table = pixels();
                let mut query = PositionQuery::new();

                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                let p_lo = query.resolve(&timeline, &table, lo).unwrap();
                let p_hi = query.resolve(&timeline, &table, hi).unwrap();

                prop_assert!(p_lo.point.x <= p_hi.point.x);
                prop_assert!(p_lo.point.y <= p_hi.point.y);
                prop_assert!(p_lo.progress.unwrap() <= p_hi.progress.unwrap());
            }

            #[test]
            fn test_clamped_outside_timeline(t in -100.0..0.0_f64, u in 5.0..100.0_f64) {
                let timeline = scenario();
                let table = pixels();
                let mut query = PositionQuery::new();

                let first = query.resolve(&timeline, &table, 0.0).unwrap();
                let before = query.resolve(&timeline, &table, t).unwrap();
                prop_assert_eq!(before.point, first.point);
                prop_assert_eq!(before.location, first.location);

                let last = query.resolve(&timeline, &table, 5.0).unwrap();
                let after = query.resolve(&timeline, &table, u).unwrap();
                prop_assert_eq!(after, last);
            }
        }
    }
}
