//! Single-pass construction of timelines and legs from an event log.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::{IngestError, OrderingViolation};
use super::model::{Leg, Move, Timeline};
use crate::event::{Event, EventKind};

/// Result of ingesting a complete event log.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// One timeline per entity, in order of first appearance.
    pub timelines: Vec<Timeline>,
    /// Legs in the order their arrivals were logged.
    pub legs: Vec<Leg>,
    /// Latest timestamp across all events.
    pub end_time: f64,
}

impl Ingested {
    /// Find an entity's timeline.
    pub fn timeline(&self, entity_id: &str) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.entity_id() == entity_id)
    }
}

/// A departure waiting for its arrival.
#[derive(Debug, Clone)]
struct OpenDeparture {
    location: Arc<str>,
    time: f64,
}

/// Builds per-entity timelines and legs.
///
/// The builder owns and mutates timelines only while [`TimelineBuilder::ingest`]
/// runs; the returned [`Ingested`] value is handed to queriers read-only.
///
/// # Ordering rules
///
/// - A depart while the entity already has an open departure is an error.
/// - An arrive without an open departure is ignored at exactly T0 (the
///   entity starts the log in transit) and an error otherwise.
/// - A departure still open when the log ends is an error.
/// - Transfers never open or close a leg.
///
/// Every event, whatever its kind, becomes a [`Move`] in its entity's timeline.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    timelines: Vec<Timeline>,
    index: HashMap<String, usize>,
    open: HashMap<String, OpenDeparture>,
    legs: Vec<Leg>,
    end_time: f64,
    orphan_arrivals: usize,
}

impl TimelineBuilder {
    /// Ingest a complete event log in one pass.
    pub fn ingest(events: &[Event]) -> Result<Ingested, IngestError> {
        let mut builder = Self::default();
        for event in events {
            builder.push(event)?;
        }
        builder.finish()
    }

    fn push(&mut self, event: &Event) -> Result<(), IngestError> {
        if !event.time.is_finite() || event.time < 0.0 {
            return Err(IngestError::InvalidTimestamp {
                entity_id: event.entity_id.clone(),
                time: event.time,
            });
        }

        let location: Arc<str> = Arc::from(event.location.as_str());

        match &event.kind {
            EventKind::Depart => {
                if let Some(open) = self.open.get(&event.entity_id) {
                    return Err(IngestError::Ordering {
                        entity_id: event.entity_id.clone(),
                        time: event.time,
                        violation: OrderingViolation::DepartWhileOpen {
                            open_location: open.location.to_string(),
                        },
                    });
                }
                self.open.insert(
                    event.entity_id.clone(),
                    OpenDeparture {
                        location: Arc::clone(&location),
                        time: event.time,
                    },
                );
            }
            EventKind::Arrive => match self.open.remove(&event.entity_id) {
                Some(open) => self.legs.push(Leg {
                    entity_id: event.entity_id.clone(),
                    from: open.location,
                    to: Arc::clone(&location),
                    depart_time: open.time,
                    arrive_time: event.time,
                }),
                None if event.time == 0.0 => {
                    self.orphan_arrivals += 1;
                    debug!(entity = %event.entity_id, location = %event.location, "Entity starts in transit");
                }
                None => {
                    return Err(IngestError::Ordering {
                        entity_id: event.entity_id.clone(),
                        time: event.time,
                        violation: OrderingViolation::ArriveWithoutDepart,
                    });
                }
            },
            EventKind::Transfer => {}
            EventKind::Unrecognized(kind) => {
                return Err(IngestError::UnknownEventKind {
                    entity_id: event.entity_id.clone(),
                    kind: kind.clone(),
                    time: event.time,
                });
            }
        }

        let mv = Move::new(event.time, location);
        match self.index.get(&event.entity_id) {
            Some(&i) => self.timelines[i].insert(mv),
            None => {
                self.index
                    .insert(event.entity_id.clone(), self.timelines.len());
                self.timelines.push(Timeline::new(
                    event.entity_id.clone(),
                    event.model().to_string(),
                    mv,
                ));
            }
        }

        if event.time > self.end_time {
            self.end_time = event.time;
        }
        Ok(())
    }

    fn finish(self) -> Result<Ingested, IngestError> {
        // Report the earliest dangling departure so the error is deterministic
        let dangling = self.open.iter().min_by(|(a_id, a), (b_id, b)| {
            a.time
                .total_cmp(&b.time)
                .then_with(|| a_id.as_str().cmp(b_id.as_str()))
        });
        if let Some((entity_id, open)) = dangling {
            return Err(IngestError::Ordering {
                entity_id: entity_id.clone(),
                time: open.time,
                violation: OrderingViolation::UnclosedDeparture {
                    location: open.location.to_string(),
                },
            });
        }

        info!(
            entities = self.timelines.len(),
            legs = self.legs.len(),
            end_time = self.end_time,
            orphan_arrivals = self.orphan_arrivals,
            "Timelines built"
        );

        Ok(Ingested {
            timelines: self.timelines,
            legs: self.legs,
            end_time: self.end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg_pairs(ingested: &Ingested) -> Vec<(&str, &str)> {
        ingested.legs.iter().map(|leg| leg.endpoints()).collect()
    }

    #[test]
    fn test_single_leg() {
        let events = vec![
            Event::depart("A", 1.0, "KBGR"),
            Event::arrive("A", 5.0, "KFCS"),
        ];
        let ingested = TimelineBuilder::ingest(&events).unwrap();

        assert_eq!(leg_pairs(&ingested), vec![("KBGR", "KFCS")]);
        assert_eq!(ingested.legs[0].depart_time, 1.0);
        assert_eq!(ingested.legs[0].arrive_time, 5.0);
        assert_eq!(ingested.end_time, 5.0);
        assert_eq!(ingested.timeline("A").unwrap().len(), 2);
    }

    #[test]
    fn test_trailing_departure_is_ordering_error() {
        let events = vec![
            Event::depart("A", 1.0, "KBGR"),
            Event::arrive("A", 5.0, "KFCS"),
            Event::depart("A", 6.0, "KFCS"),
        ];
        let err = TimelineBuilder::ingest(&events).unwrap_err();
        assert_eq!(
            err,
            IngestError::Ordering {
                entity_id: "A".to_string(),
                time: 6.0,
                violation: OrderingViolation::UnclosedDeparture {
                    location: "KFCS".to_string()
                },
            }
        );
    }

    #[test]
    fn test_double_departure() {
        let events = vec![
            Event::depart("A", 1.0, "KBGR"),
            Event::depart("A", 2.0, "KFCS"),
        ];
        let err = TimelineBuilder::ingest(&events).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Ordering {
                violation: OrderingViolation::DepartWhileOpen { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_orphan_arrival_at_time_zero_is_ignored() {
        let events = vec![
            Event::arrive("A", 0.0, "KFCS"),
            Event::depart("A", 1.0, "KFCS"),
            Event::arrive("A", 2.0, "KGRK"),
        ];
        let ingested = TimelineBuilder::ingest(&events).unwrap();

        assert_eq!(leg_pairs(&ingested), vec![("KFCS", "KGRK")]);
        // The orphan arrival still places the entity at its origin
        let timeline = ingested.timeline("A").unwrap();
        assert_eq!(timeline.len(), 3);
        assert_eq!(&*timeline.first().location, "KFCS");
    }

    #[test]
    fn test_orphan_arrival_after_time_zero_fails() {
        let events = vec![Event::arrive("A", 0.5, "KFCS")];
        let err = TimelineBuilder::ingest(&events).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Ordering {
                violation: OrderingViolation::ArriveWithoutDepart,
                ..
            }
        ));
    }

    #[test]
    fn test_transfer_records_move_without_leg() {
        let events = vec![
            Event::transfer("A", 0.5, "KFCS").with_cargo("PAX", 10.0),
            Event::depart("A", 1.0, "KFCS"),
            Event::transfer("A", 1.5, "KFCS"),
            Event::arrive("A", 2.0, "KGRK"),
        ];
        let ingested = TimelineBuilder::ingest(&events).unwrap();

        assert_eq!(ingested.legs.len(), 1);
        assert_eq!(ingested.timeline("A").unwrap().len(), 4);
    }

    #[test]
    fn test_unknown_kind_fails() {
        let events = vec![Event::new(
            "A",
            EventKind::Unrecognized("teleport".to_string()),
            1.0,
            "KFCS",
        )];
        let err = TimelineBuilder::ingest(&events).unwrap_err();
        assert!(matches!(err, IngestError::UnknownEventKind { ref kind, .. } if kind == "teleport"));
    }

    #[test]
    fn test_invalid_timestamps() {
        for time in [-1.0, f64::NAN, f64::INFINITY] {
            let events = vec![Event::transfer("A", time, "KFCS")];
            assert!(matches!(
                TimelineBuilder::ingest(&events),
                Err(IngestError::InvalidTimestamp { .. })
            ));
        }
    }

    #[test]
    fn test_out_of_order_events_sorted_per_entity() {
        let events = vec![
            Event::transfer("A", 3.0, "Y"),
            Event::transfer("B", 0.0, "Z"),
            Event::transfer("A", 1.0, "X"),
        ];
        let ingested = TimelineBuilder::ingest(&events).unwrap();

        let ids: Vec<&str> = ingested.timelines.iter().map(|t| t.entity_id()).collect();
        assert_eq!(ids, vec!["A", "B"]);

        let a = ingested.timeline("A").unwrap();
        assert_eq!(&*a.first().location, "X");
        assert_eq!(&*a.last().location, "Y");
    }

    #[test]
    fn test_entities_tracked_independently() {
        let events = vec![
            Event::depart("A", 1.0, "P"),
            Event::depart("B", 1.0, "Q"),
            Event::arrive("B", 2.0, "R"),
            Event::arrive("A", 3.0, "S"),
        ];
        let ingested = TimelineBuilder::ingest(&events).unwrap();
        assert_eq!(leg_pairs(&ingested), vec![("Q", "R"), ("P", "S")]);
    }

    #[test]
    fn test_model_taken_from_first_event() {
        let events = vec![
            Event::transfer("C17 7", 0.0, "KFCS"),
            Event::transfer("C17 7", 1.0, "KFCS").with_model("B777"),
        ];
        let ingested = TimelineBuilder::ingest(&events).unwrap();
        assert_eq!(ingested.timeline("C17 7").unwrap().model(), "C17");
    }

    #[test]
    fn test_empty_log() {
        let ingested = TimelineBuilder::ingest(&[]).unwrap();
        assert!(ingested.timelines.is_empty());
        assert_eq!(ingested.end_time, 0.0);
    }
}
