//! Ingestion error types.

use std::fmt;

use thiserror::Error;

/// How a depart/arrive sequence was broken.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderingViolation {
    /// Departed again without arriving.
    DepartWhileOpen { open_location: String },
    /// Arrived without a matching departure (outside the t=0 exception).
    ArriveWithoutDepart,
    /// The log ended while a departure was still open.
    UnclosedDeparture { location: String },
}

impl fmt::Display for OrderingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingViolation::DepartWhileOpen { open_location } => {
                write!(f, "departing again without arriving (open departure from {})", open_location)
            }
            OrderingViolation::ArriveWithoutDepart => write!(f, "arriving without leaving"),
            OrderingViolation::UnclosedDeparture { location } => {
                write!(f, "departure from {} never arrives", location)
            }
        }
    }
}

/// Errors raised while building timelines. All are fatal to the load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("Ordering error for '{entity_id}' at T{time}: {violation}")]
    Ordering {
        entity_id: String,
        time: f64,
        violation: OrderingViolation,
    },

    #[error("Unknown event kind '{kind}' for '{entity_id}' at T{time}")]
    UnknownEventKind {
        entity_id: String,
        kind: String,
        time: f64,
    },

    #[error("Invalid timestamp {time} for '{entity_id}'")]
    InvalidTimestamp { entity_id: String, time: f64 },
}
