//! Replay error types.

use thiserror::Error;

use crate::clock::ClockError;
use crate::coord::CoordError;
use crate::event::EventLogError;
use crate::query::QueryError;
use crate::registry::RegistryError;
use crate::timeline::IngestError;

/// Errors loading or querying a replay.
///
/// Load errors are raised once from [`super::ReplayEngine::load`]; no
/// partially built replay is ever returned. The unknown-entity, unknown-node
/// and invalid-time variants are caller contract violations.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Projection error: {0}")]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    EventLog(#[from] EventLogError),

    #[error("Unknown location '{location}' referenced by '{entity_id}'")]
    UnknownLocation { location: String, entity_id: String },

    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("No cargo activity recorded at node '{0}'")]
    UnknownNode(String),

    #[error("Invalid query time: {0}")]
    InvalidTime(f64),
}

impl ReplayError {
    /// Whether the error comes from loading rather than querying.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ReplayError::Coord(_)
                | ReplayError::Ingest(_)
                | ReplayError::Registry(_)
                | ReplayError::EventLog(_)
                | ReplayError::UnknownLocation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_location_display() {
        let err = ReplayError::UnknownLocation {
            location: "ZZZZ_1".to_string(),
            entity_id: "C17 4".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown location 'ZZZZ_1' referenced by 'C17 4'"
        );
        assert!(err.is_load_error());
    }

    #[test]
    fn test_conversions() {
        let err: ReplayError = CoordError::NotConfigured.into();
        assert!(matches!(err, ReplayError::Coord(CoordError::NotConfigured)));

        let err: ReplayError = QueryError::UnresolvedLocation("X".to_string()).into();
        assert!(!err.is_load_error());
    }
}
