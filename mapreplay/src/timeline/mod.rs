//! Per-entity timelines built from the mission event log.
//!
//! # Data flow
//!
//! ```text
//! Vec<Event> ──► TimelineBuilder::ingest ──► Ingested { timelines, legs, end_time }
//!                (single pass, fails fast)     (read-only, shared by queriers)
//! ```
//!
//! Ingestion either succeeds completely or fails with an [`IngestError`];
//! nothing partially built is ever exposed to queries.

mod builder;
mod error;
mod model;

pub use builder::{Ingested, TimelineBuilder};
pub use error::{IngestError, OrderingViolation};
pub use model::{Leg, Move, Timeline};
