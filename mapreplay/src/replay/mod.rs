//! Replay facade.
//!
//! Ties the pieces together: an event log and a location registry go in,
//! per-entity and per-node point-in-time answers come out.
//!
//! ```text
//! events ─► TimelineBuilder ─┐
//!                            ├─► Arc<ReplayData> ─► ReplayView (caches) ─► EntityState
//! registry + Projector ──────┤                                         ─► Levels
//! events ─► Inventory ───────┘
//! ```
//!
//! [`ReplayData`] is immutable after [`ReplayEngine::load`] and shared through
//! an `Arc`. Mutable query caches live only in [`ReplayView`], one view per
//! viewer.

mod engine;
mod error;
mod view;

pub use engine::{MissingLocationPolicy, ReplayData, ReplayEngine};
pub use error::ReplayError;
pub use view::{EntityState, ReplayView};
