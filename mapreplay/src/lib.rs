//! MapReplay - time-scrubbable replay of finished mission simulations
//!
//! This library turns a simulation's event log into a continuous-time model
//! that answers, for any replay time, where each entity is, what it is doing
//! and how much cargo each node holds, projected onto a map in screen space.
//!
//! # Modules
//!
//! - [`coord`]: latitude/longitude to pixel projection
//! - [`event`]: event records and the JSON log format
//! - [`registry`]: location name lookup
//! - [`timeline`]: per-entity timelines and legs
//! - [`query`]: cached point-in-time position and usage queries
//! - [`inventory`]: reconstructed cargo levels per node
//! - [`clock`]: the replay clock
//! - [`replay`]: the facade tying these together
//! - [`config`], [`logging`]: ambient setup

pub mod clock;
pub mod config;
pub mod coord;
pub mod event;
pub mod inventory;
pub mod logging;
pub mod query;
pub mod registry;
pub mod replay;
pub mod timeline;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
