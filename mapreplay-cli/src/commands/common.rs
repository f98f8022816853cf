//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use mapreplay::clock::format_clock;
use mapreplay::config::{ConfigFile, MapSettings};
use mapreplay::replay::{EntityState, MissingLocationPolicy, ReplayEngine};
use tracing::debug;

use crate::error::CliError;

/// Handling of locations that cannot be placed on the map.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum MissingPolicy {
    /// Hide entities that reference them and keep going
    Hide,
    /// Refuse to load the replay
    Abort,
}

impl From<MissingPolicy> for MissingLocationPolicy {
    fn from(policy: MissingPolicy) -> Self {
        match policy {
            MissingPolicy::Hide => MissingLocationPolicy::Hide,
            MissingPolicy::Abort => MissingLocationPolicy::Abort,
        }
    }
}

/// Input files and map settings shared by every replay command.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Event log (JSON array of event records)
    #[arg(short, long)]
    pub events: PathBuf,

    /// Location table (JSON array of named coordinates)
    #[arg(short, long)]
    pub locations: PathBuf,

    /// Southern edge of the map crop in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub crop_lat: Option<f64>,

    /// Western edge of the map crop in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub crop_lon: Option<f64>,

    /// Zoom factor (1 shows the whole world)
    #[arg(long)]
    pub zoom: Option<u32>,

    /// Available screen width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Available screen height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// What to do with locations that cannot be placed
    #[arg(long, value_enum)]
    pub missing: Option<MissingPolicy>,
}

impl InputArgs {
    /// Map settings with CLI arguments taking precedence over config.
    pub fn resolve_map(&self, config: &ConfigFile) -> MapSettings {
        let map = &config.map;
        MapSettings {
            crop_min_lat: self.crop_lat.unwrap_or(map.crop_min_lat),
            crop_min_lon: self.crop_lon.unwrap_or(map.crop_min_lon),
            zoom: self.zoom.unwrap_or(map.zoom),
            max_width: self.width.unwrap_or(map.max_width),
            max_height: self.height.unwrap_or(map.max_height),
        }
    }

    /// Missing-location policy: CLI, then config.
    pub fn resolve_policy(&self, config: &ConfigFile) -> MissingLocationPolicy {
        self.missing
            .map(MissingLocationPolicy::from)
            .unwrap_or(config.replay.missing_locations)
    }
}

/// Load a replay from the input files.
pub fn load_engine(inputs: &InputArgs, config: &ConfigFile) -> Result<ReplayEngine, CliError> {
    let map = inputs.resolve_map(config);
    let projector = map.projector()?;
    let policy = inputs.resolve_policy(config);

    let engine = ReplayEngine::from_files(&inputs.events, &inputs.locations, projector, policy)?;

    let data = engine.data();
    debug!(
        entities = data.entity_count(),
        legs = data.legs().len(),
        hidden = data.hidden_count(),
        end = %format_clock(data.end_time()),
        "Replay ready"
    );
    Ok(engine)
}

/// Parse a replay time given either in days (`2.5`) or as `D:HH:MM`.
pub fn parse_time(s: &str) -> Result<f64, String> {
    let s = s.trim();
    if let Ok(days) = s.parse::<f64>() {
        return if days.is_finite() {
            Ok(days)
        } else {
            Err(format!("invalid time '{}'", s))
        };
    }

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("invalid time '{}' (expected days or D:HH:MM)", s));
    }
    let field = |text: &str, name: &str| {
        text.parse::<u32>()
            .map_err(|_| format!("invalid {} '{}' in time '{}'", name, text, s))
    };
    let day = field(parts[0], "day")?;
    let hours = field(parts[1], "hour")?;
    let minutes = field(parts[2], "minute")?;
    if day == 0 || hours > 23 || minutes > 59 {
        return Err(format!("time '{}' out of range", s));
    }

    Ok((day - 1) as f64 + hours as f64 / 24.0 + minutes as f64 / 1440.0)
}

/// One line describing an entity.
pub fn format_state(state: &EntityState) -> String {
    let place = match &state.heading_to {
        Some(to) => format!("{} -> {}", state.location, to),
        None => state.location.to_string(),
    };
    let position = match state.position {
        Some(p) => format!("({:.1}, {:.1})", p.x, p.y),
        None => "hidden".to_string(),
    };
    format!(
        "{:<16} {:<8} {:<8} {:<20} {}",
        state.entity_id,
        state.kind.to_string(),
        state.usage.to_string(),
        place,
        position
    )
}
