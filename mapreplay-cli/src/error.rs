//! CLI error type.

use std::fmt;

use mapreplay::clock::ClockError;
use mapreplay::config::ConfigError;
use mapreplay::coord::CoordError;
use mapreplay::replay::ReplayError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Bad configuration or arguments.
    Config(String),
    /// Map projection settings were rejected.
    Projection(CoordError),
    /// Loading or querying the replay failed.
    Replay(ReplayError),
    /// Clock settings were rejected.
    Clock(ClockError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Projection(_) | CliError::Clock(_) => 2,
            CliError::Replay(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Projection(e) => write!(f, "Invalid map settings: {}", e),
            CliError::Replay(e) => write!(f, "{}", e),
            CliError::Clock(e) => write!(f, "Invalid playback settings: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::Projection(e) => Some(e),
            CliError::Replay(e) => Some(e),
            CliError::Clock(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Projection(e)
    }
}

impl From<ReplayError> for CliError {
    fn from(e: ReplayError) -> Self {
        CliError::Replay(e)
    }
}

impl From<ClockError> for CliError {
    fn from(e: ClockError) -> Self {
        CliError::Clock(e)
    }
}
