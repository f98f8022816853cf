//! Replay clock.
//!
//! The clock owns the current replay time and nothing else. Each tick moves
//! the time by `step * speed` and pins it to `[0, end_time]`; a negative speed
//! rewinds. Queries downstream cope with any direction or jump, so changing
//! speed or seeking never requires resetting their caches.
//!
//! # Example
//!
//! ```
//! use mapreplay::clock::ReplayClock;
//!
//! let mut clock = ReplayClock::new(1.0).with_step(0.25);
//! clock.set_speed(2.0).unwrap();
//! assert_eq!(clock.tick(), 0.5);
//! assert_eq!(clock.tick(), 1.0);
//! assert_eq!(clock.tick(), 1.0);
//! assert!(clock.at_boundary());
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Replay time advanced per tick at speed 1, in days.
pub const DEFAULT_STEP: f64 = 0.002;

/// Wall-clock time between ticks when driven in real time.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(10);

/// Speeds above this magnitude log a warning.
pub const SPEED_WARN_THRESHOLD: f64 = 20.0;

/// Speeds above this magnitude are rejected.
pub const MAX_SPEED: f64 = 100.0;

/// Playback speeds offered to the user, rewind first.
pub const SPEED_PRESETS: [f64; 10] = [-16.0, -8.0, -4.0, -2.0, -1.0, 1.0, 2.0, 4.0, 8.0, 16.0];

/// Clock configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClockError {
    #[error("Speed {0} exceeds the maximum of {max}x", max = MAX_SPEED)]
    SpeedTooHigh(f64),

    #[error("Invalid speed: {0}")]
    InvalidSpeed(f64),

    #[error("Invalid step: {0} (must be positive and finite)")]
    InvalidStep(f64),

    #[error("Invalid end time: {0} (must be non-negative and finite)")]
    InvalidEndTime(f64),
}

/// Scalar replay clock.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayClock {
    time: f64,
    speed: f64,
    paused: bool,
    end_time: f64,
    step: f64,
}

impl ReplayClock {
    /// Create a clock at time 0, speed 1, running.
    ///
    /// A negative or non-finite `end_time` is treated as 0.
    pub fn new(end_time: f64) -> Self {
        let end_time = if end_time.is_finite() && end_time > 0.0 {
            end_time
        } else {
            0.0
        };
        Self {
            time: 0.0,
            speed: 1.0,
            paused: false,
            end_time,
            step: DEFAULT_STEP,
        }
    }

    /// Validated constructor for configured clocks.
    pub fn try_new(end_time: f64, step: f64, speed: f64) -> Result<Self, ClockError> {
        if !end_time.is_finite() || end_time < 0.0 {
            return Err(ClockError::InvalidEndTime(end_time));
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(ClockError::InvalidStep(step));
        }
        let mut clock = Self::new(end_time).with_step(step);
        clock.set_speed(speed)?;
        Ok(clock)
    }

    /// Set the time advanced per tick at speed 1.
    ///
    /// Non-positive or non-finite steps are ignored.
    pub fn with_step(mut self, step: f64) -> Self {
        if step.is_finite() && step > 0.0 {
            self.step = step;
        }
        self
    }

    /// Advance one tick and return the new time.
    pub fn tick(&mut self) -> f64 {
        if !self.paused {
            self.time = (self.time + self.step * self.speed).clamp(0.0, self.end_time);
        }
        self.time
    }

    /// Change speed and resume playback.
    ///
    /// Zero is accepted and holds the time in place without pausing.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), ClockError> {
        if !speed.is_finite() {
            return Err(ClockError::InvalidSpeed(speed));
        }
        if speed.abs() > MAX_SPEED {
            return Err(ClockError::SpeedTooHigh(speed));
        }
        if speed.abs() > SPEED_WARN_THRESHOLD {
            warn!(speed, "High replay speed");
        }
        debug!(speed, "Replay speed changed");
        self.speed = speed;
        self.paused = false;
        Ok(())
    }

    /// Freeze the current time until the next speed change.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Jump to `time`, clamped into `[0, end_time]`. NaN is ignored.
    pub fn seek(&mut self, time: f64) -> f64 {
        if !time.is_nan() {
            self.time = time.clamp(0.0, self.end_time);
        }
        self.time
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the clock is pinned at a bound in its direction of travel.
    pub fn at_boundary(&self) -> bool {
        (self.speed > 0.0 && self.time >= self.end_time)
            || (self.speed < 0.0 && self.time <= 0.0)
    }

    /// Fraction of the replay elapsed, 0 to 1.
    pub fn progress(&self) -> f64 {
        if self.end_time > 0.0 {
            self.time / self.end_time
        } else {
            1.0
        }
    }
}

impl Default for ReplayClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Display for ReplayClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x", format_clock(self.time), self.speed)?;
        if self.paused {
            write!(f, ", paused")?;
        }
        write!(f, ")")
    }
}

/// Render a replay time in days as `Day D HH:MM`.
///
/// ```
/// use mapreplay::clock::format_clock;
///
/// assert_eq!(format_clock(0.0), "Day 0 00:00");
/// assert_eq!(format_clock(1.5), "Day 1 12:00");
/// ```
pub fn format_clock(days: f64) -> String {
    let total_minutes = (days.max(0.0) * 24.0 * 60.0).floor() as u64;
    let day = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    format!("Day {} {:02}:{:02}", day, hours, minutes)
}
