use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Tuning for sheep wandering when no shepherd is nearby.
///
/// A strolling sheep alternates between short walks (random heading, speed
/// drawn from the walk band) and standing still, with durations drawn from
/// the ranges below.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StrollConfig {
    /// Lower bound of the walking speed band (px/s).
    pub walk_speed_min: f64,
    /// Upper bound of the walking speed band (px/s).
    pub walk_speed_max: f64,
    /// Shortest duration of a single walk (seconds).
    pub walk_dur_min: f64,
    /// Longest duration of a single walk (seconds).
    pub walk_dur_max: f64,
    /// Shortest duration of an idle pause (seconds).
    pub idle_dur_min: f64,
    /// Longest duration of an idle pause (seconds).
    pub idle_dur_max: f64,
}

impl Default for StrollConfig {
    fn default() -> Self {
        Self {
            walk_speed_min: 10.0,
            walk_speed_max: 20.0,
            walk_dur_min: 0.8,
            walk_dur_max: 1.8,
            idle_dur_min: 0.6,
            idle_dur_max: 1.4,
        }
    }
}

/// Tuning for the sheep behavior state machine.
///
/// The defaults are the empirically tuned values of the game; they are part
/// of the behavioral contract, not derived quantities.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SheepConfig {
    /// Base acceleration applied by events and shepherd influence (px/s).
    pub accel: f64,
    /// Angular blend rate toward a desired heading, 0..1 per logical tick.
    pub turn_rate: f64,
    /// Operative speed cap for a sheep's own movement (px/s).
    pub max_speed: f64,
    /// Scale applied to the attention radius `50 + 12 * attention`.
    pub attention_scale: f64,
    /// Cadence of the follow/stroll movement refresh (seconds).
    pub movement_refresh_sec: f64,
    /// Lower bound of the random interval between distraction rolls (seconds).
    pub distraction_min_sec: f64,
    /// Upper bound of the random interval between distraction rolls (seconds).
    pub distraction_max_sec: f64,
    /// Wandering behavior when unsupervised.
    pub stroll: StrollConfig,
}

impl Default for SheepConfig {
    fn default() -> Self {
        Self {
            accel: 20.0,
            turn_rate: 0.4,
            max_speed: 50.0,
            attention_scale: 1.4,
            movement_refresh_sec: 0.1,
            distraction_min_sec: 10.0,
            distraction_max_sec: 30.0,
            stroll: StrollConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    /// World width in px.
    pub world_width: f64,
    /// World height in px.
    pub world_height: f64,
    /// Largest time delta a single tick may simulate (seconds). Deltas
    /// derived from timestamps are clamped here, so frame hitches appear as
    /// a stall rather than a jump.
    pub max_dt: f64,
    /// Restlessness 0..10: probability x10 that an idle sheep starts
    /// walking rather than standing when its stroll timer fires.
    pub restlessness: f64,
    /// Sheep behavior tuning.
    pub sheep: SheepConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_width: 960.0,
            world_height: 540.0,
            max_dt: 0.033,
            restlessness: 8.0,
            sheep: SheepConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimConfigError {
    InvalidWorldSize,
    InvalidMaxDt,
    InvalidRefreshInterval,
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::InvalidWorldSize => {
                write!(f, "world_width and world_height must be finite and positive")
            }
            SimConfigError::InvalidMaxDt => write!(f, "max_dt must be finite and positive"),
            SimConfigError::InvalidRefreshInterval => {
                write!(f, "sheep.movement_refresh_sec must be finite and positive")
            }
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    /// Light validation only. Level contents (sheep counts, obstacle lists)
    /// are trusted; degenerate levels degrade gracefully instead of failing.
    pub fn validate(&self) -> Result<(), SimConfigError> {
        if !(self.world_width.is_finite() && self.world_width > 0.0)
            || !(self.world_height.is_finite() && self.world_height > 0.0)
        {
            return Err(SimConfigError::InvalidWorldSize);
        }
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            return Err(SimConfigError::InvalidMaxDt);
        }
        if !(self.sheep.movement_refresh_sec.is_finite() && self.sheep.movement_refresh_sec > 0.0) {
            return Err(SimConfigError::InvalidRefreshInterval);
        }
        Ok(())
    }
}
