use super::tick::GOAL_MARGIN;
use super::World;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Per-tick observability snapshot. The core carries no logging facade;
/// hosts and the CLI observe the simulation through these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TickMetrics {
    pub tick: usize,
    pub sheep_total: usize,
    pub lost_count: usize,
    pub inside_goal: usize,
    pub distracted_count: usize,
    pub strolling_count: usize,
    pub mean_attention: f64,
    pub mean_speed: f64,
    pub shepherd_x: f64,
    pub shepherd_y: f64,
    pub completions: usize,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    pub samples: Vec<TickMetrics>,
    pub completions: usize,
    pub final_lost_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    InvalidDt,
    TooManySteps { max: usize, actual: usize },
    TooManySamples { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            ExperimentError::InvalidDt => write!(f, "dt must be finite and positive"),
            ExperimentError::TooManySteps { max, actual } => {
                write!(f, "steps ({actual}) exceed supported maximum ({max})")
            }
            ExperimentError::TooManySamples { max, actual } => {
                write!(
                    f,
                    "sample count ({actual}) exceeds supported maximum ({max})"
                )
            }
        }
    }
}

impl Error for ExperimentError {}

impl World {
    pub(crate) fn collect_tick_metrics(&self) -> TickMetrics {
        let goal_center = self.goal.center();
        let threshold = self.goal.r - GOAL_MARGIN;

        let mut lost = 0usize;
        let mut inside = 0usize;
        let mut distracted = 0usize;
        let mut strolling = 0usize;
        let mut attention_sum = 0.0f64;
        let mut speed_sum = 0.0f64;
        let mut alive = 0usize;

        for sheep in &self.sheep {
            if sheep.lost {
                lost += 1;
                continue;
            }
            alive += 1;
            if sheep.body.position.distance(goal_center) <= threshold {
                inside += 1;
            }
            if sheep.is_distracted() {
                distracted += 1;
            }
            if sheep.is_strolling() {
                strolling += 1;
            }
            attention_sum += sheep.attention() as f64;
            speed_sum += sheep.current_speed;
        }

        let denom = alive.max(1) as f64;
        TickMetrics {
            tick: self.tick_index,
            sheep_total: self.sheep.len(),
            lost_count: lost,
            inside_goal: inside,
            distracted_count: distracted,
            strolling_count: strolling,
            mean_attention: attention_sum / denom,
            mean_speed: speed_sum / denom,
            shepherd_x: self.shepherd.body.position.x,
            shepherd_y: self.shepherd.body.position.y,
            completions: self.completions,
        }
    }

    /// Drives the loaded level for `steps` fixed-delta ticks, sampling
    /// metrics every `sample_every` ticks (and always on the last one).
    pub fn try_run_headless(
        &mut self,
        steps: usize,
        dt: f64,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ExperimentError::InvalidDt);
        }
        if steps > Self::MAX_HEADLESS_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_HEADLESS_STEPS,
                actual: steps,
            });
        }
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_HEADLESS_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_HEADLESS_SAMPLES,
                actual: estimated_samples,
            });
        }

        let completions_before = self.completions;
        let mut samples = Vec::with_capacity(estimated_samples);
        for step in 1..=steps {
            self.step(dt);
            if step % sample_every == 0 || step == steps {
                samples.push(self.collect_tick_metrics());
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            samples,
            completions: self.completions - completions_before,
            final_lost_count: self.sheep.iter().filter(|s| s.lost).count(),
        })
    }
}
