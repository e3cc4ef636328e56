pub mod metrics;
mod tick;
#[cfg(test)]
mod tests;

pub use metrics::*;

use crate::config::{SimConfig, SimConfigError};
use crate::dog::Dog;
use crate::levels::{Goal, LevelConfig, Obstacle};
use crate::shepherd::Shepherd;
use crate::sheep::Sheep;
use crate::store::{GameStore, INITIAL_WHISTLES};
use crate::vec2::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Offset from the shepherd at which a new dog appears.
const DOG_SPAWN_OFFSET: Vec2 = Vec2 { x: 20.0, y: 20.0 };

/// The simulation: owns all agents, the level working state, the seeded RNG,
/// and the per-tick update order. Single-threaded; one `step` is atomic with
/// respect to all host-visible state.
pub struct World {
    pub shepherd: Shepherd,
    pub sheep: Vec<Sheep>,
    pub dogs: Vec<Dog>,
    pub(crate) goal: Goal,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) level: Option<LevelConfig>,
    pub(crate) config: SimConfig,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) store: GameStore,
    pub(crate) paused: bool,
    pub(crate) tick_index: usize,
    pub(crate) completions: usize,
    pub(crate) initial_sheep_positions: Vec<Vec2>,
    pub(crate) last_timestamp: Option<f64>,
    pub(crate) whistle_impulses_left: u32,
    pub(crate) whistle_timer: f64,
}

impl World {
    pub const MAX_HEADLESS_STEPS: usize = 1_000_000;
    pub const MAX_HEADLESS_SAMPLES: usize = 50_000;

    pub fn new(config: SimConfig, store: GameStore) -> Self {
        Self::try_new(config, store).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: SimConfig, store: GameStore) -> Result<Self, SimConfigError> {
        config.validate()?;
        let rng = ChaCha12Rng::seed_from_u64(config.seed);
        Ok(Self {
            shepherd: Shepherd::new(),
            sheep: Vec::new(),
            dogs: Vec::new(),
            goal: Goal {
                x: 800.0,
                y: 270.0,
                r: 60.0,
            },
            obstacles: Vec::new(),
            level: None,
            config,
            rng,
            store,
            paused: false,
            tick_index: 0,
            completions: 0,
            initial_sheep_positions: Vec::new(),
            last_timestamp: None,
            whistle_impulses_left: 0,
            whistle_timer: 0.0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GameStore {
        &mut self.store
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn level(&self) -> Option<&LevelConfig> {
        self.level.as_ref()
    }

    /// Resets all simulation state from a level template. Obstacle entries
    /// are cloned into working state so the template stays pristine.
    pub fn load_level(&mut self, level: &LevelConfig) {
        self.goal = level.goal;
        self.obstacles = level.obstacles.clone();
        self.sheep.clear();
        self.dogs.clear();
        self.initial_sheep_positions.clear();
        self.whistle_impulses_left = 0;
        self.whistle_timer = 0.0;

        self.shepherd = Shepherd::new();
        self.shepherd.body.set_position(level.shepherd_start);

        let cx = self.config.world_width * 0.25;
        let cy = self.config.world_height * 0.5;
        for i in 0..level.initial_sheep {
            let pos = Vec2::new(
                cx + (i % 3) as f64 * 16.0 - 16.0,
                cy + (i / 3) as f64 * 16.0 - 16.0,
            );
            let mut sheep = Sheep::new(&self.config.sheep, &mut self.rng);
            sheep.body.set_position(pos);
            self.sheep.push(sheep);
            self.initial_sheep_positions.push(pos);
        }

        self.level = Some(level.clone());
    }

    /// Adds a helper dog next to the shepherd.
    pub fn spawn_dog(&mut self) {
        let mut dog = Dog::new();
        dog.body
            .set_position(self.shepherd.body.position + DOG_SPAWN_OFFSET);
        self.dogs.push(dog);
    }

    pub fn upgrade_shepherd_speed(&mut self, multiplier: f64) {
        self.shepherd.upgrade_speed(multiplier);
    }

    pub fn set_shepherd_target(&mut self, pos: Option<Vec2>) {
        self.shepherd.body.set_target(pos);
    }

    /// Returns false if no dog exists at `index`.
    pub fn set_dog_target(&mut self, index: usize, pos: Option<Vec2>) -> bool {
        match self.dogs.get_mut(index) {
            Some(dog) => {
                dog.body.set_target(pos);
                true
            }
            None => false,
        }
    }

    /// Marks one dog as selected (or none). Selection is visual state for
    /// the input layer; it has no effect on the simulation.
    pub fn select_dog(&mut self, index: Option<usize>) {
        for (i, dog) in self.dogs.iter_mut().enumerate() {
            dog.set_selected(Some(i) == index);
        }
    }

    pub fn selected_dog(&self) -> Option<usize> {
        self.dogs.iter().position(|d| d.selected)
    }

    /// Spends one whistle and schedules its attention impulses. Returns
    /// false when no whistles are left.
    pub fn whistle(&mut self) -> bool {
        if self.store.whistles == 0 {
            return false;
        }
        self.store.whistles -= 1;
        self.whistle_impulses_left = tick::WHISTLE_IMPULSES;
        self.whistle_timer = tick::WHISTLE_INTERVAL_SEC;
        true
    }

    pub fn sheep_count(&self) -> usize {
        self.sheep.len()
    }

    pub fn alive_sheep_count(&self) -> usize {
        self.sheep.iter().filter(|s| !s.lost).count()
    }

    pub fn completions(&self) -> usize {
        self.completions
    }

    pub fn tick_index(&self) -> usize {
        self.tick_index
    }

    pub fn set_all_sheep_speed(&mut self, speed: f64) {
        for sheep in &mut self.sheep {
            sheep.current_speed = speed;
            sheep.body.velocity = Vec2::zero();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Restores the shepherd and every sheep to their level-start positions
    /// with velocities and speeds zeroed. Idempotent. Sheep instances (and
    /// their `lost` flags) are preserved, not recreated.
    pub fn reset_positions(&mut self) {
        let Some(level) = &self.level else { return };
        self.shepherd.body.set_position(level.shepherd_start);
        self.shepherd.body.velocity = Vec2::zero();
        self.shepherd.body.set_target(None);
        let fallback = Vec2::new(
            self.config.world_width * 0.25,
            self.config.world_height * 0.5,
        );
        for (i, sheep) in self.sheep.iter_mut().enumerate() {
            let pos = self
                .initial_sheep_positions
                .get(i)
                .copied()
                .unwrap_or(fallback);
            sheep.body.set_position(pos);
            sheep.current_speed = 0.0;
            sheep.body.velocity = Vec2::zero();
        }
    }

    /// Tick entry point for hosts driving the loop from a monotonically
    /// increasing timestamp (seconds). The derived delta is clamped to
    /// `max_dt`, so frame hitches stall the simulation instead of making it
    /// jump. Pausing short-circuits after the timestamp update.
    pub fn advance(&mut self, now_secs: f64) {
        let dt = match self.last_timestamp {
            Some(last) => (now_secs - last).clamp(0.0, self.config.max_dt),
            None => 0.0,
        };
        self.last_timestamp = Some(now_secs);
        if self.paused {
            return;
        }
        self.step(dt);
    }

    pub(crate) fn restore_whistles(&mut self) {
        self.store.whistles = INITIAL_WHISTLES;
    }
}
