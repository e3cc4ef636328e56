use super::World;
use crate::agent::BOUNDS_MARGIN;
use crate::levels::ObstacleKind;
use crate::sheep::Sheep;
use crate::spatial;

/// Radius within which a dog pressures nearby sheep toward the shepherd.
const DOG_PRESSURE_RADIUS: f64 = 60.0;
/// Nudge intensity of dog pressure; dogs herd indirectly, not by repulsion.
const DOG_PRESSURE_INTENSITY: f64 = 0.3;
/// Slack added to summed radii before two sheep count as overlapping.
const SEPARATION_SLACK: f64 = 2.0;
/// Velocity nudge (px/s²) applied to the first sheep of a separated pair.
const SEPARATION_VELOCITY_NUDGE: f64 = 60.0;
/// Clearance kept between a sheep and the shepherd.
const SHEPHERD_CLEARANCE: f64 = 6.0;
/// A sheep is lost once its center is within `r - 2` of a hole.
const HOLE_RIM_MARGIN: f64 = 2.0;
/// A sheep counts as inside the goal within `r - 6` of its center.
pub(crate) const GOAL_MARGIN: f64 = 6.0;

pub(crate) const WHISTLE_IMPULSES: u32 = 4;
pub(crate) const WHISTLE_INTERVAL_SEC: f64 = 0.5;
const WHISTLE_ATTENTION_BONUS: f64 = 5.0;
const WHISTLE_INTENSITY: f64 = 0.65;

impl World {
    /// Runs one simulation tick with an already-clamped delta.
    ///
    /// Fixed order: whistle impulses, shepherd, dogs, per-sheep interactions
    /// and self-update in index order, then the win check. Interactions read
    /// this-tick positions as they mutate, so outcomes under contention are
    /// order-dependent but deterministic for a fixed order and seed.
    pub fn step(&mut self, dt: f64) {
        if self.level.is_none() || self.paused {
            return;
        }
        self.tick_index += 1;

        self.apply_whistle_impulses(dt);

        let (w, h) = (self.config.world_width, self.config.world_height);
        self.shepherd.update(dt, &self.obstacles);
        self.shepherd.body.clamp_to_bounds(w, h);
        for dog in &mut self.dogs {
            dog.update(dt, &self.obstacles);
            dog.body.clamp_to_bounds(w, h);
        }

        self.update_sheep(dt);
        self.check_goal();
    }

    /// A pending whistle delivers its impulses on a fixed cadence: every
    /// sheep gains attention and is nudged toward the shepherd.
    fn apply_whistle_impulses(&mut self, dt: f64) {
        if self.whistle_impulses_left == 0 {
            return;
        }
        self.whistle_timer -= dt;
        if self.whistle_timer > 0.0 {
            return;
        }
        self.whistle_timer += WHISTLE_INTERVAL_SEC;
        self.whistle_impulses_left -= 1;

        let shepherd_pos = self.shepherd.body.position;
        let cfg = &self.config.sheep;
        for sheep in self.sheep.iter_mut().filter(|s| !s.lost) {
            sheep.set_attention((sheep.attention() as f64) + WHISTLE_ATTENTION_BONUS);
            sheep.steer_towards(shepherd_pos, WHISTLE_INTENSITY, cfg);
        }
    }

    fn update_sheep(&mut self, dt: f64) {
        let Self {
            shepherd,
            sheep,
            dogs,
            obstacles,
            config,
            rng,
            ..
        } = self;
        let shepherd_pos = shepherd.body.position;
        let shepherd_radius = shepherd.body.radius;
        // Dogs do not move during the sheep phase, so an index built here
        // stays valid for every query below.
        let dog_tree = spatial::build_index(dogs.iter().map(|d| d.body.position));

        for i in 0..sheep.len() {
            if sheep[i].lost {
                continue;
            }

            // Dog pressure: each nearby dog nudges the sheep toward the
            // shepherd.
            let near_dogs =
                spatial::query_radius(&dog_tree, sheep[i].body.position, DOG_PRESSURE_RADIUS);
            for _ in near_dogs {
                sheep[i].steer_towards(shepherd_pos, DOG_PRESSURE_INTENSITY, &config.sheep);
            }

            // Sheep-sheep separation: symmetric half-depth push-out along
            // the center line, plus a velocity nudge on this sheep.
            for j in 0..sheep.len() {
                if j == i || sheep[j].lost {
                    continue;
                }
                let d = sheep[i].body.position.distance(sheep[j].body.position);
                let min_d = sheep[i].body.radius + sheep[j].body.radius + SEPARATION_SLACK;
                if d < min_d {
                    let dir = (sheep[i].body.position - sheep[j].body.position).normalize();
                    let push = (min_d - d) * 0.5;
                    sheep[i].body.position += dir * push;
                    sheep[j].body.position += dir * (-push);
                    sheep[i].body.velocity += dir * (SEPARATION_VELOCITY_NUDGE * dt);
                }
            }

            // Keep sheep from mounting the shepherd.
            let d_to_shep = sheep[i].body.position.distance(shepherd_pos);
            let min_shep = sheep[i].body.radius + shepherd_radius + SHEPHERD_CLEARANCE;
            if d_to_shep < min_shep {
                let dir = (sheep[i].body.position - shepherd_pos).normalize();
                sheep[i].body.position += dir * (min_shep - d_to_shep);
            }

            // Holes swallow sheep whose center crosses the inner rim.
            let in_hole = obstacles.iter().any(|o| {
                o.kind == ObstacleKind::Hole
                    && sheep[i].body.position.distance(o.center()) < o.r - HOLE_RIM_MARGIN
            });
            if in_hole {
                sheep[i].lost = true;
                continue;
            }

            pin_left_edge(&mut sheep[i], shepherd_pos.x);

            sheep[i].update(
                dt,
                shepherd_pos,
                obstacles,
                &config.sheep,
                config.restlessness,
                rng,
            );
            sheep[i]
                .body
                .clamp_to_bounds(config.world_width, config.world_height);
        }
    }

    /// The level completes when at least one sheep is still alive and every
    /// alive sheep stands inside the goal. Completion restores level-start
    /// positions and the whistle stock.
    fn check_goal(&mut self) {
        let goal_center = self.goal.center();
        let threshold = self.goal.r - GOAL_MARGIN;
        let mut alive = 0usize;
        let mut inside = 0usize;
        for sheep in self.sheep.iter().filter(|s| !s.lost) {
            alive += 1;
            if sheep.body.position.distance(goal_center) <= threshold {
                inside += 1;
            }
        }
        if alive > 0 && inside == alive {
            self.reset_positions();
            self.restore_whistles();
            self.completions += 1;
        }
    }
}

/// A sheep pinned at the left boundary with the shepherd further left must
/// not be dragged off-world: cancel outward velocity and re-clamp.
pub(crate) fn pin_left_edge(sheep: &mut Sheep, shepherd_x: f64) {
    let left_limit = sheep.body.radius + BOUNDS_MARGIN;
    if shepherd_x < sheep.body.position.x - 5.0 && sheep.body.position.x <= left_limit {
        if sheep.body.velocity.x < 0.0 {
            sheep.body.velocity.x = 0.0;
        }
        sheep.body.position.x = left_limit;
    }
}
