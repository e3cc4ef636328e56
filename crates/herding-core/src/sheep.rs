use crate::agent::AgentBody;
use crate::config::SheepConfig;
use crate::levels::Obstacle;
use crate::vec2::Vec2;
use rand::Rng;
use std::f64::consts::PI;

/// Theoretical absolute speed ceiling; the operative cap is
/// `SheepConfig::max_speed`.
const SPEED_CEILING: f64 = 10_000.0;
const RADIUS: f64 = 9.0;
/// Horizontal velocity below which the facing does not flip.
const FACING_DEADBAND: f64 = 2.0;
/// Attention cap reachable through following alone.
const FOLLOW_ATTENTION_CAP: f64 = 6.0;

/// A flock member driven by an attention/distraction state machine.
///
/// A sheep keeps its own heading (`dir_angle`) and scalar speed
/// (`current_speed`); velocity is projected fresh from that pair every tick
/// rather than accumulated.
#[derive(Clone, Debug)]
pub struct Sheep {
    pub body: AgentBody,
    /// Terminal flag: set when the sheep falls into a hole. A lost sheep no
    /// longer updates and is excluded from the win check.
    pub lost: bool,
    /// Attention 0..=10: governs follow radius and distraction resistance.
    attention: i32,
    /// Current heading in radians.
    dir_angle: f64,
    /// Current scalar speed (px/s), decoupled from the body speed cap.
    pub current_speed: f64,
    /// While positive, the sheep ignores the shepherd and drifts away.
    distracted_timer: f64,
    /// Countdown to the next distraction roll.
    random_timer: f64,
    /// Countdown to the next follow/stroll movement refresh.
    movement_refresh_timer: f64,
    /// Countdown within the current walk or idle stretch.
    stroll_timer: f64,
    strolling: bool,
    /// Horizontal facing, +1 right / -1 left; flips only beyond the deadband.
    facing: i8,
    /// Visual "?" indicator; cleared exactly when the distraction ends.
    confused: bool,
}

impl Sheep {
    pub fn new(cfg: &SheepConfig, rng: &mut impl Rng) -> Self {
        Self {
            body: AgentBody::new(SPEED_CEILING, RADIUS),
            lost: false,
            attention: 6,
            dir_angle: rng.random::<f64>() * PI * 2.0,
            current_speed: 0.0,
            distracted_timer: 0.0,
            random_timer: next_distraction_interval(cfg, rng),
            movement_refresh_timer: 0.0,
            stroll_timer: next_idle_duration(cfg, rng),
            strolling: false,
            facing: 1,
            confused: false,
        }
    }

    pub fn attention(&self) -> i32 {
        self.attention
    }

    pub fn dir_angle(&self) -> f64 {
        self.dir_angle
    }

    pub fn facing(&self) -> i8 {
        self.facing
    }

    pub fn is_distracted(&self) -> bool {
        self.distracted_timer > 0.0
    }

    pub fn is_strolling(&self) -> bool {
        self.strolling
    }

    pub fn is_confused(&self) -> bool {
        self.confused
    }

    /// Distance within which the shepherd influences this sheep.
    pub fn attention_radius(&self, cfg: &SheepConfig) -> f64 {
        (50.0 + self.attention as f64 * 12.0) * cfg.attention_scale
    }

    /// Rounds and clamps into 0..=10; every mutation path goes through here.
    pub fn set_attention(&mut self, v: f64) {
        self.attention = (v.round() as i32).clamp(0, 10);
    }

    /// Lightweight external nudge (whistle, dog pressure): blends the
    /// heading toward `pos` and adds a speed impulse, both scaled by
    /// `intensity`.
    pub fn steer_towards(&mut self, pos: Vec2, intensity: f64, cfg: &SheepConfig) {
        let to = (pos.y - self.body.position.y).atan2(pos.x - self.body.position.x);
        self.dir_angle = mix_angle(self.dir_angle, to, cfg.turn_rate * intensity);
        self.current_speed += cfg.accel * intensity;
    }

    pub fn update(
        &mut self,
        dt: f64,
        shepherd_pos: Vec2,
        obstacles: &[Obstacle],
        cfg: &SheepConfig,
        restlessness: f64,
        rng: &mut impl Rng,
    ) {
        if self.lost {
            return;
        }

        // 1) Distraction roll on its own random cadence.
        self.random_timer -= dt;
        if self.random_timer <= 0.0 {
            self.random_timer = next_distraction_interval(cfg, rng);
            let vary = rng.random_range(0..3) - 1;
            self.set_attention((self.attention + vary) as f64);
            let p = prob_distraction(self.attention);
            if rng.random::<f64>() < p {
                let lack = (10 - self.attention) as f64 / 10.0;
                // Gentle initial kick; lower attention means larger swings.
                self.dir_angle += (rng.random::<f64>() - 0.5) * PI * 0.6 * (0.4 + 0.6 * lack);
                self.current_speed += cfg.accel * (0.2 + 1.0 * lack);
                let dur = ((10 - self.attention) as f64 * 2.0).max(0.2);
                self.distracted_timer = self.distracted_timer.max(dur);
                self.confused = true;
            }
        }

        // 2) Follow/stroll, applied on the movement refresh cadence.
        let r = self.attention_radius(cfg);
        let to_shep = shepherd_pos - self.body.position;
        let d_shep = to_shep.length();
        self.movement_refresh_timer -= dt;
        if self.movement_refresh_timer <= 0.0 {
            self.movement_refresh_timer = cfg.movement_refresh_sec;
            let att_norm = (self.attention as f64 / 10.0).clamp(0.0, 1.0);
            let close_factor = if d_shep <= r { (r - d_shep) / r } else { 0.0 };

            // Following can raise attention only up to the cap of 6.
            if d_shep <= r && (self.attention as f64) < FOLLOW_ATTENTION_CAP {
                let inc = cfg.movement_refresh_sec;
                self.set_attention(FOLLOW_ATTENTION_CAP.min(self.attention as f64 + inc));
            }

            if self.distracted_timer <= 0.0 && d_shep <= r {
                // Follow the shepherd: more attention and proximity mean
                // stronger turning and acceleration.
                let toward = to_shep.y.atan2(to_shep.x);
                let turn_gain = cfg.turn_rate * (0.3 + 0.7 * att_norm) * (0.5 + 1.5 * close_factor);
                let accel_gain = cfg.accel * (0.1 + 0.9 * att_norm) * (0.2 + 1.2 * close_factor);
                self.dir_angle = mix_angle(self.dir_angle, toward, turn_gain);
                self.current_speed += accel_gain;
            } else if self.distracted_timer <= 0.0 {
                // Unsupervised: alternate walks and pauses per restlessness.
                let move_prob = restlessness.clamp(0.0, 10.0) / 10.0;
                self.stroll_timer -= dt;
                if self.stroll_timer <= 0.0 {
                    if rng.random::<f64>() < move_prob {
                        self.strolling = true;
                        self.dir_angle = rng.random::<f64>() * PI * 2.0;
                        let smin = cfg.stroll.walk_speed_min;
                        let smax = cfg.stroll.walk_speed_max;
                        self.current_speed =
                            (smin + rng.random::<f64>() * (smax - smin)).clamp(0.0, cfg.max_speed);
                        self.stroll_timer = next_walk_duration(cfg, rng);
                    } else {
                        self.strolling = false;
                        self.current_speed = 0.0;
                        self.stroll_timer = next_idle_duration(cfg, rng);
                    }
                }
                if self.strolling {
                    // Small heading drift while walking.
                    self.dir_angle += (rng.random::<f64>() - 0.5) * 0.15;
                }
            }
        }

        // 3) No per-frame friction; only the operative speed cap.
        self.current_speed = self.current_speed.clamp(0.0, cfg.max_speed);

        // 4) Distraction decay: keep drifting away from the shepherd.
        if self.distracted_timer > 0.0 {
            self.distracted_timer = (self.distracted_timer - dt).max(0.0);
            let away = (self.body.position.y - shepherd_pos.y)
                .atan2(self.body.position.x - shepherd_pos.x);
            self.dir_angle = mix_angle(self.dir_angle, away, 0.4);
            self.dir_angle += (rng.random::<f64>() - 0.5) * 0.2;
            if self.distracted_timer == 0.0 {
                self.confused = false;
            }
        }

        // 5) Velocity is a direct projection of heading and speed.
        self.body.velocity =
            Vec2::new(self.dir_angle.cos(), self.dir_angle.sin()) * self.current_speed;

        // 6) Integration and collisions.
        self.body.integrate(dt);
        self.body.avoid_obstacles(obstacles);

        // 7) Facing flips only beyond the deadband to avoid jitter at rest.
        if self.body.velocity.x.abs() > FACING_DEADBAND {
            self.facing = if self.body.velocity.x >= 0.0 { 1 } else { -1 };
        }
    }
}

/// Blend angle `a` toward `b` by `t` along the shortest arc.
fn mix_angle(a: f64, b: f64, t: f64) -> f64 {
    let da = (b - a).sin().atan2((b - a).cos());
    a + da * t.clamp(0.0, 1.0)
}

/// Probability of getting distracted: logarithmic falloff with attention,
/// clamped away from certainty in both directions.
pub fn prob_distraction(attention: i32) -> f64 {
    let a = attention.clamp(0, 10) as f64;
    let p = 1.0 - (a + 1.0).ln() / 11.0f64.ln();
    p.clamp(0.02, 0.98)
}

fn next_distraction_interval(cfg: &SheepConfig, rng: &mut impl Rng) -> f64 {
    let min = cfg.distraction_min_sec.max(1.0);
    let max = cfg.distraction_max_sec.max(min);
    min + rng.random::<f64>() * (max - min)
}

fn next_walk_duration(cfg: &SheepConfig, rng: &mut impl Rng) -> f64 {
    cfg.stroll.walk_dur_min
        + rng.random::<f64>() * (cfg.stroll.walk_dur_max - cfg.stroll.walk_dur_min)
}

fn next_idle_duration(cfg: &SheepConfig, rng: &mut impl Rng) -> f64 {
    cfg.stroll.idle_dur_min
        + rng.random::<f64>() * (cfg.stroll.idle_dur_max - cfg.stroll.idle_dur_min)
}
