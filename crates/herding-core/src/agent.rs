use crate::levels::Obstacle;
use crate::vec2::Vec2;

/// Margin kept between an agent's collision circle and the world edge.
pub const BOUNDS_MARGIN: f64 = 2.0;
/// Extra clearance kept between an agent and an obstacle rim.
pub const OBSTACLE_CLEARANCE: f64 = 6.0;
/// Gain applied to the obstacle penetration depth when pushing out.
pub const OBSTACLE_PUSH_GAIN: f64 = 6.0;
/// Fixed integration step used by `steer_towards`, decoupled from the tick
/// dt. Part of the tuned feel; see DESIGN.md.
const STEER_STEP: f64 = 1.0 / 60.0;

/// Common position/velocity state shared by shepherd, sheep, and dogs.
///
/// There is no agent trait hierarchy: each concrete agent embeds a body and
/// drives these helpers from its own `update`.
#[derive(Clone, Debug)]
pub struct AgentBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Maximum scalar speed (px/s).
    pub speed: f64,
    /// Collision/visual radius (px).
    pub radius: f64,
    pub target: Option<Vec2>,
}

impl AgentBody {
    pub fn new(speed: f64, radius: f64) -> Self {
        Self {
            position: Vec2::zero(),
            velocity: Vec2::zero(),
            speed,
            radius,
            target: None,
        }
    }

    /// Stores a copy of the desired destination; `None` clears seeking.
    pub fn set_target(&mut self, pos: Option<Vec2>) {
        self.target = pos;
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.position = pos;
    }

    /// `position += velocity * dt`.
    pub fn integrate(&mut self, dt: f64) {
        self.position += self.velocity * dt;
    }

    /// Clamps the position into `[radius + 2, dim - radius - 2]` on both
    /// axes. When a bound is hit and velocity still points outward, that
    /// velocity component is zeroed to avoid edge jitter.
    pub fn clamp_to_bounds(&mut self, width: f64, height: f64) {
        let min_x = self.radius + BOUNDS_MARGIN;
        let max_x = width - self.radius - BOUNDS_MARGIN;
        let min_y = self.radius + BOUNDS_MARGIN;
        let max_y = height - self.radius - BOUNDS_MARGIN;
        if self.position.x < min_x {
            self.position.x = min_x;
            if self.velocity.x < 0.0 {
                self.velocity.x = 0.0;
            }
        }
        if self.position.x > max_x {
            self.position.x = max_x;
            if self.velocity.x > 0.0 {
                self.velocity.x = 0.0;
            }
        }
        if self.position.y < min_y {
            self.position.y = min_y;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        }
        if self.position.y > max_y {
            self.position.y = max_y;
            if self.velocity.y > 0.0 {
                self.velocity.y = 0.0;
            }
        }
    }

    /// Positional push-out from overlapping obstacles, applied to both
    /// position and velocity. Not a conserved impulse: biased toward visual
    /// stability over physical accuracy.
    pub fn avoid_obstacles(&mut self, obstacles: &[Obstacle]) {
        for o in obstacles {
            let dir = self.position - o.center();
            let d = dir.length();
            let min_d = self.radius + o.r + OBSTACLE_CLEARANCE;
            if d < min_d {
                let push = dir.normalize() * ((min_d - d) * OBSTACLE_PUSH_GAIN);
                self.position += push;
                self.velocity += push;
            }
        }
    }

    /// Seek-and-limit steering: desired velocity toward `target` at own
    /// speed, steering force capped at `max_force`, integrated at the fixed
    /// 1/60 step. No-op within 1 px of the target.
    pub fn steer_towards(&mut self, target: Vec2, max_force: f64) {
        let desired = target - self.position;
        let d = desired.length();
        if d < 1.0 {
            return;
        }
        let desired_vel = desired.normalize() * self.speed;
        let steer = desired_vel - self.velocity;
        let l = steer.length();
        let limited = if l > max_force {
            steer.normalize() * max_force
        } else {
            steer
        };
        self.velocity += limited * STEER_STEP;
    }
}
