use crate::agent::AgentBody;
use crate::levels::Obstacle;
use crate::vec2::Vec2;

const BASE_SPEED: f64 = 120.0;
const RADIUS: f64 = 12.0;

/// The player-controlled agent: walks in a straight line to a set
/// destination and stops exactly on it.
#[derive(Clone, Debug)]
pub struct Shepherd {
    pub body: AgentBody,
}

impl Default for Shepherd {
    fn default() -> Self {
        Self::new()
    }
}

impl Shepherd {
    pub fn new() -> Self {
        Self {
            body: AgentBody::new(BASE_SPEED, RADIUS),
        }
    }

    /// Permanent, stacking speed upgrade.
    pub fn upgrade_speed(&mut self, multiplier: f64) {
        self.body.speed *= multiplier;
    }

    pub fn update(&mut self, dt: f64, obstacles: &[Obstacle]) {
        if let Some(target) = self.body.target {
            let delta = target - self.body.position;
            let dist = delta.length();
            if dist <= self.body.speed * dt {
                // Arrived: snap to the exact point, hard stop.
                self.body.position = target;
                self.body.velocity = Vec2::zero();
                self.body.set_target(None);
            } else {
                self.body.velocity = delta * (self.body.speed / dist);
                self.body.integrate(dt);
            }
        } else {
            self.body.velocity = Vec2::zero();
        }
        self.body.avoid_obstacles(obstacles);
    }
}
