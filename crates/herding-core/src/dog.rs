use crate::agent::AgentBody;
use crate::levels::Obstacle;

const BASE_SPEED: f64 = 160.0;
const RADIUS: f64 = 8.0;
/// Steering cap for target pursuit; high so dogs respond snappily.
const STEER_FORCE: f64 = 300.0;
/// Per-tick velocity damping when the dog has no target.
const COAST_DAMPING: f64 = 0.92;

/// Player-directable helper. Dogs herd indirectly: the world nudges nearby
/// sheep toward the shepherd while a dog is close.
#[derive(Clone, Debug)]
pub struct Dog {
    pub body: AgentBody,
    /// Selection toggle used by the input layer; visual only.
    pub selected: bool,
}

impl Default for Dog {
    fn default() -> Self {
        Self::new()
    }
}

impl Dog {
    pub fn new() -> Self {
        Self {
            body: AgentBody::new(BASE_SPEED, RADIUS),
            selected: false,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn update(&mut self, dt: f64, obstacles: &[Obstacle]) {
        if let Some(target) = self.body.target {
            self.body.steer_towards(target, STEER_FORCE);
        } else {
            self.body.velocity = self.body.velocity * COAST_DAMPING;
        }
        let v = self.body.velocity.length();
        if v > self.body.speed {
            self.body.velocity = self.body.velocity * (self.body.speed / v);
        }
        self.body.integrate(dt);
        self.body.avoid_obstacles(obstacles);
    }
}
