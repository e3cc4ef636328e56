use crate::vec2::Vec2;
use serde::{Deserialize, Serialize};

/// Static circular obstacle. `Stone` and `Tree` only repel; a `Hole`
/// additionally marks any sheep whose center enters it as lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Stone,
    Tree,
    Hole,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Obstacle {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Circular goal region. The level completes when every non-lost sheep is
/// within `r - 6` of the center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Goal {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Cosmetic environment tag; has no effect on simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Field,
    Rocky,
    Forest,
    Snow,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelMeta {
    pub number: u32,
    pub title: String,
}

/// Immutable level template. The world clones obstacle entries into working
/// state on load, so nothing during play can corrupt the template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: String,
    pub meta: LevelMeta,
    pub environment: Environment,
    pub goal: Goal,
    pub obstacles: Vec<Obstacle>,
    pub initial_sheep: usize,
    pub shepherd_start: Vec2,
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The four built-in levels.
pub fn builtin_levels() -> Vec<LevelConfig> {
    let (base_w, base_h) = (960.0, 540.0);

    vec![
        LevelConfig {
            id: "level1".to_string(),
            meta: LevelMeta {
                number: 1,
                title: "Campo Abierto".to_string(),
            },
            environment: Environment::Field,
            goal: Goal {
                x: base_w - 120.0,
                y: base_h / 2.0,
                r: 50.0,
            },
            obstacles: vec![
                Obstacle { kind: ObstacleKind::Stone, x: 360.0, y: 210.0, r: 18.0 },
                Obstacle { kind: ObstacleKind::Stone, x: 520.0, y: 320.0, r: 22.0 },
                Obstacle { kind: ObstacleKind::Stone, x: 700.0, y: 140.0, r: 16.0 },
            ],
            initial_sheep: 5,
            shepherd_start: Vec2::new(120.0, base_h / 2.0),
        },
        LevelConfig {
            id: "level2".to_string(),
            meta: LevelMeta {
                number: 2,
                title: "Camino Rocoso".to_string(),
            },
            environment: Environment::Rocky,
            goal: Goal {
                x: base_w - 100.0,
                y: base_h - 100.0,
                r: 60.0,
            },
            obstacles: vec![
                Obstacle { kind: ObstacleKind::Stone, x: 280.0, y: 160.0, r: 20.0 },
                Obstacle { kind: ObstacleKind::Stone, x: 460.0, y: 260.0, r: 28.0 },
                Obstacle { kind: ObstacleKind::Hole, x: 600.0, y: 360.0, r: 26.0 },
                Obstacle { kind: ObstacleKind::Hole, x: 720.0, y: 200.0, r: 24.0 },
            ],
            initial_sheep: 8,
            shepherd_start: Vec2::new(120.0, base_h - 120.0),
        },
        LevelConfig {
            id: "level3".to_string(),
            meta: LevelMeta {
                number: 3,
                title: "Bosque".to_string(),
            },
            environment: Environment::Forest,
            goal: Goal {
                x: base_w - 120.0,
                y: 120.0,
                r: 55.0,
            },
            obstacles: vec![
                Obstacle { kind: ObstacleKind::Tree, x: 300.0, y: 120.0, r: 26.0 },
                Obstacle { kind: ObstacleKind::Tree, x: 360.0, y: 200.0, r: 24.0 },
                Obstacle { kind: ObstacleKind::Tree, x: 420.0, y: 280.0, r: 26.0 },
                Obstacle { kind: ObstacleKind::Tree, x: 480.0, y: 360.0, r: 28.0 },
                Obstacle { kind: ObstacleKind::Tree, x: 540.0, y: 260.0, r: 24.0 },
                Obstacle { kind: ObstacleKind::Tree, x: 600.0, y: 180.0, r: 22.0 },
            ],
            initial_sheep: 8,
            shepherd_start: Vec2::new(120.0, base_h - 120.0),
        },
        LevelConfig {
            id: "level4".to_string(),
            meta: LevelMeta {
                number: 4,
                title: "Tormenta de Nieve".to_string(),
            },
            environment: Environment::Snow,
            goal: Goal {
                x: 120.0,
                y: 120.0,
                r: 60.0,
            },
            obstacles: vec![
                Obstacle { kind: ObstacleKind::Stone, x: 400.0, y: 200.0, r: 22.0 },
                Obstacle { kind: ObstacleKind::Stone, x: 520.0, y: 320.0, r: 24.0 },
                Obstacle { kind: ObstacleKind::Tree, x: 680.0, y: 260.0, r: 20.0 },
            ],
            initial_sheep: 10,
            shepherd_start: Vec2::new(base_w - 160.0, base_h - 120.0),
        },
    ]
}
