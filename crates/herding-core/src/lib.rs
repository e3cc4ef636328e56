pub mod agent;
pub mod config;
pub mod dog;
pub mod levels;
pub mod shepherd;
pub mod sheep;
pub mod spatial;
pub mod store;
pub mod vec2;
pub mod world;

pub use config::{SheepConfig, SimConfig, SimConfigError, StrollConfig};
pub use levels::{builtin_levels, Environment, Goal, LevelConfig, Obstacle, ObstacleKind};
pub use store::GameStore;
pub use vec2::Vec2;
pub use world::{ExperimentError, RunSummary, TickMetrics, World};
