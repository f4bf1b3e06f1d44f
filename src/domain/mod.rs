// Domain layer: core simulation types and rules.

pub mod engine;
pub mod events;
pub mod state;
pub mod systems;
pub mod tuning;

pub use engine::GameEngine;
pub use events::EngineEvent;
pub use state::{Agent, MatchSnapshot, Phase, Projectile, Team, Winner};
