// Notifications the engine emits synchronously while mutating state.

use super::state::{Agent, MatchSnapshot, Projectile, Winner};

/// Payloads are owned copies; listeners cannot reach engine-owned state through them.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    AgentAdded(Agent),
    AgentUpdated(Agent),
    AgentRemoved { id: String },
    ProjectileAdded(Projectile),
    ProjectileUpdated(Projectile),
    ProjectileRemoved { id: String },
    MatchEnded { winner: Winner },
    StateChanged(MatchSnapshot),
}

pub type EngineListener = Box<dyn FnMut(&EngineEvent) + Send>;
