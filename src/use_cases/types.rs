// Use-case level inputs/outputs for the room loop.

use crate::domain::{Agent, EngineEvent, Phase, Projectile, Team, Winner};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum GameEvent {
    Join {
        player_id: String,
        name: String,
        team: Option<Team>,
        // Receives the team the room actually assigned.
        reply: Option<oneshot::Sender<Team>>,
    },
    Leave {
        player_id: String,
    },
    Move {
        player_id: String,
        dx: f32,
        dy: f32,
    },
    Throw {
        player_id: String,
        charge_level: f32,
    },
    StartMatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerState {
    Lobby,
    MatchRunning,
    MatchEnded { winner: Winner },
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub phase: Phase,
    pub winner: Option<Winner>,
    pub agents: Vec<Agent>,
    pub projectiles: Vec<Projectile>,
    // Engine notifications emitted since the previous update.
    pub events: Vec<EngineEvent>,
}
