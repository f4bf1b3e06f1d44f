// Wire protocol DTOs and conversions for public game server messages.
// Internal service-to-service DTOs should live outside this module.

use crate::domain::{Agent, EngineEvent, MatchSnapshot, Phase, Projectile, Team, Winner};
use crate::use_cases::{ServerState, WorldUpdate};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { player_id: String, team: TeamDto },
    // Snapshot of the room for a given tick plus the notifications since the last one.
    WorldUpdate(WorldUpdateDto),
    // Match lifecycle transitions (lobby, running, ended).
    GameState(ServerStateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake message.
    Join(JoinPayload),
    // Held movement direction; zero vector stops.
    Move(MovePayload),
    Throw(ThrowPayload),
    StartMatch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub name: String,
    // Omitted means "put me on the smaller team".
    #[serde(default)]
    pub team: Option<TeamDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovePayload {
    #[serde(default)]
    pub dx: f32,
    #[serde(default)]
    pub dy: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrowPayload {
    #[serde(default)]
    pub charge_level: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamDto {
    Red,
    Blue,
}

impl From<Team> for TeamDto {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => TeamDto::Red,
            Team::Blue => TeamDto::Blue,
        }
    }
}

impl From<TeamDto> for Team {
    fn from(team: TeamDto) -> Self {
        match team {
            TeamDto::Red => Team::Red,
            TeamDto::Blue => Team::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WinnerDto {
    Red,
    Blue,
    Draw,
}

impl From<Winner> for WinnerDto {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::Red => WinnerDto::Red,
            Winner::Blue => WinnerDto::Blue,
            Winner::Draw => WinnerDto::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseDto {
    Lobby,
    Playing,
    Ended,
}

impl From<Phase> for PhaseDto {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Lobby => PhaseDto::Lobby,
            Phase::Playing => PhaseDto::Playing,
            Phase::Ended => PhaseDto::Ended,
        }
    }
}

/// Snapshot of the room sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub phase: PhaseDto,
    pub winner: Option<WinnerDto>,
    pub agents: Vec<AgentDto>,
    pub projectiles: Vec<ProjectileDto>,
    pub events: Vec<EventDto>,
}

impl From<WorldUpdate> for WorldUpdateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            phase: update.phase.into(),
            winner: update.winner.map(WinnerDto::from),
            agents: update.agents.iter().map(AgentDto::from).collect(),
            projectiles: update.projectiles.iter().map(ProjectileDto::from).collect(),
            // Per-tick projectile motion already rides in the snapshot.
            events: update
                .events
                .iter()
                .filter(|e| !matches!(e, EngineEvent::ProjectileUpdated(_)))
                .map(EventDto::from)
                .collect(),
        }
    }
}

/// Flattened agent state for wire transmission.
#[derive(Debug, Clone, Serialize)]
pub struct AgentDto {
    pub id: String,
    pub name: String,
    pub team: TeamDto,
    pub is_bot: bool,
    pub x: f32,
    pub y: f32,
    pub energy: i32,
    pub is_stunned: bool,
}

impl From<&Agent> for AgentDto {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            team: agent.team.into(),
            is_bot: agent.is_bot,
            x: agent.x,
            y: agent.y,
            energy: agent.energy,
            is_stunned: agent.is_stunned,
        }
    }
}

/// Flattened snowball state for wire transmission.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectileDto {
    pub id: String,
    pub owner_id: String,
    pub team: TeamDto,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: i32,
}

impl From<&Projectile> for ProjectileDto {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id.clone(),
            owner_id: p.owner_id.clone(),
            team: p.team.into(),
            x: p.x,
            y: p.y,
            vx: p.vx,
            vy: p.vy,
            damage: p.damage,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchStateDto {
    pub phase: PhaseDto,
    pub winner: Option<WinnerDto>,
    pub map_size: f32,
}

impl From<&MatchSnapshot> for MatchStateDto {
    fn from(s: &MatchSnapshot) -> Self {
        Self {
            phase: s.phase.into(),
            winner: s.winner.map(WinnerDto::from),
            map_size: s.map_size,
        }
    }
}

/// Engine notification relayed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum EventDto {
    AgentAdded(AgentDto),
    AgentUpdated(AgentDto),
    AgentRemoved { id: String },
    ProjectileAdded(ProjectileDto),
    ProjectileUpdated(ProjectileDto),
    ProjectileRemoved { id: String },
    MatchEnded { winner: WinnerDto },
    StateChanged(MatchStateDto),
}

impl From<&EngineEvent> for EventDto {
    fn from(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::AgentAdded(a) => EventDto::AgentAdded(a.into()),
            EngineEvent::AgentUpdated(a) => EventDto::AgentUpdated(a.into()),
            EngineEvent::AgentRemoved { id } => EventDto::AgentRemoved { id: id.clone() },
            EngineEvent::ProjectileAdded(p) => EventDto::ProjectileAdded(p.into()),
            EngineEvent::ProjectileUpdated(p) => EventDto::ProjectileUpdated(p.into()),
            EngineEvent::ProjectileRemoved { id } => {
                EventDto::ProjectileRemoved { id: id.clone() }
            }
            EngineEvent::MatchEnded { winner } => EventDto::MatchEnded {
                winner: (*winner).into(),
            },
            EngineEvent::StateChanged(s) => EventDto::StateChanged(s.into()),
        }
    }
}

/// Match lifecycle state sent to clients for UI flow.
#[derive(Debug, Clone, Serialize)]
pub enum ServerStateDto {
    Lobby,
    MatchRunning,
    MatchEnded { winner: WinnerDto },
}

impl From<ServerState> for ServerStateDto {
    fn from(state: ServerState) -> Self {
        match state {
            ServerState::Lobby => ServerStateDto::Lobby,
            ServerState::MatchRunning => ServerStateDto::MatchRunning,
            ServerState::MatchEnded { winner } => ServerStateDto::MatchEnded {
                winner: winner.into(),
            },
        }
    }
}
