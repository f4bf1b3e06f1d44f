// Gameplay tuning for agents (human or bot).

pub const AGENT_RADIUS: f32 = 20.0;
pub const MOVE_SPEED: f32 = 3.0;
pub const INITIAL_ENERGY: i32 = 10;
pub const THROW_COOLDOWN_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Collision radius; also the safety margin kept from map edges and the seam.
    pub radius: f32,

    /// Distance moved per tick for a unit direction.
    pub move_speed: f32,

    /// Energy at match start. Reaching zero stuns the agent.
    pub initial_energy: i32,

    /// Minimum time between two successful throws of the same agent.
    pub throw_cooldown_ms: u64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: AGENT_RADIUS,
            move_speed: MOVE_SPEED,
            initial_energy: INITIAL_ENERGY,
            throw_cooldown_ms: THROW_COOLDOWN_MS,
        }
    }
}
