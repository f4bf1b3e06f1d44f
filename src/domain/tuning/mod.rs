// Gameplay tuning shared by the hosted and local deployment modes.
//
// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).

pub mod bot;
pub mod map;
pub mod player;
pub mod projectile;

pub use bot::BotTuning;
pub use map::MapTuning;
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;

/// Fixed simulation rate both deployment modes drive `tick` at.
pub const TICK_RATE_HZ: u32 = 60;

/// Agents per team after bots fill the roster.
pub const TEAM_QUOTA: usize = 3;

/// Aggregate tuning handed to a `GameEngine`.
#[derive(Debug, Clone, Copy)]
pub struct GameTuning {
    pub map: MapTuning,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub bot: BotTuning,
    pub team_quota: usize,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            map: MapTuning::default(),
            player: PlayerTuning::default(),
            projectile: ProjectileTuning::default(),
            bot: BotTuning::default(),
            team_quota: TEAM_QUOTA,
        }
    }
}
