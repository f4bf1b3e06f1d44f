pub mod bot_ai;
pub mod physics;
pub mod territory;

pub use bot_ai::{BotAction, BotAi};
pub use territory::Territory;
