// Gameplay tuning for autonomous agents.

pub const BOT_DIRECTION_INTERVAL_MS: u64 = 1_000;
pub const BOT_ATTACK_INTERVAL_MS: u64 = 2_000;
pub const BOT_LOOKAHEAD: f32 = 30.0;
pub const BOT_CHARGED_THROW_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct BotTuning {
    /// How often a bot picks a new random heading.
    pub direction_interval_ms: u64,

    /// How often a bot throws. Independent of the heading timer.
    pub attack_interval_ms: u64,

    /// Distance ahead checked against the territory before moving.
    pub lookahead: f32,

    /// Chance that a bot throw is fully charged.
    pub charged_throw_probability: f64,
}

impl Default for BotTuning {
    fn default() -> Self {
        Self {
            direction_interval_ms: BOT_DIRECTION_INTERVAL_MS,
            attack_interval_ms: BOT_ATTACK_INTERVAL_MS,
            lookahead: BOT_LOOKAHEAD,
            charged_throw_probability: BOT_CHARGED_THROW_PROBABILITY,
        }
    }
}
