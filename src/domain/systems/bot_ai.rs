// Autonomous agent controller. Produces intents only; the engine executes them through
// its own move/throw operations so territory and physics rules live in one place.

use crate::domain::state::Agent;
use crate::domain::systems::territory::Territory;
use crate::domain::tuning::BotTuning;
use rand::Rng;
use std::collections::HashMap;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy)]
struct BotState {
    last_attack: u64,
    last_direction_change: u64,
    dir_x: f32,
    dir_y: f32,
}

/// What a bot wants to do this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BotAction {
    pub direction: Option<(f32, f32)>,
    pub direction_changed: bool,
    pub should_attack: bool,
}

#[derive(Debug)]
pub struct BotAi {
    tuning: BotTuning,
    bots: HashMap<String, BotState>,
}

impl BotAi {
    pub fn new(tuning: BotTuning) -> Self {
        Self {
            tuning,
            bots: HashMap::new(),
        }
    }

    /// Missing anchors default to `now` minus a random share of the interval, so bots
    /// registered together do not act in lockstep.
    pub fn register_bot(
        &mut self,
        id: &str,
        now: u64,
        attack_anchor: Option<u64>,
        direction_anchor: Option<u64>,
        rng: &mut impl Rng,
    ) {
        let attack_offset = rng.random_range(0..self.tuning.attack_interval_ms.max(1));
        let direction_offset = rng.random_range(0..self.tuning.direction_interval_ms.max(1));
        let angle = rng.random_range(0.0..TAU);

        self.bots.insert(
            id.to_string(),
            BotState {
                last_attack: attack_anchor.unwrap_or(now.saturating_sub(attack_offset)),
                last_direction_change: direction_anchor
                    .unwrap_or(now.saturating_sub(direction_offset)),
                dir_x: angle.cos(),
                dir_y: angle.sin(),
            },
        );
    }

    pub fn unregister_bot(&mut self, id: &str) {
        self.bots.remove(id);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.bots.contains_key(id)
    }

    pub fn clear(&mut self) {
        self.bots.clear();
    }

    pub fn update_bot(
        &mut self,
        agent: &Agent,
        now: u64,
        territory: &Territory,
        rng: &mut impl Rng,
    ) -> BotAction {
        let Some(bot) = self.bots.get_mut(&agent.id) else {
            return BotAction::default();
        };
        if agent.is_stunned {
            return BotAction::default();
        }

        let mut action = BotAction::default();

        if now.saturating_sub(bot.last_direction_change) >= self.tuning.direction_interval_ms {
            let angle = rng.random_range(0.0..TAU);
            bot.dir_x = angle.cos();
            bot.dir_y = angle.sin();
            bot.last_direction_change = now;
            action.direction_changed = true;
        }

        // Bounce off the boundary instead of picking a new heading.
        let ahead_x = agent.x + bot.dir_x * self.tuning.lookahead;
        let ahead_y = agent.y + bot.dir_y * self.tuning.lookahead;
        if !territory.is_in_territory(ahead_x, ahead_y, agent.team) {
            bot.dir_x = -bot.dir_x;
            bot.dir_y = -bot.dir_y;
        }
        action.direction = Some((bot.dir_x, bot.dir_y));

        if now.saturating_sub(bot.last_attack) >= self.tuning.attack_interval_ms {
            bot.last_attack = now;
            action.should_attack = true;
        }

        action
    }

    /// Charge level for a bot throw: fully charged with a fixed probability.
    pub fn throw_charge(&self, rng: &mut impl Rng) -> f32 {
        if rng.random_bool(self.tuning.charged_throw_probability) {
            1.0
        } else {
            0.3
        }
    }
}
