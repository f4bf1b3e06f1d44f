// Standalone mode: the same engine driven by a local loop instead of a room server.

use super::names::bot_name_generator;
use crate::domain::tuning::GameTuning;
use crate::domain::{EngineEvent, GameEngine, Phase, Team, Winner};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

pub const LOCAL_PLAYER_ID: &str = "local";

/// Directives produced by local input devices for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalInput {
    pub dx: f32,
    pub dy: f32,
    /// Release a throw at this charge level.
    pub throw_charge: Option<f32>,
}

pub struct LocalMatch {
    engine: GameEngine,
    events: Arc<Mutex<Vec<EngineEvent>>>,
    has_player: bool,
}

impl LocalMatch {
    /// Local match with a human on `team`.
    pub fn new(tuning: GameTuning, player_name: &str, team: Team) -> Self {
        let mut local = Self::bots_only(tuning);
        local
            .engine
            .add_agent(LOCAL_PLAYER_ID, player_name, team, false);
        local.has_player = true;
        local
    }

    /// Local match where bots play both sides.
    pub fn bots_only(tuning: GameTuning) -> Self {
        Self::with_engine(GameEngine::new(tuning))
    }

    pub fn with_engine(mut engine: GameEngine) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        engine.subscribe(move |event| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        });
        Self {
            engine,
            events,
            has_player: false,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Fills both teams with bots and starts playing.
    pub fn start(&mut self, now: u64) {
        self.engine.fill_teams_to_quota(bot_name_generator());
        self.engine.start_match(now);
    }

    pub fn apply_input(&mut self, input: LocalInput, now: u64) {
        if !self.has_player {
            return;
        }
        if input.dx != 0.0 || input.dy != 0.0 {
            self.engine.handle_move(
                LOCAL_PLAYER_ID,
                input.dx.clamp(-1.0, 1.0),
                input.dy.clamp(-1.0, 1.0),
            );
        }
        if let Some(charge) = input.throw_charge {
            self.engine.handle_throw(LOCAL_PLAYER_ID, charge, now);
        }
    }

    /// Advances one tick and returns everything the renderer has to reflect.
    pub fn step(&mut self, now: u64) -> Vec<EngineEvent> {
        self.engine.tick(now);
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_over(&self) -> bool {
        self.engine.phase() == Phase::Ended
    }

    pub fn winner(&self) -> Option<Winner> {
        self.engine.winner()
    }
}

/// Runs a bots-only match at `tick_interval` until it ends or `timeout` elapses.
pub async fn run_local_match(
    tuning: GameTuning,
    tick_interval: Duration,
    timeout: Duration,
) -> Option<Winner> {
    let mut local = LocalMatch::bots_only(tuning);
    local.start(super::game::now_millis());
    info!("local match started");

    let mut interval = tokio::time::interval(tick_interval);
    let deadline = tokio::time::Instant::now() + timeout;
    let mut ticks: u64 = 0;
    while !local.is_over() && tokio::time::Instant::now() < deadline {
        interval.tick().await;
        local.step(super::game::now_millis());
        ticks += 1;
    }

    let winner = local.winner();
    info!(?winner, ticks, "local match finished");
    local.engine.destroy();
    winner
}
