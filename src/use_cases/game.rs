use super::names::bot_name_generator;
use super::types::{GameEvent, ServerState, WorldUpdate};
use crate::domain::tuning::GameTuning;
use crate::domain::{EngineEvent, GameEngine, Phase, Team};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, info};

/// Wall-clock milliseconds handed to the engine as `now`.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

type EventBuffer = Arc<Mutex<Vec<EngineEvent>>>;

#[derive(Debug, Clone)]
struct RoomPlayer {
    name: String,
    team: Team,
    // Latest move direction; applied once per tick until the client changes it.
    heading: (f32, f32),
}

/// One hosted match: the engine plus the connected humans that survive rematches.
pub struct Room {
    tuning: GameTuning,
    engine: GameEngine,
    players: BTreeMap<String, RoomPlayer>,
    events: EventBuffer,
    tick: u64,
}

impl Room {
    pub fn new(tuning: GameTuning) -> Self {
        let events = EventBuffer::default();
        Self {
            engine: new_engine(tuning, &events),
            tuning,
            players: BTreeMap::new(),
            events,
            tick: 0,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn server_state(&self) -> ServerState {
        match (self.engine.phase(), self.engine.winner()) {
            (Phase::Lobby, _) => ServerState::Lobby,
            (Phase::Playing, _) => ServerState::MatchRunning,
            (Phase::Ended, Some(winner)) => ServerState::MatchEnded { winner },
            (Phase::Ended, None) => ServerState::Lobby,
        }
    }

    pub fn handle_event(&mut self, event: GameEvent, now: u64) {
        match event {
            GameEvent::Join {
                player_id,
                name,
                team,
                reply,
            } => {
                if let Some(existing) = self.players.get(&player_id) {
                    if let Some(reply) = reply {
                        let _ = reply.send(existing.team);
                    }
                    return;
                }
                let team = team.unwrap_or_else(|| self.smaller_team());
                if let Some(reply) = reply {
                    let _ = reply.send(team);
                }
                info!(%player_id, %name, %team, "player joined");
                // Joiners during a running match sit out until the next one.
                if self.engine.phase() == Phase::Lobby {
                    self.engine.add_agent(&player_id, &name, team, false);
                }
                self.players.insert(
                    player_id,
                    RoomPlayer {
                        name,
                        team,
                        heading: (0.0, 0.0),
                    },
                );
            }
            GameEvent::Leave { player_id } => {
                info!(%player_id, "player left");
                self.players.remove(&player_id);
                self.engine.remove_agent(&player_id);
            }
            GameEvent::Move { player_id, dx, dy } => {
                if let Some(player) = self.players.get_mut(&player_id) {
                    player.heading = (clamp_axis(dx), clamp_axis(dy));
                }
            }
            GameEvent::Throw {
                player_id,
                charge_level,
            } => {
                self.engine.handle_throw(&player_id, charge_level, now);
            }
            GameEvent::StartMatch => self.start_match(now),
        }
    }

    /// Applies held headings, advances the engine one tick and collects its notifications.
    pub fn step(&mut self, now: u64) -> WorldUpdate {
        for (id, player) in &self.players {
            let (dx, dy) = player.heading;
            if dx != 0.0 || dy != 0.0 {
                self.engine.handle_move(id, dx, dy);
            }
        }

        let was_playing = self.engine.phase() == Phase::Playing;
        self.engine.tick(now);
        if was_playing && self.engine.phase() == Phase::Ended {
            self.engine.purge_bots();
        }
        self.tick += 1;

        let events = std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        WorldUpdate {
            tick: self.tick,
            phase: self.engine.phase(),
            winner: self.engine.winner(),
            agents: self.engine.agents().cloned().collect(),
            projectiles: self.engine.projectiles().cloned().collect(),
            events,
        }
    }

    fn start_match(&mut self, now: u64) {
        match self.engine.phase() {
            Phase::Lobby => {}
            Phase::Playing => return,
            Phase::Ended => {
                // A finished engine is terminal; rematches get a fresh instance.
                self.engine.destroy();
                self.engine = new_engine(self.tuning, &self.events);
                for (id, player) in &self.players {
                    self.engine.add_agent(id, &player.name, player.team, false);
                }
                info!(players = self.players.len(), "rematch prepared");
            }
        }

        self.engine.fill_teams_to_quota(bot_name_generator());
        self.engine.start_match(now);
    }

    fn smaller_team(&self) -> Team {
        let red = self
            .players
            .values()
            .filter(|p| p.team == Team::Red)
            .count();
        if red * 2 <= self.players.len() {
            Team::Red
        } else {
            Team::Blue
        }
    }
}

fn new_engine(tuning: GameTuning, events: &EventBuffer) -> GameEngine {
    let mut engine = GameEngine::new(tuning);
    let sink = events.clone();
    engine.subscribe(move |event| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    });
    engine
}

fn clamp_axis(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) }
}

/// Authoritative fixed-step loop for one room.
pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    server_state_tx: watch::Sender<ServerState>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
    tuning: GameTuning,
) {
    let mut room = Room::new(tuning);
    let mut state = room.server_state();
    let _ = server_state_tx.send(state.clone());

    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                // Exit cleanly when the room is removed.
                debug!("world task shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        let now = now_millis();
        loop {
            match input_rx.try_recv() {
                Ok(ev) => room.handle_event(ev, now),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    debug!("input channel closed; world task exiting");
                    return;
                }
            }
        }

        let update = room.step(now);
        let _ = world_tx.send(update);

        let next = room.server_state();
        if next != state {
            info!(state = ?next, "room state changed");
            let _ = server_state_tx.send(next.clone());
            state = next;
        }
    }
}
