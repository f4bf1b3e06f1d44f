// Authoritative match simulation shared by the hosted room loop and the local mode.

use crate::domain::events::{EngineEvent, EngineListener};
use crate::domain::state::{Agent, MatchSnapshot, Phase, Projectile, Team, Winner};
use crate::domain::systems::bot_ai::BotAi;
use crate::domain::systems::physics::{self, PhysicsConfig};
use crate::domain::systems::territory::Territory;
use crate::domain::tuning::GameTuning;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Owns every agent and projectile of one match.
///
/// All operations are synchronous: listeners registered with [`GameEngine::subscribe`] run
/// in the caller's stack before the operation returns. Calls made in the wrong phase, for
/// unknown agents, while stunned or on cooldown are silently ignored.
pub struct GameEngine {
    tuning: GameTuning,
    territory: Territory,
    physics: PhysicsConfig,
    bot_ai: BotAi,
    rng: StdRng,

    phase: Phase,
    winner: Option<Winner>,
    agents: BTreeMap<String, Agent>,
    projectiles: BTreeMap<String, Projectile>,

    // Timestamp of each agent's last successful throw.
    last_throw: HashMap<String, u64>,
    // Agents added after the match started; they sit out until a fresh engine.
    benched: HashSet<String>,
    next_projectile_id: u64,
    next_bot_id: u64,

    listeners: Vec<EngineListener>,
}

impl GameEngine {
    pub fn new(tuning: GameTuning) -> Self {
        Self::with_rng(tuning, StdRng::from_os_rng())
    }

    /// Seeded engine for reproducible tests and tooling.
    pub fn with_seed(tuning: GameTuning, seed: u64) -> Self {
        Self::with_rng(tuning, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tuning: GameTuning, rng: StdRng) -> Self {
        Self {
            territory: Territory::new(tuning.map, tuning.player.radius),
            physics: PhysicsConfig {
                map_size: tuning.map.size,
                agent_radius: tuning.player.radius,
                projectile: tuning.projectile,
            },
            bot_ai: BotAi::new(tuning.bot),
            tuning,
            rng,
            phase: Phase::Lobby,
            winner: None,
            agents: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            last_throw: HashMap::new(),
            benched: HashSet::new(),
            next_projectile_id: 1,
            next_bot_id: 1,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EngineEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn territory(&self) -> &Territory {
        &self.territory
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn agent_count(&self, team: Team) -> usize {
        self.agents.values().filter(|a| a.team == team).count()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            phase: self.phase,
            winner: self.winner,
            map_size: self.tuning.map.size,
        }
    }

    pub fn add_agent(&mut self, id: &str, name: &str, team: Team, is_bot: bool) {
        let agent = Agent::new(id, name, team, is_bot, self.tuning.player.initial_energy);
        if self.phase != Phase::Lobby {
            // Rosters are fixed at match start.
            self.benched.insert(id.to_string());
        }
        info!(agent_id = id, name, %team, is_bot, "agent added");
        self.agents.insert(id.to_string(), agent.clone());
        self.emit(EngineEvent::AgentAdded(agent));
    }

    pub fn remove_agent(&mut self, id: &str) {
        if self.agents.remove(id).is_none() {
            return;
        }

        self.bot_ai.unregister_bot(id);
        self.last_throw.remove(id);
        self.benched.remove(id);
        info!(agent_id = id, "agent removed");
        self.emit(EngineEvent::AgentRemoved { id: id.to_string() });
    }

    /// Removes every bot, e.g. once a match is over.
    pub fn purge_bots(&mut self) {
        let bots: Vec<String> = self
            .agents
            .values()
            .filter(|a| a.is_bot)
            .map(|a| a.id.clone())
            .collect();
        for id in bots {
            self.remove_agent(&id);
        }
    }

    /// Tops every team up to the quota with bots. Never removes anyone.
    pub fn fill_teams_to_quota(&mut self, mut name_generator: impl FnMut(Team) -> String) {
        for team in Team::ALL {
            while self.agent_count(team) < self.tuning.team_quota {
                let id = self.next_bot_id();
                let name = name_generator(team);
                self.add_agent(&id, &name, team, true);
            }
        }
    }

    pub fn start_match(&mut self, now: u64) {
        if self.phase != Phase::Lobby {
            return;
        }
        self.phase = Phase::Playing;

        let mut updated = Vec::with_capacity(self.agents.len());
        for agent in self.agents.values_mut() {
            agent.energy = self.tuning.player.initial_energy;
            agent.is_stunned = false;
            (agent.x, agent.y) = self.territory.spawn_position(agent.team, &mut self.rng);
            if agent.is_bot {
                self.bot_ai
                    .register_bot(&agent.id, now, None, None, &mut self.rng);
            }
            updated.push(agent.clone());
        }

        info!(
            red = self.agent_count(Team::Red),
            blue = self.agent_count(Team::Blue),
            "match started"
        );
        for agent in updated {
            self.emit(EngineEvent::AgentUpdated(agent));
        }
        self.emit(EngineEvent::StateChanged(self.snapshot()));
    }

    /// Moves an agent by `move_speed * (dx, dy)`.
    ///
    /// A move that would leave the agent's territory is resolved to the clamped boundary
    /// position; it is dropped only when even that position is illegal.
    pub fn handle_move(&mut self, agent_id: &str, dx: f32, dy: f32) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.benched.contains(agent_id) {
            return;
        }
        let Some(agent) = self.agents.get_mut(agent_id) else {
            return;
        };
        if agent.is_stunned {
            return;
        }

        let speed = self.tuning.player.move_speed;
        let (cx, cy) = (agent.x + dx * speed, agent.y + dy * speed);
        let (x, y) = if self.territory.is_in_territory(cx, cy, agent.team) {
            (cx, cy)
        } else {
            let (x, y) = self.territory.clamp_to_territory(cx, cy, agent.team);
            if !self.territory.is_in_territory(x, y, agent.team) {
                return;
            }
            (x, y)
        };

        if (x, y) == (agent.x, agent.y) {
            return;
        }
        agent.x = x;
        agent.y = y;
        let snapshot = agent.clone();
        self.emit(EngineEvent::AgentUpdated(snapshot));
    }

    pub fn handle_throw(&mut self, agent_id: &str, charge_level: f32, now: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.benched.contains(agent_id) {
            return;
        }
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        if agent.is_stunned {
            return;
        }
        if let Some(last) = self.last_throw.get(agent_id) {
            if now.saturating_sub(*last) < self.tuning.player.throw_cooldown_ms {
                return;
            }
        }

        let charge = if charge_level.is_nan() {
            0.0
        } else {
            charge_level.clamp(0.0, 1.0)
        };
        let damage = self.tuning.projectile.damage_for_charge(charge);
        let (dir_x, dir_y) = self.territory.snowball_direction(agent.team);
        let speed = self.tuning.projectile.speed;

        let projectile = Projectile {
            id: format!("snowball-{}", self.next_projectile_id),
            owner_id: agent.id.clone(),
            team: agent.team,
            x: agent.x,
            y: agent.y,
            vx: dir_x * speed,
            vy: dir_y * speed,
            damage,
        };
        self.next_projectile_id += 1;
        self.last_throw.insert(agent_id.to_string(), now);

        debug!(
            agent_id,
            projectile_id = %projectile.id,
            charge,
            damage,
            "snowball thrown"
        );
        self.projectiles
            .insert(projectile.id.clone(), projectile.clone());
        self.emit(EngineEvent::ProjectileAdded(projectile));
    }

    /// One fixed step: bot decisions, then projectiles, then the win check.
    pub fn tick(&mut self, now: u64) {
        if self.phase != Phase::Playing {
            return;
        }

        self.tick_bots(now);
        self.tick_projectiles();
        self.check_win_condition();
    }

    /// Drops all state and leaves the engine inert. Safe to call more than once.
    ///
    /// The phase moves to `Ended` without notifying listeners, so later ticks and
    /// `start_match` calls do nothing.
    pub fn destroy(&mut self) {
        self.phase = Phase::Ended;
        self.bot_ai.clear();
        self.last_throw.clear();
        self.benched.clear();
        self.agents.clear();
        self.projectiles.clear();
    }

    fn tick_bots(&mut self, now: u64) {
        let bots: Vec<String> = self
            .agents
            .values()
            .filter(|a| a.is_bot && !a.is_stunned && !self.benched.contains(&a.id))
            .map(|a| a.id.clone())
            .collect();

        for id in bots {
            let Some(agent) = self.agents.get(&id).cloned() else {
                continue;
            };
            let action = self
                .bot_ai
                .update_bot(&agent, now, &self.territory, &mut self.rng);

            if let Some((dx, dy)) = action.direction {
                self.handle_move(&id, dx, dy);
            }
            if action.should_attack {
                let charge = self.bot_ai.throw_charge(&mut self.rng);
                self.handle_throw(&id, charge, now);
            }
        }
    }

    fn tick_projectiles(&mut self) {
        let ids: Vec<String> = self.projectiles.keys().cloned().collect();

        for id in ids {
            let Some(mut p) = self.projectiles.remove(&id) else {
                continue;
            };
            physics::update_projectile(&mut p);

            if physics::is_out_of_bounds(&p, &self.physics) {
                self.emit(EngineEvent::ProjectileRemoved { id });
                continue;
            }

            // First agent found wins; stunned agents still stop the snowball.
            let mut struck = false;
            let mut victim = None;
            for agent in self.agents.values_mut() {
                if self.benched.contains(&agent.id) {
                    continue;
                }
                if !physics::check_collision(&p, agent, &self.physics) {
                    continue;
                }
                struck = true;
                if self.phase == Phase::Playing && !agent.is_stunned {
                    let stunned = physics::apply_damage(agent, p.damage);
                    info!(
                        victim_id = %agent.id,
                        thrower_id = %p.owner_id,
                        projectile_id = %p.id,
                        energy = agent.energy,
                        stunned,
                        "agent hit"
                    );
                    victim = Some(agent.clone());
                }
                break;
            }

            if let Some(agent) = victim {
                self.emit(EngineEvent::AgentUpdated(agent));
            }
            if struck {
                self.emit(EngineEvent::ProjectileRemoved { id });
            } else {
                self.emit(EngineEvent::ProjectileUpdated(p.clone()));
                self.projectiles.insert(id, p);
            }
        }
    }

    fn check_win_condition(&mut self) {
        let active = |team: Team| {
            self.agents
                .values()
                .filter(|a| a.team == team && !a.is_stunned && !self.benched.contains(&a.id))
                .count()
        };

        let winner = match (active(Team::Red), active(Team::Blue)) {
            (0, 0) => Winner::Draw,
            (0, _) => Winner::Blue,
            (_, 0) => Winner::Red,
            _ => return,
        };
        self.end_match(winner);
    }

    fn end_match(&mut self, winner: Winner) {
        self.phase = Phase::Ended;
        self.winner = Some(winner);
        info!(?winner, "match ended");
        self.emit(EngineEvent::MatchEnded { winner });
        self.emit(EngineEvent::StateChanged(self.snapshot()));
    }

    fn next_bot_id(&mut self) -> String {
        loop {
            let id = format!("bot-{}", self.next_bot_id);
            self.next_bot_id += 1;
            if !self.agents.contains_key(&id) {
                return id;
            }
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}
