// Domain-level simulation entities and snapshot types.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => f.write_str("red"),
            Team::Blue => f.write_str("blue"),
        }
    }
}

/// Match lifecycle. Transitions only move forward: lobby -> playing -> ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Red,
    Blue,
    Draw,
}

impl From<Team> for Winner {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => Winner::Red,
            Team::Blue => Winner::Blue,
        }
    }
}

/// One participant, human or bot.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub is_bot: bool,

    pub x: f32,
    pub y: f32,

    // Never negative. Stunned agents keep absorbing hits without losing more.
    pub energy: i32,
    pub is_stunned: bool,
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: Team,
        is_bot: bool,
        energy: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team,
            is_bot,
            x: 0.0,
            y: 0.0,
            energy,
            is_stunned: false,
        }
    }
}

/// A thrown snowball. Velocity and damage are fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: String,
    pub owner_id: String,
    // Copied from the thrower at throw time.
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: i32,
}

/// Match-level state shared with listeners on phase changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    pub phase: Phase,
    pub winner: Option<Winner>,
    pub map_size: f32,
}
