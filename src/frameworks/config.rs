use crate::domain::tuning::TICK_RATE_HZ;
use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / TICK_RATE_HZ as u64);

// Room every client lands in when it does not name one.
pub const DEFAULT_ROOM_ID: &str = "main";

/// How the binary drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Hosted rooms behind the WebSocket server.
    Server,
    /// A single bots-only match in-process, no network.
    Local,
}

pub fn http_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

pub fn game_mode() -> GameMode {
    parse_game_mode(env::var("GAME_MODE").ok().as_deref())
}

fn parse_game_mode(value: Option<&str>) -> GameMode {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("local") => GameMode::Local,
        _ => GameMode::Server,
    }
}

pub fn local_match_timeout() -> Duration {
    let secs = env::var("LOCAL_MATCH_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(300);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_mode_is_unset_or_unknown_then_server_is_used() {
        assert_eq!(parse_game_mode(None), GameMode::Server);
        assert_eq!(parse_game_mode(Some("arcade")), GameMode::Server);
        assert_eq!(parse_game_mode(Some(" Local ")), GameMode::Local);
    }
}
