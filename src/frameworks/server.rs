// Framework bootstrap for the game server runtime.

use crate::domain::tuning::GameTuning;
use crate::frameworks::config::{self, GameMode};
use crate::interface_adapters::net::{
    create_room_handler, delete_room_handler, spawn_room_serializer, ws_handler,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::local::run_local_match;
use crate::use_cases::{RoomRegistry, RoomSettings};

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state().await?;
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms", post(create_room_handler))
        .route("/rooms/{room_id}", delete(delete_room_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

/// Entry point for the binary: reads the environment and runs the selected mode.
pub async fn run_with_config() -> Result<()> {
    init_runtime();

    match config::game_mode() {
        GameMode::Server => {
            let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

            // Bind TCP listener with error handling
            let listener = tokio::net::TcpListener::bind(address)
                .await
                .inspect_err(|e| {
                    tracing::error!(%address, error = %e, "failed to bind");
                })?;

            run(listener).await
        }
        GameMode::Local => {
            let winner = run_local_match(
                GameTuning::default(),
                config::TICK_INTERVAL,
                config::local_match_timeout(),
            )
            .await;
            match winner {
                Some(winner) => tracing::info!(?winner, "local match over"),
                None => tracing::warn!("local match timed out without a winner"),
            }
            Ok(())
        }
    }
}

async fn build_state() -> Result<Arc<AppState>> {
    // This owns the set of active room world tasks.
    let room_registry = Arc::new(RoomRegistry::new(RoomSettings {
        input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
        world_broadcast_capacity: config::WORLD_BROADCAST_CAPACITY,
        tick_interval: config::TICK_INTERVAL,
        tuning: GameTuning::default(),
    }));

    // Keep the default room pinned so it never gets deleted.
    let default_room = room_registry
        .create_room(config::DEFAULT_ROOM_ID.to_string(), true)
        .await
        .map_err(|e| std::io::Error::other(format!("failed to create default room: {e:?}")))?;
    spawn_room_serializer(&default_room);

    Ok(Arc::new(AppState {
        room_registry,
        default_room_id: Arc::from(config::DEFAULT_ROOM_ID),
    }))
}
