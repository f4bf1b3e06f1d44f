use crate::domain::Team;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, WorldUpdateDto};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{GameEvent, RoomHandle, ServerState, WorldUpdate};

use axum::{
    Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::timeout;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

type WsSink = SplitSink<WebSocket, Message>;
type WsStream = SplitStream<WebSocket>;

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    WorldUpdatesClosed,
    ServerStateClosed,
    JoinRequired,
    JoinTimeout,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct RoomQuery {
    // The room the client wants to join.
    #[serde(default)]
    room_id: Option<String>,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_NAME_LEN: usize = 32;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    world_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each world update once and broadcast the shared bytes.
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::WorldUpdate(WorldUpdateDto::from(update));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize world update");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                // Store the latest bytes for lag recovery.
                let _ = world_latest_tx.send(bytes.clone());
                let _ = world_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "world serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_room_serializer(room: &RoomHandle) {
    tokio::spawn(world_update_serializer(
        room.world_tx.subscribe(),
        room.world_bytes_tx.clone(),
        room.world_latest_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomQuery>,
) -> impl IntoResponse {
    let room_id = query
        .room_id
        .unwrap_or_else(|| state.default_room_id.to_string());

    let Some(room) = state.room_registry.get_room(&room_id).await else {
        // Keep not-found responses consistent with the JSON error schema.
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "room not found".to_string(),
            }),
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, room))
}

async fn handle_socket(socket: WebSocket, room: RoomHandle) {
    // Separate connection id for correlating logs before/after a player_id exists.
    let conn_id = rand_id();
    let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
    serve_connection(socket, room, span.clone())
        .instrument(span)
        .await;
}

async fn serve_connection(socket: WebSocket, room: RoomHandle, span: Span) {
    let (mut sink, mut stream) = socket.split();
    let mut ctx = match bootstrap_connection(&mut sink, &mut stream, &room).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            warn!(error = ?e, "failed to bootstrap connection");
            return;
        }
    };

    span.record("player_id", ctx.player_id.as_str());
    info!(
        player_id = %ctx.player_id,
        room_id = %room.room_id,
        "client connected"
    );

    if let Err(e) = run_client_loop(&mut sink, &mut stream, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

struct ConnCtx {
    player_id: String,
    input_tx: mpsc::Sender<GameEvent>,
    world_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    world_latest_rx: watch::Receiver<Utf8Bytes>,
    server_state_rx: watch::Receiver<ServerState>,

    msgs_in: u64,
    msgs_out: u64,
    invalid_json: u32,
    lag_recovery_count: u64,

    last_input_full_log: Instant,
    last_world_lag_log: Instant,
    last_invalid_input_log: Instant,

    close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn send_message(sink: &mut WsSink, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    sink.send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn send_close_with_reason(
    sink: &mut WsSink,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    sink.send(Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    })))
    .await
    .map_err(NetError::Ws)?;
    sink.close().await.map_err(NetError::Ws)
}

async fn bootstrap_connection(
    sink: &mut WsSink,
    stream: &mut WsStream,
    room: &RoomHandle,
) -> Result<ConnCtx, NetError> {
    // Subscribe to updates *before* doing anything else (awaits) to not miss packets.
    let world_bytes_rx = room.world_bytes_tx.subscribe();
    let world_latest_rx = room.world_latest_tx.subscribe();
    let server_state_rx = room.server_state_tx.subscribe();

    let (name, team) = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(sink, stream)).await
    {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(sink, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };

    let player_id = format!("p{}", rand_id());
    let (reply_tx, reply_rx) = oneshot::channel();

    // Join happens before the identity reply so the next snapshot includes the player.
    room.input_tx
        .send(GameEvent::Join {
            player_id: player_id.clone(),
            name,
            team,
            reply: Some(reply_tx),
        })
        .await
        .map_err(|_| NetError::InputClosed)?;

    // The room resolves an omitted team against its current roster.
    let assigned_team = reply_rx.await.map_err(|_| NetError::InputClosed)?;

    let identity = ServerMessage::Identity {
        player_id: player_id.clone(),
        team: assigned_team.into(),
    };
    let initial_state = ServerMessage::GameState(server_state_rx.borrow().clone().into());
    for msg in [identity, initial_state] {
        if let Err(e) = send_message(sink, &msg).await {
            // Compensate so the room does not keep a player that never connected.
            let _ = room
                .input_tx
                .send(GameEvent::Leave {
                    player_id: player_id.clone(),
                })
                .await;
            return Err(e);
        }
    }

    let now = Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now);
    Ok(ConnCtx {
        player_id,
        input_tx: room.input_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
        server_state_rx,

        msgs_in: 1,
        msgs_out: 2,
        invalid_json: 0,
        lag_recovery_count: 0,

        last_input_full_log: now,
        last_world_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

async fn read_join_handshake(
    sink: &mut WsSink,
    stream: &mut WsStream,
) -> Result<(String, Option<Team>), NetError> {
    loop {
        let Some(incoming) = stream.next().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        match incoming.map_err(NetError::Ws)? {
            Message::Text(text) => {
                let payload = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => payload,
                    Ok(_) => {
                        let _ = send_close_with_reason(sink, close_code::POLICY, "join required")
                            .await;
                        return Err(NetError::JoinRequired);
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            sink,
                            close_code::POLICY,
                            "invalid join payload",
                        )
                        .await;
                        return Err(NetError::JoinRequired);
                    }
                };

                let name = payload.name.trim();
                if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
                    let _ = send_close_with_reason(sink, close_code::POLICY, "invalid name").await;
                    return Err(NetError::JoinRequired);
                }

                return Ok((name.to_string(), payload.team.map(Team::from)));
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    sink,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

fn forward_command(ctx: &mut ConnCtx, event: GameEvent) -> Result<LoopControl, NetError> {
    match ctx.input_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            if should_log(&mut ctx.last_input_full_log) {
                warn!(player_id = %ctx.player_id, "input channel full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

fn handle_client_text(ctx: &mut ConnCtx, text: &str) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id.clone();
    let event = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Join(_)) => {
            // Ignore repeated Join packets after bootstrap to keep the session stable.
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(%player_id, "duplicate join ignored");
            }
            return Ok(LoopControl::Continue);
        }
        Ok(ClientMessage::Move(m)) => {
            if !m.dx.is_finite() || !m.dy.is_finite() {
                if should_log(&mut ctx.last_invalid_input_log) {
                    warn!(%player_id, "invalid move values (NaN/inf); dropping");
                }
                return Ok(LoopControl::Continue);
            }
            GameEvent::Move {
                player_id,
                dx: m.dx.clamp(-1.0, 1.0),
                dy: m.dy.clamp(-1.0, 1.0),
            }
        }
        Ok(ClientMessage::Throw(t)) => GameEvent::Throw {
            player_id,
            charge_level: if t.charge_level.is_finite() {
                t.charge_level
            } else {
                0.0
            },
        },
        Ok(ClientMessage::StartMatch) => GameEvent::StartMatch,
        Err(parse_err) => {
            ctx.invalid_json += 1;
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(
                    %player_id,
                    bytes = text.len(),
                    error = %parse_err,
                    "failed to parse client message"
                );
            }

            if ctx.invalid_json > MAX_INVALID_JSON {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "too many invalid messages".into(),
                });
                return Ok(LoopControl::Disconnect);
            }
            return Ok(LoopControl::Continue);
        }
    };

    forward_command(ctx, event)
}

fn handle_incoming_ws(
    ctx: &mut ConnCtx,
    incoming: Option<Result<Message, axum::Error>>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            ctx.msgs_in += 1;
            handle_client_text(ctx, &text)
        }
        Some(Ok(Message::Binary(_))) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            Ok(LoopControl::Disconnect)
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(LoopControl::Continue),
        Some(Ok(Message::Close(_))) => Ok(LoopControl::Disconnect),
        Some(Err(e)) => {
            warn!(player_id = %ctx.player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id = %ctx.player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_bytes(bytes: Utf8Bytes, sink: &mut WsSink, msgs_out: &mut u64) -> LoopControl {
    match sink.send(Message::Text(bytes)).await {
        Ok(()) => {
            *msgs_out += 1;
            LoopControl::Continue
        }
        Err(err) => {
            // Disconnect will follow immediately.
            warn!(error = ?err, "failed to send world update");
            LoopControl::Disconnect
        }
    }
}

async fn run_client_loop(
    sink: &mut WsSink,
    stream: &mut WsStream,
    ctx: &mut ConnCtx,
) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = stream.next() => {
                match handle_incoming_ws(ctx, incoming) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            world_msg = ctx.world_bytes_rx.recv() => {
                match world_msg {
                    Ok(bytes) => matches!(
                        forward_bytes(bytes, sink, &mut ctx.msgs_out).await,
                        LoopControl::Disconnect
                    ),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut ctx.last_world_lag_log) {
                            warn!(missed = n, "world updates lagged; sending latest snapshot");
                        }

                        // Resync strategy: every update is a full snapshot, so the latest one suffices.
                        let latest = ctx.world_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            ctx.lag_recovery_count += 1;
                            matches!(
                                forward_bytes(latest, sink, &mut ctx.msgs_out).await,
                                LoopControl::Disconnect
                            )
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::WorldUpdatesClosed);
                        true
                    }
                }
            }

            changed_state = ctx.server_state_rx.changed() => {
                match changed_state {
                    Ok(()) => {
                        let st = ctx.server_state_rx.borrow().clone();
                        match send_message(sink, &ServerMessage::GameState(st.into())).await {
                            Ok(_) => {
                                ctx.msgs_out += 1;
                                false
                            }
                            Err(err) => {
                                warn!(error = ?err, "failed to send server state");
                                true
                            }
                        }
                    }
                    Err(_) => {
                        warn!(player_id = %ctx.player_id, "server state channel closed; disconnecting");
                        fatal = Some(NetError::ServerStateClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = sink.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = sink.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    // Despawn the player; the room may already be gone during shutdown.
    if ctx
        .input_tx
        .send(GameEvent::Leave {
            player_id: ctx.player_id.clone(),
        })
        .await
        .is_err()
        && fatal.is_none()
    {
        fatal = Some(NetError::InputClosed);
    }

    debug!(
        player_id = %ctx.player_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        invalid_json = ctx.invalid_json,
        lag_recovery_count = ctx.lag_recovery_count,
        "connection stats"
    );
    info!(player_id = %ctx.player_id, "client disconnected");

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
