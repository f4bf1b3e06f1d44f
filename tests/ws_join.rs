mod support;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

fn ws_url(base_url: &str, room_id: Option<&str>) -> String {
    let host = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    match room_id {
        Some(room_id) => format!("ws://{host}/ws?room_id={room_id}"),
        None => format!("ws://{host}/ws"),
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("send should succeed");
}

// Read text frames until one of the requested type arrives.
async fn next_of_type(socket: &mut Socket, kind: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let msg = socket
                .next()
                .await
                .expect("socket open")
                .expect("frame ok");
            let Ok(text) = msg.to_text() else {
                continue;
            };
            let Ok(value) = serde_json::from_str::<Value>(text) else {
                continue;
            };
            if value["type"] == kind {
                break value;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {kind} message in time"))
}

async fn create_room(base_url: &str) -> String {
    let room_id = format!("ws-{}", uuid::Uuid::new_v4());
    let res = reqwest::Client::new()
        .post(format!("{base_url}/rooms"))
        .json(&json!({ "room_id": room_id }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    room_id
}

#[tokio::test]
async fn when_client_joins_then_identity_and_lobby_state_arrive() {
    let base_url = support::ensure_server();
    let room_id = create_room(base_url).await;
    let (mut socket, _) = connect_async(ws_url(base_url, Some(&room_id)))
        .await
        .expect("connect");

    send_json(
        &mut socket,
        json!({"type": "Join", "data": {"name": "Ada", "team": "blue"}}),
    )
    .await;

    let identity = next_of_type(&mut socket, "Identity").await;
    assert_eq!(identity["data"]["team"], "blue");
    let player_id = identity["data"]["player_id"]
        .as_str()
        .expect("player id")
        .to_string();

    let state = next_of_type(&mut socket, "GameState").await;
    assert_eq!(state["data"], "Lobby");

    // The lobby snapshot lists the new player once the room has ticked.
    let listed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let update = next_of_type(&mut socket, "WorldUpdate").await;
            let agents = update["data"]["agents"].as_array().cloned().unwrap_or_default();
            if agents.iter().any(|a| a["id"] == player_id.as_str()) {
                break true;
            }
        }
    })
    .await
    .unwrap_or(false);
    assert!(listed);
}

#[tokio::test]
async fn when_match_is_started_then_bots_fill_both_teams() {
    let base_url = support::ensure_server();
    let room_id = create_room(base_url).await;
    let (mut socket, _) = connect_async(ws_url(base_url, Some(&room_id)))
        .await
        .expect("connect");

    send_json(&mut socket, json!({"type": "Join", "data": {"name": "Bo"}})).await;
    let identity = next_of_type(&mut socket, "Identity").await;
    assert_eq!(identity["data"]["team"], "red");
    next_of_type(&mut socket, "GameState").await;

    send_json(&mut socket, json!({"type": "StartMatch"})).await;

    let running = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = next_of_type(&mut socket, "GameState").await;
            if state["data"] == "MatchRunning" {
                break true;
            }
        }
    })
    .await
    .unwrap_or(false);
    assert!(running);

    // Snapshots serialized before the start may still be in flight.
    let agents = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let update = next_of_type(&mut socket, "WorldUpdate").await;
            if update["data"]["phase"] == "playing" {
                break update["data"]["agents"].as_array().cloned().unwrap_or_default();
            }
        }
    })
    .await
    .expect("a running snapshot");
    assert_eq!(agents.len(), 6);
    assert_eq!(agents.iter().filter(|a| a["is_bot"] == true).count(), 5);
}

#[tokio::test]
async fn when_room_is_unknown_then_upgrade_fails() {
    let base_url = support::ensure_server();
    let result = connect_async(ws_url(base_url, Some("no-such-room"))).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn when_command_precedes_join_then_socket_is_closed() {
    let base_url = support::ensure_server();
    let (mut socket, _) = connect_async(ws_url(base_url, None))
        .await
        .expect("connect");

    send_json(&mut socket, json!({"type": "StartMatch"})).await;

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break true,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await
    .unwrap_or(false);
    assert!(closed);
}
