use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::net::client::spawn_room_serializer;
use crate::interface_adapters::state::AppState;
use crate::use_cases::RoomError;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

const MAX_ROOM_ID_LEN: usize = 64;

#[derive(Debug, serde::Deserialize)]
pub struct CreateRoomRequest {
    // Room id clients will pass as `?room_id=` on the WebSocket route.
    room_id: String,
}

#[derive(Debug, serde::Serialize)]
struct CreateRoomResponse {
    room_id: String,
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn is_valid_room_id(room_id: &str) -> bool {
    !room_id.is_empty()
        && room_id.len() <= MAX_ROOM_ID_LEN
        && room_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRoomRequest>,
) -> Response {
    let room_id = payload.room_id.trim().to_string();
    if !is_valid_room_id(&room_id) {
        return error_response(StatusCode::BAD_REQUEST, "room_id is required");
    }

    // Created rooms are not pinned and can be deleted again.
    match state.room_registry.create_room(room_id.clone(), false).await {
        Ok(room) => {
            // Create the serializer so clients can subscribe immediately.
            spawn_room_serializer(&room);
            (StatusCode::CREATED, Json(CreateRoomResponse { room_id })).into_response()
        }
        Err(RoomError::AlreadyExists) => {
            error_response(StatusCode::CONFLICT, "room already exists")
        }
        Err(e) => {
            tracing::warn!(%room_id, error = ?e, "unexpected room create failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "room create failed")
        }
    }
}

pub async fn delete_room_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Response {
    match state.room_registry.remove_room(&room_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(RoomError::NotFound) => error_response(StatusCode::NOT_FOUND, "room not found"),
        Err(RoomError::Pinned) => error_response(StatusCode::CONFLICT, "room is pinned"),
        Err(RoomError::AlreadyExists) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "room delete failed")
        }
    }
}
