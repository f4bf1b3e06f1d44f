use crate::use_cases::RoomRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Registry of active rooms and their channels.
    pub room_registry: Arc<RoomRegistry>,
    // Room used when a client connects without `room_id`.
    pub default_room_id: Arc<str>,
}
