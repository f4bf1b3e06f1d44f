// Room orchestration for spawning and managing match worlds.

use crate::domain::tuning::GameTuning;
use crate::use_cases::game::world_task;
use crate::use_cases::{GameEvent, ServerState, WorldUpdate};
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock, broadcast, mpsc, watch};
use tracing::info;

/// Shared configuration for spawning room worlds.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Capacity for inbound player commands.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast world updates.
    pub world_broadcast_capacity: usize,
    /// Fixed tick interval for the game loop.
    pub tick_interval: Duration,
    /// Gameplay tuning every room engine is built with.
    pub tuning: GameTuning,
}

/// Errors returned by room registry operations.
#[derive(Debug, PartialEq)]
pub enum RoomError {
    /// Room already exists and cannot be re-created.
    AlreadyExists,
    /// No room with the requested id.
    NotFound,
    /// Pinned rooms live for the whole process.
    Pinned,
}

/// Per-room channels.
#[derive(Clone)]
pub struct RoomHandle {
    /// Identifier clients use to target this room.
    pub room_id: Arc<str>,
    /// Sender for commands into the room world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    /// Broadcast sender for raw world updates.
    pub world_tx: broadcast::Sender<WorldUpdate>,
    /// Broadcast sender for serialized world updates.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    /// Watch sender holding the latest serialized world update.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    /// Watch sender for match lifecycle changes.
    pub server_state_tx: watch::Sender<ServerState>,
    /// Stops the world task when the room is removed.
    shutdown: Arc<Notify>,
    pinned: bool,
}

/// Thread-safe registry for active rooms.
#[derive(Debug)]
pub struct RoomRegistry {
    /// Global settings applied to newly created rooms.
    settings: RoomSettings,
    /// Map of room id to active handle.
    rooms: RwLock<HashMap<String, RoomHandle>>,
}

impl RoomRegistry {
    /// Creates a new registry with the provided settings.
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            settings,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a new room and spawns its world task.
    pub async fn create_room(
        &self,
        room_id: String,
        pinned: bool,
    ) -> Result<RoomHandle, RoomError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room_id) {
            return Err(RoomError::AlreadyExists);
        }

        // Channel wiring for the room world loop.
        let (input_tx, input_rx) = mpsc::channel::<GameEvent>(self.settings.input_channel_capacity);
        let (world_tx, _world_rx) =
            broadcast::channel::<WorldUpdate>(self.settings.world_broadcast_capacity);
        let (world_bytes_tx, _world_bytes_rx) =
            broadcast::channel::<Utf8Bytes>(self.settings.world_broadcast_capacity);
        let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
        let (server_state_tx, _server_state_rx) =
            watch::channel::<ServerState>(ServerState::Lobby);
        let shutdown = Arc::new(Notify::new());

        // Spawn the authoritative world loop for this room.
        tokio::spawn(world_task(
            input_rx,
            world_tx.clone(),
            server_state_tx.clone(),
            self.settings.tick_interval,
            shutdown.clone(),
            self.settings.tuning,
        ));

        let room = RoomHandle {
            room_id: Arc::from(room_id.as_str()),
            input_tx,
            world_tx,
            world_bytes_tx,
            world_latest_tx,
            server_state_tx,
            shutdown,
            pinned,
        };

        info!(%room_id, pinned, "room created");
        rooms.insert(room_id, room.clone());
        Ok(room)
    }

    /// Returns a room handle for the provided id, if it exists.
    pub async fn get_room(&self, room_id: &str) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned()
    }

    /// Removes an unpinned room and stops its world task.
    pub async fn remove_room(&self, room_id: &str) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        match rooms.get(room_id) {
            None => return Err(RoomError::NotFound),
            Some(room) if room.pinned => return Err(RoomError::Pinned),
            Some(_) => {}
        }

        if let Some(room) = rooms.remove(room_id) {
            // notify_one stores a permit, so a task between ticks still sees it.
            room.shutdown.notify_one();
        }
        info!(%room_id, "room removed");
        Ok(())
    }
}

impl std::fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHandle")
            .field("room_id", &self.room_id)
            .field("pinned", &self.pinned)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(RoomSettings {
            input_channel_capacity: 16,
            world_broadcast_capacity: 16,
            tick_interval: Duration::from_millis(10),
            tuning: GameTuning::default(),
        })
    }

    #[tokio::test]
    async fn when_room_id_is_taken_then_create_fails() {
        let registry = registry();
        registry
            .create_room("alpha".to_string(), false)
            .await
            .expect("first create succeeds");
        let again = registry.create_room("alpha".to_string(), false).await;
        assert!(matches!(again, Err(RoomError::AlreadyExists)));
        assert!(registry.get_room("alpha").await.is_some());
    }

    #[tokio::test]
    async fn when_room_is_removed_then_lookup_fails_and_world_task_stops() {
        let registry = registry();
        let room = registry
            .create_room("beta".to_string(), false)
            .await
            .expect("create succeeds");

        assert_eq!(registry.remove_room("beta").await, Ok(()));
        assert!(registry.get_room("beta").await.is_none());
        assert_eq!(registry.remove_room("beta").await, Err(RoomError::NotFound));

        // The world task drops its receiver once it exits.
        tokio::time::timeout(Duration::from_secs(2), room.input_tx.closed())
            .await
            .expect("world task should stop");
    }

    #[tokio::test]
    async fn when_room_is_pinned_then_it_cannot_be_removed() {
        let registry = registry();
        registry
            .create_room("main".to_string(), true)
            .await
            .expect("create succeeds");
        assert_eq!(registry.remove_room("main").await, Err(RoomError::Pinned));
    }
}
