// Use cases layer: application workflows that drive the simulation core.

pub mod game;
pub mod local;
pub mod lobby;
pub mod names;
pub mod types;

pub use lobby::{RoomError, RoomHandle, RoomRegistry, RoomSettings};
pub use local::{LocalInput, LocalMatch};
pub use types::{GameEvent, ServerState, WorldUpdate};
