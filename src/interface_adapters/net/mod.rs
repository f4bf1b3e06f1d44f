// Network adapter modules split by player sockets vs room management routes.

pub mod client;
pub mod internal;

pub use client::{spawn_room_serializer, ws_handler};
pub use internal::{create_room_handler, delete_room_handler};
