// Library crate for the room coordination server
// This file exposes the public API for integration tests

pub mod config;
pub mod room;
pub mod router;
pub mod shared;
pub mod store;

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use room::{models::RoomModel, repository::RoomRepository, RoomService};
pub use router::build_router;
pub use shared::{AppError, AppState};
pub use store::{InMemoryKvStore, KvStore, PostgresKvStore};
