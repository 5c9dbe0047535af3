// Public API - what other modules can use
pub use handlers::{handle_room_request, health};
pub use service::RoomService;

// Internal modules
mod handlers;
pub mod generators;
pub mod models;
pub mod repository;
mod service;
pub mod types;
