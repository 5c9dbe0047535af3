use std::sync::Arc;
use tracing::{debug, instrument};

use super::models::RoomModel;
use crate::shared::AppError;
use crate::store::KvStore;

/// Store key holding the document for `room_id`
pub fn room_key(room_id: &str) -> String {
    format!("room:{}", room_id)
}

/// Persists room documents as JSON in the key-value store
#[derive(Clone)]
pub struct RoomRepository {
    store: Arc<dyn KvStore>,
}

impl RoomRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        let raw = match self.store.get(&room_key(room_id)).await? {
            Some(raw) => raw,
            None => {
                debug!(room_id = %room_id, "Room not found in store");
                return Ok(None);
            }
        };

        let room: RoomModel = serde_json::from_str(&raw)?;
        debug!(
            room_id = %room_id,
            users = room.active_users.len(),
            operations = room.operations.len(),
            "Room loaded from store"
        );
        Ok(Some(room))
    }

    #[instrument(skip(self, room))]
    pub async fn save_room(&self, room_id: &str, room: &RoomModel) -> Result<(), AppError> {
        let raw = serde_json::to_string(room)?;
        self.store.put(&room_key(room_id), raw).await?;
        debug!(room_id = %room_id, "Room saved to store");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_room(&self, room_id: &str) -> Result<(), AppError> {
        self.store.delete(&room_key(room_id)).await?;
        debug!(room_id = %room_id, "Room deleted from store");
        Ok(())
    }
}
