use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    generators::{Clock, OperationIdGenerator},
    models::{OperationLimits, OperationRecord, RoomModel, UserRecord},
    repository::RoomRepository,
    types::{
        CreateRoomRequest, CreateRoomResponse, GetUpdatesQuery, JoinRoomRequest,
        JoinRoomResponse, LeaveRoomRequest, RoomInfoResponse, SendOperationRequest,
        SuccessResponse, UpdatesResponse,
    },
};
use crate::shared::{AppError, AppState};

/// Service for handling room business logic
///
/// Every method is a plain load / mutate / save against the store. Nothing
/// guards the window between load and save, so two writers on the same room
/// can overwrite each other.
pub struct RoomService {
    repository: RoomRepository,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn OperationIdGenerator>,
    limits: OperationLimits,
}

impl RoomService {
    pub fn new(
        repository: RoomRepository,
        clock: Arc<dyn Clock>,
        id_generator: Arc<dyn OperationIdGenerator>,
        limits: OperationLimits,
    ) -> Self {
        Self {
            repository,
            clock,
            id_generator,
            limits,
        }
    }

    /// Builds a service from app state, failing if no store is configured
    pub fn from_state(state: &AppState) -> Result<Self, AppError> {
        let store = state.require_store()?;
        Ok(Self::new(
            RoomRepository::new(store),
            Arc::clone(&state.clock),
            Arc::clone(&state.id_generator),
            state.limits,
        ))
    }

    async fn load_room(&self, room_id: &str) -> Result<RoomModel, AppError> {
        self.repository
            .get_room(room_id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))
    }

    /// Creates (or overwrites) the room stored under `request.room_id`
    #[instrument(skip(self, request), fields(room_id = %request.room_id))]
    pub async fn create_room(
        &self,
        request: CreateRoomRequest,
    ) -> Result<CreateRoomResponse, AppError> {
        let now = self.clock.now_millis();
        let room = RoomModel::new(
            &request.room_id,
            request.room_data,
            request.snapshot,
            request.user_id,
            request.user_name,
            now,
        );

        self.repository.save_room(&request.room_id, &room).await?;

        info!(
            room_id = %request.room_id,
            created_by = %room.created_by,
            "Room created successfully"
        );

        Ok(CreateRoomResponse {
            success: true,
            room_id: request.room_id,
            message: "Room created successfully".to_string(),
        })
    }

    /// Adds the caller to the room's member list if not already present
    #[instrument(skip(self, request), fields(room_id = %request.room_id, user_id = %request.user_id))]
    pub async fn join_room(&self, request: JoinRoomRequest) -> Result<JoinRoomResponse, AppError> {
        let mut room = self.load_room(&request.room_id).await?;

        let mut fields = request.user_data.unwrap_or_default();
        if let Some(user_name) = request.user_name {
            fields.entry("name").or_insert(user_name);
        }
        let added = room.add_user(UserRecord::new(request.user_id.clone(), fields));
        if !added {
            debug!(user_id = %request.user_id, "User already in room");
        }

        room.touch(self.clock.now_millis());
        self.repository.save_room(&request.room_id, &room).await?;

        info!(
            room_id = %request.room_id,
            user_id = %request.user_id,
            user_count = room.active_users.len(),
            "User joined room"
        );

        Ok(JoinRoomResponse {
            success: true,
            room: room.summary(),
            snapshot: room.snapshot,
            message: "Joined room successfully".to_string(),
        })
    }

    /// Removes the caller; deletes the room once nobody is left.
    /// Leaving a missing room is a no-op.
    #[instrument(skip(self, request), fields(room_id = %request.room_id, user_id = %request.user_id))]
    pub async fn leave_room(&self, request: LeaveRoomRequest) -> Result<SuccessResponse, AppError> {
        let mut room = match self.repository.get_room(&request.room_id).await? {
            Some(room) => room,
            None => {
                debug!(room_id = %request.room_id, "Leave on missing room ignored");
                return Ok(SuccessResponse::ok());
            }
        };

        let removed = room.remove_user(&request.user_id);

        if room.is_empty() {
            self.repository.delete_room(&request.room_id).await?;
            info!(room_id = %request.room_id, "Room deleted after last user left");
        } else {
            room.touch(self.clock.now_millis());
            self.repository.save_room(&request.room_id, &room).await?;
            info!(
                room_id = %request.room_id,
                user_id = %request.user_id,
                removed = removed,
                user_count = room.active_users.len(),
                "User left room"
            );
        }

        Ok(SuccessResponse::ok())
    }

    /// Appends an operation stamped with time, author and a generated id
    #[instrument(skip(self, request), fields(room_id = %request.room_id, user_id = %request.user_id))]
    pub async fn send_operation(
        &self,
        request: SendOperationRequest,
    ) -> Result<SuccessResponse, AppError> {
        let mut room = self.load_room(&request.room_id).await?;

        let timestamp = self.clock.now_millis();
        let operation = OperationRecord::new(
            self.id_generator.generate(timestamp),
            request.user_id,
            timestamp,
            request.operation,
        );
        let operation_id = operation.id.clone();

        let truncated = room.append_operation(operation, self.limits);
        if truncated {
            info!(
                room_id = %request.room_id,
                retained = room.operations.len(),
                "Operation history truncated"
            );
        }

        room.touch(timestamp);
        self.repository.save_room(&request.room_id, &room).await?;

        debug!(
            room_id = %request.room_id,
            operation_id = %operation_id,
            history_len = room.operations.len(),
            "Operation recorded"
        );

        Ok(SuccessResponse::ok())
    }

    /// Operations by other users newer than `last_sync`, plus current members
    #[instrument(skip(self))]
    pub async fn get_updates(&self, query: GetUpdatesQuery) -> Result<UpdatesResponse, AppError> {
        let room = self.load_room(&query.room_id).await?;

        let updates = room.operations_since(query.last_sync, &query.user_id);
        debug!(
            room_id = %query.room_id,
            update_count = updates.len(),
            "Collected updates"
        );

        Ok(UpdatesResponse {
            success: true,
            updates,
            users: room.active_users,
            last_sync: self.clock.now_millis(),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_room_info(&self, room_id: &str) -> Result<RoomInfoResponse, AppError> {
        let room = self.load_room(room_id).await?;

        Ok(RoomInfoResponse {
            success: true,
            room: room.summary(),
            snapshot: room.snapshot,
        })
    }
}
