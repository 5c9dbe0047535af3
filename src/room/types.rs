use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

use super::models::{OperationRecord, RoomData, RoomSummary, UserRecord};

/// Operations selectable through the `action` discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    CreateRoom,
    JoinRoom,
    LeaveRoom,
    SendOperation,
    GetUpdates,
    GetRoomInfo,
}

/// Request payload for creating a room
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub room_id: String,
    #[serde(default, deserialize_with = "RoomData::deserialize_lenient")]
    pub room_data: RoomData,
    #[serde(default)]
    pub snapshot: Value,
    pub user_id: Option<Value>,
    pub user_name: Option<Value>,
}

/// Request payload for joining a room
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub user_id: String,
    pub user_name: Option<Value>,
    pub user_data: Option<Map<String, Value>>,
}

/// Request payload for leaving a room
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    pub room_id: String,
    pub user_id: String,
}

/// Request payload for posting an operation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOperationRequest {
    pub room_id: String,
    pub user_id: String,
    pub operation: Map<String, Value>,
}

/// Poll parameters for `get_updates`
#[derive(Debug, Clone, PartialEq)]
pub struct GetUpdatesQuery {
    pub room_id: String,
    pub user_id: String,
    pub last_sync: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub success: bool,
    pub room_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub success: bool,
    pub room: RoomSummary,
    pub snapshot: Value,
    pub message: String,
}

/// Bare `{ "success": true }` body
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatesResponse {
    pub success: bool,
    pub updates: Vec<OperationRecord>,
    pub users: Vec<UserRecord>,
    pub last_sync: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomInfoResponse {
    pub success: bool,
    pub room: RoomSummary,
    pub snapshot: Value,
}
