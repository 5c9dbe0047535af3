use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keys the server owns on a stored room document
const RESERVED_ROOM_KEYS: &[&str] = &[
    "id",
    "name",
    "method",
    "createdBy",
    "createdByName",
    "snapshot",
    "activeUsers",
    "operations",
    "lastUpdated",
];

/// Keys the server assigns on every operation record
const RESERVED_OPERATION_KEYS: &[&str] = &["id", "userId", "timestamp"];

/// Bounds on a room's operation history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationLimits {
    /// History is truncated once it grows beyond this many entries
    pub max_operations: usize,
    /// Number of most recent entries kept after truncation
    pub retained_operations: usize,
}

impl Default for OperationLimits {
    fn default() -> Self {
        Self {
            max_operations: 100,
            retained_operations: 50,
        }
    }
}

/// Keeps an explicit `null` distinct from an absent field
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A member of a room. Only `id` is interpreted; everything else is caller data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl UserRecord {
    pub fn new(id: impl Into<Value>, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Whether this record belongs to the caller identified by `user_id`
    pub fn is(&self, user_id: &str) -> bool {
        self.id.as_str() == Some(user_id)
    }
}

/// An opaque edit record plus the fields the server stamps on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub id: String,
    pub user_id: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl OperationRecord {
    pub fn new(
        id: String,
        user_id: impl Into<String>,
        timestamp: i64,
        mut payload: Map<String, Value>,
    ) -> Self {
        for key in RESERVED_OPERATION_KEYS {
            payload.remove(*key);
        }
        Self {
            id,
            user_id: user_id.into(),
            timestamp,
            payload,
        }
    }
}

/// Caller-supplied room metadata accepted by `create_room`.
///
/// Metadata values are kept exactly as sent, whatever their JSON type.
/// `None` means the field was absent; `Some(Value::Null)` means it was `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomData {
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub method: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub created_by: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub created_by_name: Option<Value>,
    /// Seed members; object entries become user records, anything else is dropped
    #[serde(default)]
    pub active_users: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoomData {
    /// Reads any JSON value as room metadata; non-objects carry no fields
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// `deserialize_with` adapter that never rejects the `roomData` shape
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }

    fn seed_users(&self) -> Vec<UserRecord> {
        self.active_users
            .as_array()
            .map(|users| {
                users
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|fields| {
                        let id = fields.get("id").cloned().unwrap_or(Value::Null);
                        UserRecord::new(id, fields.clone())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Document stored under `room:<roomId>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomModel {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Value,
    /// Stored and echoed verbatim, never interpreted
    #[serde(default)]
    pub method: Value,
    #[serde(default)]
    pub created_by: Value,
    #[serde(default)]
    pub created_by_name: Value,
    #[serde(default)]
    pub snapshot: Value,
    #[serde(default)]
    pub active_users: Vec<UserRecord>,
    #[serde(default)]
    pub operations: Vec<OperationRecord>,
    #[serde(default)]
    pub last_updated: i64,
    /// Any other `roomData` fields supplied at creation
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Room metadata returned by `join_room` and `get_room_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: Value,
    pub name: Value,
    pub method: Value,
    pub created_by: Value,
    pub created_by_name: Value,
    pub active_users: Vec<UserRecord>,
}

impl RoomModel {
    /// Builds a fresh room from caller metadata and a snapshot.
    ///
    /// An absent `roomData.id` becomes `room_id`; absent `createdBy` and
    /// `createdByName` come from the creating user. Present values, `null`
    /// included, are kept as sent.
    pub fn new(
        room_id: &str,
        data: RoomData,
        snapshot: Value,
        user_id: Option<Value>,
        user_name: Option<Value>,
        now: i64,
    ) -> Self {
        let seed_users = data.seed_users();
        let mut extra = data.extra;
        for key in RESERVED_ROOM_KEYS {
            extra.remove(*key);
        }

        let mut room = Self {
            id: data.id.unwrap_or_else(|| Value::from(room_id)),
            name: data.name.unwrap_or_default(),
            method: data.method.unwrap_or_default(),
            created_by: data.created_by.or(user_id).unwrap_or_default(),
            created_by_name: data.created_by_name.or(user_name).unwrap_or_default(),
            snapshot,
            active_users: Vec::new(),
            operations: Vec::new(),
            last_updated: now,
            extra,
        };

        for user in seed_users {
            room.add_user(user);
        }

        room
    }

    /// Check if a user is in this room
    pub fn has_user(&self, user_id: &str) -> bool {
        self.active_users.iter().any(|u| u.is(user_id))
    }

    /// Adds a user unless one with the same id is already present.
    /// Returns whether the user was added.
    pub fn add_user(&mut self, user: UserRecord) -> bool {
        if self.active_users.iter().any(|u| u.id == user.id) {
            return false;
        }
        self.active_users.push(user);
        true
    }

    /// Removes every entry with this id, returning how many were removed
    pub fn remove_user(&mut self, user_id: &str) -> usize {
        let before = self.active_users.len();
        self.active_users.retain(|u| !u.is(user_id));
        before - self.active_users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_users.is_empty()
    }

    /// Appends an operation and enforces the history cap.
    /// Returns true when the append caused truncation.
    pub fn append_operation(&mut self, operation: OperationRecord, limits: OperationLimits) -> bool {
        self.operations.push(operation);
        if self.operations.len() > limits.max_operations {
            let drop_count = self
                .operations
                .len()
                .saturating_sub(limits.retained_operations);
            self.operations.drain(..drop_count);
            return true;
        }
        false
    }

    /// Operations newer than `last_sync` that were not authored by `user_id`
    pub fn operations_since(&self, last_sync: i64, user_id: &str) -> Vec<OperationRecord> {
        self.operations
            .iter()
            .filter(|op| op.timestamp > last_sync && op.user_id != user_id)
            .cloned()
            .collect()
    }

    /// Updates the last-modified timestamp
    pub fn touch(&mut self, now: i64) {
        self.last_updated = now;
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            method: self.method.clone(),
            created_by: self.created_by.clone(),
            created_by_name: self.created_by_name.clone(),
            active_users: self.active_users.clone(),
        }
    }
}
