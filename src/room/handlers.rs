use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, instrument, warn};

use super::{
    service::RoomService,
    types::{
        Action, CreateRoomRequest, GetUpdatesQuery, JoinRoomRequest, LeaveRoomRequest,
        SendOperationRequest,
    },
};
use crate::shared::{AppError, AppState};

/// Query string and (lazily parsed) JSON body of one request
struct RoomRequest {
    params: HashMap<String, String>,
    body: Bytes,
    parsed: Option<Value>,
}

impl RoomRequest {
    fn new(params: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            params,
            body,
            parsed: None,
        }
    }

    /// Parses the body once; an empty body reads as JSON `null`
    fn body_json(&mut self) -> Result<&Value, AppError> {
        if self.parsed.is_none() {
            let value = if self.body.iter().all(u8::is_ascii_whitespace) {
                Value::Null
            } else {
                serde_json::from_slice(&self.body)?
            };
            self.parsed = Some(value);
        }
        Ok(self.parsed.get_or_insert(Value::Null))
    }

    /// `action` from the query string, else from the JSON body
    fn action(&mut self) -> Result<Option<String>, AppError> {
        if let Some(action) = self.params.get("action") {
            return Ok(Some(action.clone()));
        }
        Ok(self
            .body_json()?
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn body_as<T: DeserializeOwned>(&mut self) -> Result<T, AppError> {
        let value = self.body_json()?;
        if value.is_null() {
            return Err(AppError::InvalidRequest(
                "Request body is required".to_string(),
            ));
        }
        Ok(T::deserialize(value)?)
    }

    /// Query parameter, falling back to a body field with the same name
    fn param(&mut self, name: &str) -> Result<Option<String>, AppError> {
        if let Some(value) = self.params.get(name) {
            return Ok(Some(value.clone()));
        }
        let value = match self.body_json()?.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Ok(value)
    }

    fn required_param(&mut self, name: &str) -> Result<String, AppError> {
        self.param(name)?.ok_or_else(|| {
            AppError::InvalidRequest(format!("Missing required parameter: {}", name))
        })
    }

    fn updates_query(&mut self) -> Result<GetUpdatesQuery, AppError> {
        let room_id = self.required_param("roomId")?;
        let user_id = self.required_param("userId")?;
        let last_sync = match self.param("lastSync")? {
            Some(raw) => parse_last_sync(&raw)?,
            None => 0,
        };
        Ok(GetUpdatesQuery {
            room_id,
            user_id,
            last_sync,
        })
    }
}

/// Accepts integer or fractional millisecond timestamps
fn parse_last_sync(raw: &str) -> Result<i64, AppError> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.floor() as i64)
        .ok_or_else(|| AppError::InvalidRequest(format!("Invalid lastSync: {}", raw)))
}

/// HTTP entry point for every room action
///
/// ANY /rooms
/// `OPTIONS` short-circuits with an empty 200. Otherwise the `action` value
/// (query string first, then JSON body) selects the operation.
/// A body that cannot be read (over the size limit) is reported as JSON.
#[instrument(name = "room_request", skip(state, params, body))]
pub async fn handle_room_request(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let error = AppError::RejectedBody {
                status: rejection.status(),
                message: rejection.body_text(),
            };
            warn!(error = %error, "Room request body rejected");
            return error.into_response();
        }
    };

    let mut request = RoomRequest::new(params, body);
    match dispatch(&state, &mut request).await {
        Ok(response) => response,
        Err(error) => {
            warn!(error = %error, "Room request failed");
            error.into_response()
        }
    }
}

async fn dispatch(state: &AppState, request: &mut RoomRequest) -> Result<Response, AppError> {
    let raw_action = request
        .action()?
        .ok_or_else(|| AppError::UnknownAction("<missing>".to_string()))?;
    let action =
        Action::from_str(&raw_action).map_err(|_| AppError::UnknownAction(raw_action.clone()))?;

    info!(action = %action, "Dispatching room action");

    let response = match action {
        Action::CreateRoom => {
            let body: CreateRoomRequest = request.body_as()?;
            let service = RoomService::from_state(state)?;
            Json(service.create_room(body).await?).into_response()
        }
        Action::JoinRoom => {
            let body: JoinRoomRequest = request.body_as()?;
            let service = RoomService::from_state(state)?;
            Json(service.join_room(body).await?).into_response()
        }
        Action::LeaveRoom => {
            let body: LeaveRoomRequest = request.body_as()?;
            let service = RoomService::from_state(state)?;
            Json(service.leave_room(body).await?).into_response()
        }
        Action::SendOperation => {
            let body: SendOperationRequest = request.body_as()?;
            let service = RoomService::from_state(state)?;
            Json(service.send_operation(body).await?).into_response()
        }
        Action::GetUpdates => {
            let query = request.updates_query()?;
            let service = RoomService::from_state(state)?;
            Json(service.get_updates(query).await?).into_response()
        }
        Action::GetRoomInfo => {
            let room_id = request.required_param("roomId")?;
            let service = RoomService::from_state(state)?;
            Json(service.get_room_info(&room_id).await?).into_response()
        }
    };

    Ok(response)
}

/// HTTP handler for liveness and storage status
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "storage": state.storage_backend(),
    }))
}
