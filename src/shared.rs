use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::room::generators::{
    Clock, OperationIdGenerator, RandomSuffixIdGenerator, SystemClock,
};
use crate::room::models::OperationLimits;
use crate::store::KvStore;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    /// Backing key-value store; `None` when no storage backend is configured
    pub store: Option<Arc<dyn KvStore>>,
    pub clock: Arc<dyn Clock>,
    pub id_generator: Arc<dyn OperationIdGenerator>,
    pub limits: OperationLimits,
}

impl AppState {
    pub fn new(store: Option<Arc<dyn KvStore>>, limits: OperationLimits) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            id_generator: Arc::new(RandomSuffixIdGenerator::new()),
            limits,
        }
    }

    /// Returns the configured store or `StorageUnavailable`
    pub fn require_store(&self) -> Result<Arc<dyn KvStore>, AppError> {
        self.store.clone().ok_or(AppError::StorageUnavailable)
    }

    /// Name of the storage backend, for health reporting
    pub fn storage_backend(&self) -> &'static str {
        self.store
            .as_ref()
            .map(|store| store.backend())
            .unwrap_or("unconfigured")
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Storage not available")]
    StorageUnavailable,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request body could not be read, e.g. it exceeded the body limit
    #[error("{message}")]
    RejectedBody { status: StatusCode, message: String },

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            AppError::RejectedBody { status, .. } => *status,
            AppError::StorageUnavailable
            | AppError::InvalidRequest(_)
            | AppError::Store(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::RoomNotFound(_) => json!({ "error": "Room not found" }),
            AppError::StorageUnavailable
            | AppError::UnknownAction(_)
            | AppError::RejectedBody { .. } => {
                json!({ "error": self.to_string() })
            }
            _ => {
                error!(error = %self, "Request failed with internal error");
                json!({
                    "error": self.to_string(),
                    "code": "INTERNAL_ERROR"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::RoomNotFound("r1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::UnknownAction("dance".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::StorageUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Store("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_body_carries_code() {
        let response = AppError::Store("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["code"], "INTERNAL_ERROR");
        assert_eq!(value["error"], "Storage error: disk on fire");
    }

    #[tokio::test]
    async fn test_not_found_body_has_no_code() {
        let response = AppError::RoomNotFound("r1".to_string()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Room not found");
        assert!(value.get("code").is_none());
    }

    #[test]
    fn test_storage_backend_reports_unconfigured() {
        let state = test_utils::AppStateBuilder::new().without_store().build();
        assert_eq!(state.storage_backend(), "unconfigured");
        assert!(matches!(
            state.require_store(),
            Err(AppError::StorageUnavailable)
        ));
    }
}
