use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

// ============================================================================
// Action Helpers
// ============================================================================

/// Status and parsed JSON body of one response (`Null` for empty bodies)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse { status, body }
    }

    /// POST a JSON body to the room endpoint
    pub async fn post(&self, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/rooms")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// GET the room endpoint with a raw query string
    pub async fn get(&self, query: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/rooms?{}", query))
            .body(Body::empty())
            .unwrap();
        self.request(request).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn create_room(&self, room_id: &str, snapshot: Value) -> TestResponse {
        self.post(json!({
            "action": "create_room",
            "roomId": room_id,
            "roomData": {
                "id": room_id,
                "name": format!("Room {}", room_id),
                "method": "ot",
                "createdBy": "owner",
                "createdByName": "Owner"
            },
            "snapshot": snapshot,
            "userId": "owner",
            "userName": "Owner"
        }))
        .await
    }

    pub async fn join_room(&self, room_id: &str, user_id: &str) -> TestResponse {
        self.post(json!({
            "action": "join_room",
            "roomId": room_id,
            "userId": user_id,
            "userName": user_id,
            "userData": { "id": user_id, "name": user_id }
        }))
        .await
    }

    pub async fn leave_room(&self, room_id: &str, user_id: &str) -> TestResponse {
        self.post(json!({
            "action": "leave_room",
            "roomId": room_id,
            "userId": user_id
        }))
        .await
    }

    pub async fn send_operation(&self, room_id: &str, user_id: &str, operation: Value) -> TestResponse {
        self.post(json!({
            "action": "send_operation",
            "roomId": room_id,
            "userId": user_id,
            "operation": operation
        }))
        .await
    }

    pub async fn get_updates(&self, room_id: &str, user_id: &str, last_sync: i64) -> TestResponse {
        self.get(&format!(
            "action=get_updates&roomId={}&userId={}&lastSync={}",
            room_id, user_id, last_sync
        ))
        .await
    }

    pub async fn get_room_info(&self, room_id: &str) -> TestResponse {
        self.get(&format!("action=get_room_info&roomId={}", room_id))
            .await
    }
}
