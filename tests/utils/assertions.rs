use axum::http::StatusCode;
use serde_json::Value;

use super::actions::TestResponse;

// ============================================================================
// Response Assertions
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn is_success(self) -> Self {
        assert_eq!(
            self.response.status,
            StatusCode::OK,
            "expected 200, got body {}",
            self.response.body
        );
        assert_eq!(self.response.body["success"], true);
        self
    }

    #[allow(dead_code)]
    pub fn is_not_found(self) -> Self {
        assert_eq!(self.response.status, StatusCode::NOT_FOUND);
        assert_eq!(self.response.body["error"], "Room not found");
        self
    }

    #[allow(dead_code)]
    pub fn is_internal_error(self) -> Self {
        assert_eq!(self.response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(self.response.body["error"].is_string());
        self
    }

    /// Ids of `activeUsers` (join/info) or `users` (updates), in order
    #[allow(dead_code)]
    pub fn user_ids(&self) -> Vec<String> {
        let users = self
            .response
            .body
            .get("users")
            .or_else(|| self.response.body["room"].get("activeUsers"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        users
            .iter()
            .filter_map(|u| u["id"].as_str().map(str::to_string))
            .collect()
    }

    #[allow(dead_code)]
    pub fn updates(&self) -> Vec<Value> {
        self.response.body["updates"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    #[allow(dead_code)]
    pub fn has_user_ids(self, expected: &[&str]) -> Self {
        assert_eq!(self.user_ids(), expected);
        self
    }

    #[allow(dead_code)]
    pub fn has_update_count(self, expected: usize) -> Self {
        assert_eq!(self.updates().len(), expected);
        self
    }
}
