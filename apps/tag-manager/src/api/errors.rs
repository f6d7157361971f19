use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::game::TagError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 503 Service Unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::UnknownVehicle(_) => Self::not_found(err.to_string()),
            TagError::LoopClosed => Self::service_unavailable(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_errors_map_to_status() {
        let unknown: ApiError = TagError::UnknownVehicle("gus".to_string()).into();
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
        assert_eq!(unknown.message, "Unknown vehicle [gus]");

        let closed: ApiError = TagError::LoopClosed.into();
        assert_eq!(closed.status, StatusCode::SERVICE_UNAVAILABLE);

        let unhandled: ApiError = TagError::UnhandledMail("X".to_string()).into();
        assert_eq!(unhandled.status, StatusCode::BAD_REQUEST);
    }
}
