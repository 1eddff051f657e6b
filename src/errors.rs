use crate::api::ApiError;
use axum::{Json, http::StatusCode};
use serde_json::json;

/// Error returned by the dashboard's own routes. The body mirrors the
/// backend's `{"error": "..."}` shape so clients read both the same way.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Status { status, .. } if status.as_u16() == 404 => {
                Self::not_found(err.user_message())
            }
            _ => Self::bad_gateway(err.user_message()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
