//! The `{success, message, data?}` envelope every endpoint answers with.

use crate::error::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::OK, message, data)
    }

    pub fn created(message: &str, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    fn with_status(status: StatusCode, message: &str, data: T) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: true,
                message: message.to_string(),
                data: Some(data),
            }),
        )
    }
}

/// A failed request: status plus the message shown to the caller.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
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

    /// Map an [`AppError`] onto the response taxonomy. Validation, not found
    /// and conflict messages reach the caller as-is; anything else is logged
    /// here and answered with `failure` only.
    pub fn from_app(err: AppError, failure: &str) -> Self {
        match err {
            AppError::Validation(message) => Self::bad_request(message),
            AppError::NotFound(message) => Self::not_found(message),
            AppError::Conflict(message) => Self {
                status: StatusCode::CONFLICT,
                message,
            },
            other => {
                error!("{}: {}", failure, other);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: failure.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            message: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::from_app(
            AppError::database("Failed to run query", "no such table: items"),
            "Failed to retrieve items",
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to retrieve items");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError::from_app(
            AppError::Conflict("An item with this SKU already exists".to_string()),
            "Failed to add item",
        );
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "An item with this SKU already exists");

        let err = ApiError::from_app(
            AppError::Validation("Price must be greater than 0".to_string()),
            "Failed to add item",
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn envelope_omits_missing_data() {
        let body = ApiResponse::<()> {
            success: false,
            message: "Item not found".to_string(),
            data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "Item not found"}));
    }
}
