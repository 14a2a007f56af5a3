//! The JSON envelope every endpoint answers with.
//!
//! ```json
//! { "success": true, "message": "Successfully fetched all users", "statusCode": 200, "data": { ... } }
//! { "success": false, "message": "user with ID '9' not found", "statusCode": 404,
//!   "errors": { "code": "NOT_FOUND", "message": "user with ID '9' not found" } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Error category exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Conflict,
    InternalServerError,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Vec<serde_json::Value>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub status_code: u16,
    pub data: Option<T>,
    pub errors: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    /// 200 with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::OK, message, Some(data))
    }

    /// 201 with the created payload.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::CREATED, message, Some(data))
    }

    pub fn success(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            status_code: status.as_u16(),
            data,
            errors: None,
        }
    }

    pub fn failure(status: StatusCode, errors: ErrorBody) -> Self {
        Self {
            success: false,
            message: errors.message.clone(),
            status_code: status.as_u16(),
            data: None,
            errors: Some(errors),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::ok("Fetched", json!({"id": 1}))).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "Fetched",
                "statusCode": 200,
                "data": {"id": 1}
            })
        );
    }

    #[test]
    fn test_failure_envelope_shape() {
        let response: ApiResponse<()> = ApiResponse::failure(
            StatusCode::CONFLICT,
            ErrorBody {
                code: ErrorCode::Conflict,
                message: "The value a@b.c already exists".to_string(),
                details: None,
            },
        );
        let body = serde_json::to_value(response).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["statusCode"], json!(409));
        assert_eq!(body["errors"]["code"], json!("CONFLICT"));
        assert_eq!(body["message"], body["errors"]["message"]);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created("Created", 5).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
