//! # Error handling for the HTTP layer
//!
//! [`ApiError`] is what handlers return. It maps every failure to a status
//! code and the standard envelope, logs internal details through `tracing`,
//! and never sends database messages to clients.
//!
//! Domain errors live next to the code that raises them
//! ([`QueryError`], [`RepositoryError`], [`ConstraintViolation`]) and are
//! re-exported here so callers have a single import point.
//!
//! ```rust,ignore
//! async fn handler(State(db): State<DatabaseConnection>) -> Result<ApiResponse<User>, ApiError> {
//!     let user = Users::get_by_id(&db, 1)
//!         .await?
//!         .ok_or_else(|| ApiError::not_found("user", Some("1".to_string())))?;
//!     Ok(ApiResponse::ok("Successfully fetched user", user))
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use std::fmt;

pub use crate::core::error::{ConstraintKind, ConstraintViolation, QueryError, RepositoryError};
use crate::response::{ApiResponse, ErrorBody, ErrorCode};

/// API error type with automatic logging and sanitized responses.
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        resource: String,
        id: Option<String>,
    },

    /// 400 Bad Request, including foreign-key and not-null violations
    BadRequest {
        message: String,
        details: Option<Vec<serde_json::Value>>,
    },

    /// 409 Conflict, a uniqueness violation
    Conflict {
        message: String,
        details: Option<Vec<serde_json::Value>>,
    },

    /// 422 Unprocessable Entity, malformed input caught at the boundary
    ValidationFailed { errors: Vec<String> },

    /// 500, details logged and not exposed
    Database { message: String, internal: DbErr },

    /// 500, details logged and not exposed
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            details: None,
        }
    }

    /// Create a 422 Validation Failed error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::validation_failed(vec!["page must be an integer".to_string()]));
    /// ```
    #[must_use]
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a 500 from a database error. The error is logged, not sent.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// 400 or 409 for a storage rule violation, with the offending column
    /// and value as details.
    #[must_use]
    pub fn constraint(violation: &ConstraintViolation) -> Self {
        let message = violation.message();
        let details = Some(vec![json!({
            "type": violation.kind.code(),
            "column": violation.column,
            "value": violation.value,
        })]);
        match violation.kind {
            ConstraintKind::Unique => Self::Conflict { message, details },
            ConstraintKind::ForeignKey | ConstraintKind::NotNull | ConstraintKind::Check => {
                Self::BadRequest { message, details }
            }
        }
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::BadRequest { .. } | Self::ValidationFailed { .. } => ErrorCode::BadRequest,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::Database { .. } | Self::Internal { .. } => ErrorCode::InternalServerError,
        }
    }

    /// Sanitized, user-facing message.
    pub(crate) fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::ValidationFailed { errors } => match errors.as_slice() {
                [single] => single.clone(),
                _ => format!("Validation failed: {}", errors.join(", ")),
            },
            Self::BadRequest { message, .. }
            | Self::Conflict { message, .. }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn details(&self) -> Option<Vec<serde_json::Value>> {
        match self {
            Self::BadRequest { details, .. } | Self::Conflict { details, .. } => details.clone(),
            Self::ValidationFailed { errors } => {
                Some(errors.iter().map(|e| json!(e)).collect())
            }
            _ => None,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let body = ErrorBody {
            code: self.code(),
            message: self.user_message(),
            details: self.details(),
        };
        ApiResponse::<()>::failure(self.status_code(), body).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Query(err) => err.into(),
            RepositoryError::NotFound { resource, id } => {
                Self::not_found(resource, Some(id.to_string()))
            }
            RepositoryError::Constraint(violation) => Self::constraint(&violation),
            RepositoryError::Internal(details) => {
                Self::internal("Internal server error", Some(details))
            }
            RepositoryError::Database(err) => Self::database(err),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        RepositoryError::from(err).into()
    }
}
