/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>` which converts to the right status code:
/// validation failures carry one message per invalid field (422),
/// missing tasks surface as 404, and storage failures become a generic
/// retry-guidance message (500) with the internal cause logged, never
/// exposed to the client.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use towndesk_shared::models::task::TaskStoreError;
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - no acting user identity
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422) - validation errors, all fields at once
    ValidationError(Vec<ValidationErrorDetail>),

    /// Storage failure (500) - message is safe retry guidance, the
    /// cause is logged where the error is mapped
    Persistence(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "not_found", "validation_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Persistence(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Maps a storage error for a given action
    ///
    /// `action` is the verb phrase shown to the user, e.g. "create task"
    /// becomes "Failed to create task. Please try again.". A foreign-key
    /// violation on the attribution column means the acting user does
    /// not exist and is the caller's fault, not a storage fault.
    pub fn from_store(error: TaskStoreError, action: &str) -> Self {
        match error {
            TaskStoreError::NotFound => ApiError::NotFound("Task not found.".to_string()),
            TaskStoreError::Database(cause) => {
                if let sqlx::Error::Database(db_err) = &cause {
                    if let Some(constraint) = db_err.constraint() {
                        if constraint.contains("modified_by") {
                            return ApiError::BadRequest(
                                "Acting user does not exist.".to_string(),
                            );
                        }
                    }
                }

                tracing::error!(error = %cause, "Database error while trying to {}", action);
                ApiError::Persistence(format!("Failed to {}. Please try again.", action))
            }
        }
    }
}

/// Flattens lifecycle validation failures into per-field details
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Persistence(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", msg, None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use towndesk_shared::lifecycle::{self, TaskDraft};

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found.".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found.");
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err = ApiError::from_store(TaskStoreError::NotFound, "update task");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_store_database_error_hides_cause() {
        let err = ApiError::from_store(
            TaskStoreError::Database(sqlx::Error::PoolTimedOut),
            "create task",
        );

        match err {
            ApiError::Persistence(message) => {
                assert_eq!(message, "Failed to create task. Please try again.");
            }
            other => panic!("expected persistence error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_errors_flatten_per_field() {
        let draft = TaskDraft {
            title: String::new(),
            description: None,
            priority: Some("urgent".to_string()),
            due_date: Some("soon".to_string()),
        };

        let err: ApiError = lifecycle::validate(draft).unwrap_err().into();

        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 3);
                let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                assert!(fields.contains(&"title"));
                assert!(fields.contains(&"priority"));
                assert!(fields.contains(&"due_date"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
