//! Shared API types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::executor::ExecutorError;
use crate::domain::normalize::NormalizeError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    Forbidden { code: String, message: String },
    Upstream { status: StatusCode, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn from_executor(e: ExecutorError) -> Self {
        match e {
            ExecutorError::MissingInput => Self::bad_request("MISSING_INPUT", e.to_string()),
            ExecutorError::Status { .. } => {
                tracing::error!(error = %e, "Query executor rejected statement");
                Self::Upstream {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("Query failed: {}", e),
                }
            }
            ExecutorError::Transport(_) => {
                tracing::error!(error = %e, "Query executor unreachable");
                Self::Upstream {
                    status: StatusCode::BAD_GATEWAY,
                    message: format!("Query failed: {}", e),
                }
            }
            ExecutorError::Config(_) => {
                tracing::error!(error = %e, "Query executor misconfigured");
                Self::internal("Query executor is misconfigured")
            }
        }
    }

    pub fn from_normalize(e: NormalizeError) -> Self {
        tracing::error!(error = %e, "Executor response decode failed");
        Self::internal("Failed to decode response JSON")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::Forbidden { code, message } => {
                (StatusCode::FORBIDDEN, "forbidden", code, message)
            }
            Self::Upstream { status, message } => {
                (status, "upstream_error", "QUERY_FAILED".to_string(), message)
            }
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_status_maps_to_500() {
        let err = ApiError::from_executor(ExecutorError::Status {
            status: 400,
            body: "bad sql".into(),
        });
        match &err {
            ApiError::Upstream { status, message } => {
                assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(message.contains("bad sql"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_input_maps_to_400() {
        let resp = ApiError::from_executor(ExecutorError::MissingInput).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_forbidden_response() {
        let resp = ApiError::forbidden("FREEFORM_SQL_DISABLED", "nope").into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
