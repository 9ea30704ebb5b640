//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::PortalError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Valid credentials or a bearer token are required".to_string(),
            ),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, "FORBIDDEN", detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail),
            ApiError::IllegalTransition(detail) => {
                (StatusCode::CONFLICT, "ILLEGAL_TRANSITION", detail)
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        let message = err.to_string();
        match err {
            PortalError::Validation(_) => ApiError::BadRequest(message),
            PortalError::Conflict(_) => ApiError::Conflict(message),
            PortalError::NotFound { .. } => ApiError::NotFound(message),
            PortalError::IllegalTransition { .. } => ApiError::IllegalTransition(message),
            PortalError::Forbidden(_) => ApiError::Forbidden(message),
            PortalError::Unauthorized(reason) => {
                tracing::debug!(%reason, "Authentication failed");
                ApiError::Unauthorized
            }
            PortalError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<crate::db::DatabaseError> for ApiError {
    fn from(err: crate::db::DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::models::enums::RequestStatus;

    async fn code_of(response: Response) -> String {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["error"]["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(code_of(response).await, "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn portal_errors_map_to_statuses() {
        let cases = [
            (PortalError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (PortalError::Conflict("x".into()), StatusCode::CONFLICT),
            (PortalError::not_found("User", "a@b.com"), StatusCode::NOT_FOUND),
            (
                PortalError::IllegalTransition {
                    request_id: 10001,
                    from: RequestStatus::Closed,
                    action: "accept",
                },
                StatusCode::CONFLICT,
            ),
            (PortalError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (PortalError::invalid_credentials(), StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn illegal_transition_has_own_code() {
        let err = PortalError::IllegalTransition {
            request_id: 10001,
            from: RequestStatus::Closed,
            action: "close",
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(code_of(response).await, "ILLEGAL_TRANSITION");
    }

    #[tokio::test]
    async fn internal_returns_500_and_hides_detail() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
