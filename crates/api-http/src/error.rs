//! HTTP Error Mapping
//!
//! Renders application errors as `{"error": "<message>"}` with a status code.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use storefront_core::domain::DomainError;
use storefront_core::error::AppError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Too many requests")]
    TooManyRequests,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Status code for an application error
pub fn status_of(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) | AppError::Serialization(_) => StatusCode::BAD_REQUEST,
        AppError::Domain(DomainError::InvalidStateTransition { .. }) => StatusCode::CONFLICT,
        AppError::Domain(DomainError::NotInCart(_)) => StatusCode::NOT_FOUND,
        AppError::Domain(_) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) | AppError::InvalidState(_) => StatusCode::CONFLICT,
        AppError::Database(_) | AppError::Io(_) | AppError::Config(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::App(err) => {
                let status = status_of(&err);
                if status.is_server_error() {
                    error!(error = %err, "Request failed");
                    (status, "Internal server error".to_string())
                } else {
                    (status, err.to_string())
                }
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(&AppError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&AppError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(&AppError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(&AppError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(&AppError::InvalidState("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(&AppError::Domain(DomainError::InvalidStateTransition {
                from: "paid".into(),
                to: "accepted".into(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(&AppError::Domain(DomainError::InvalidQuantity(0))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&AppError::Database("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_not_leaked() {
        let response = ApiError::from(AppError::Database("secret table".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
