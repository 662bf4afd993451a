//! Error types for fiadmin-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error, e.g. unreadable version file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Search service unreachable or answered with something other than JSON
    #[error("Search service error: {0}")]
    Upstream(#[from] reqwest::Error),

    /// fiadmin-common error
    #[error("Common error: {0}")]
    Common(fiadmin_common::Error),
}

impl From<fiadmin_common::Error> for ApiError {
    fn from(err: fiadmin_common::Error) -> Self {
        match err {
            missing @ fiadmin_common::Error::MissingSubtype { .. } => {
                ApiError::NotFound(missing.to_string())
            }
            fiadmin_common::Error::Io(err) => ApiError::Io(err),
            other => ApiError::Common(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Upstream(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SEARCH_SERVICE_ERROR",
                err.to_string(),
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_subtype_maps_to_404() {
        let err: ApiError = fiadmin_common::Error::MissingSubtype {
            reference_id: 9,
            kind: fiadmin_common::db::ReferenceKind::Source,
        }
        .into();
        assert!(matches!(
            &err,
            ApiError::NotFound(msg) if msg == "Source record missing for reference 9"
        ));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_config_error_maps_to_500() {
        let err: ApiError = fiadmin_common::Error::Config("bad url".to_string()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_file_maps_to_500() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "version.txt");
        let err: ApiError = fiadmin_common::Error::Io(io).into();
        assert!(matches!(err, ApiError::Io(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
