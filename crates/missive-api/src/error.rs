use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

/// Every failure a handler can surface, one status each.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 404, body `{message}`.
    #[error("{0}")]
    NotFound(String),
    /// 400, body `{error}`. Malformed or incomplete payloads.
    #[error("{0}")]
    Validation(String),
    /// 500, body `{error}`. Store failures and anything unexpected.
    #[error("{0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            // Route and handler disagree on parameters: a server bug.
            PathRejection::MissingPathParams(e) => Self::Internal(e.body_text()),
            other => Self::Validation(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            Self::Validation(e) => {
                warn!("Rejected request: {}", e);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response()
            }
            Self::Internal(e) => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e }))).into_response()
            }
        }
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::Validation(format!("`{}` must not be empty", field)));
    }
    Ok(())
}
