use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use infra::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::InvalidTransition { .. } | StoreError::Conflict(_) => {
                AppError::Conflict(err.to_string())
            }
            StoreError::InvalidInput(msg) => AppError::BadRequest(msg),
            StoreError::Db(e) => AppError::Db(e),
            StoreError::Io(_) | StoreError::Json(_) => AppError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Db(_) | AppError::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_client_errors() {
        let not_found: AppError = StoreError::not_found("venues", "x").into();
        assert!(matches!(not_found, AppError::NotFound(_)));

        let conflict: AppError = StoreError::Conflict("full".into()).into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let invalid: AppError = StoreError::InvalidInput("bad date".into()).into();
        assert_eq!(invalid.to_string(), "bad request: bad date");
    }
}
