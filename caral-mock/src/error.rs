//! Mock backend errors, rendered the way the real backend renders them:
//! a status code plus `{"message": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::response::{ApiResponse, ErrorBody};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockError {
    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("This action is unauthorized.")]
    Forbidden,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Conflict(String),

    /// Injected failure for tests
    #[error("{0}")]
    Internal(String),
}

impl MockError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Mock request failed");
        }
        let body = match &self {
            Self::InvalidCredentials(message) => serde_json::to_value(ApiResponse::<()>::error(message)),
            other => serde_json::to_value(ErrorBody::new(other.to_string())),
        }
        .unwrap_or(serde_json::Value::Null);
        (status, Json(body)).into_response()
    }
}

pub type MockResult<T> = Result<T, MockError>;
