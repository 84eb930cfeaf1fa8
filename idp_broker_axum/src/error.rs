use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use idp_broker::CoordinationError;

/// Uniform JSON error shape: `{ "success": false, "error": "..." }` with
/// an HTTP status matching the error taxonomy.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Authentication required".to_string(),
        }
    }
}

impl From<CoordinationError> for ApiError {
    fn from(err: CoordinationError) -> Self {
        let status = match &err {
            CoordinationError::Unauthenticated | CoordinationError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            CoordinationError::Unauthorized => StatusCode::FORBIDDEN,
            CoordinationError::Validation(_)
            | CoordinationError::CodeRejected(_)
            | CoordinationError::DuplicateEmail(_)
            | CoordinationError::InvalidState(_) => StatusCode::BAD_REQUEST,
            CoordinationError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            CoordinationError::Database(_)
            | CoordinationError::Provider(_)
            | CoordinationError::SessionError(_)
            | CoordinationError::UtilsError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}
