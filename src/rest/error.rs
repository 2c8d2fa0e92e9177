// rest/error.rs — maps the service error taxonomy onto HTTP responses.
//
// Bodies are `{ "message": ... }`. Store failures are logged with their
// detail and reported as a generic 500; the wire message for Forbidden is
// indistinguishable from Unauthenticated (both "Not authorized", 401).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::ServiceError;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not authorized".to_string()),
            Self::Forbidden => (StatusCode::UNAUTHORIZED, "Not authorized".to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, "Task not found".to_string()),
            Self::Store(detail) => {
                error!(detail = %detail, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error".to_string())
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
