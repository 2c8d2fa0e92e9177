// error.rs — the service error taxonomy shared by auth and task operations.
//
// Every operation failure is one of these five classes; the REST layer maps
// them to status codes in rest/error.rs. Storage detail never crosses the
// wire — it is logged and reported as a generic 500.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed input. Carries the human-readable message
    /// returned to the caller with a 400 status.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, expired, or invalid bearer token.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but not the owner of the referenced task.
    #[error("not the resource owner")]
    Forbidden,

    /// Referenced task id does not exist.
    #[error("task not found")]
    NotFound,

    /// Underlying persistence failure.
    #[error("store unavailable: {0}")]
    Store(String),
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err.to_string())
    }
}
