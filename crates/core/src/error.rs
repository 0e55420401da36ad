use thiserror::Error;

/// Result alias returned by services, repositories and handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Failure categories. The API layer maps each one to a status code.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected input, such as a blank name or a grant with two targets.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced record is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The write collides with a stored record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No authenticated session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the scope or feature check denied the call.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Storage or decoding failure.
    #[error("internal error: {0}")]
    Internal(String),
}
