use crate::db::error::DbError;
use serde::Serialize;
use thiserror::Error;

pub type AppResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Password(#[from] password_hash::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Closed set of outcomes for the register/login flow. Every variant maps to
/// exactly one HTTP status at the boundary; the two server-side variants
/// never leak their inner detail to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request body is missing or malforms a required field
    #[error("{0}")]
    Validation(String),

    /// Creator username already taken
    #[error("Username must be unique")]
    DuplicateUsername,

    /// Game code already holds the configured number of players
    #[error("Players limit reached for that code")]
    PlayerLimitReached,

    /// Login username does not exist
    #[error("User with that username does not exist")]
    UserNotFound,

    /// Password does not match the stored hash
    #[error("Invalid Password")]
    InvalidCredentials,

    /// Players may not use the login route
    #[error("Players cannot access this route")]
    ForbiddenActor,

    /// Store failed or yielded no user record
    #[error("persistence failure: {0}")]
    Persistence(#[source] DomainError),

    /// Catch-all for unexpected failures (hashing, token encoding)
    #[error("unexpected failure: {0}")]
    Unknown(#[source] DomainError),
}

impl AuthError {
    pub fn status(&self) -> u16 {
        match self {
            AuthError::Validation(_)
            | AuthError::DuplicateUsername
            | AuthError::PlayerLimitReached
            | AuthError::UserNotFound
            | AuthError::InvalidCredentials => 400,
            AuthError::ForbiddenActor => 403,
            AuthError::Persistence(_) | AuthError::Unknown(_) => 500,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status() >= 500
    }
}

/// Wire-level error envelope: `{error, status}` mirroring the HTTP status.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
    pub status: u16,
}

impl ApiError {
    /// Collapses an auth failure into the envelope. Client errors surface
    /// their message verbatim; server errors log the detail and surface only
    /// the generic per-route message.
    pub fn from_auth(err: AuthError, server_message: &str) -> Self {
        if err.is_server_error() {
            tracing::error!(error = %err, "auth flow failed");
            return Self {
                error: server_message.to_string(),
                status: 500,
            };
        }

        tracing::warn!(error = %err, "auth request rejected");
        Self {
            error: err.to_string(),
            status: err.status(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.error, self.status)
    }
}
