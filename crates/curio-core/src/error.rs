use curio_types::models::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(what: &'static str, id: i64) -> Self {
        Self::NotFound { what, id }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

/// Unwraps the session or fails with `Unauthenticated`.
pub fn require_user(acting: Option<UserId>) -> CoreResult<UserId> {
    acting.ok_or(CoreError::Unauthenticated)
}
