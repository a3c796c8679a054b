//! Process-level error type.
//!
//! Covers the auth boundary and infrastructure wiring. Components that can
//! fail in business flow return their own result types; nothing here leaks
//! into notification or presence call paths.

use recipe_core::DomainError;

/// Application-wide error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authentication")]
    MissingAuth,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Whether the error means the presented credential was rejected
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::TokenExpired | Self::MissingAuth
        )
    }

    /// Wrap an arbitrary failure as internal
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result alias for application operations
pub type AppResult<T> = Result<T, AppError>;
