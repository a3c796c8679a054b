//! Errors of the domain layer.

use thiserror::Error;

/// Failure of a repository operation or an entity conversion
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Recipe {0} not found")]
    RecipeNotFound(i64),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Unknown status value {0} in storage")]
    InvalidStatus(i16),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Whether the error names a missing entity rather than a failure
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecipeNotFound(_) | Self::UserNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(DomainError::RecipeNotFound(42).is_not_found());
        assert!(DomainError::UserNotFound(7).is_not_found());
        assert!(!DomainError::InvalidStatus(9).is_not_found());
        assert!(!DomainError::DatabaseError("timeout".to_string()).is_not_found());
    }
}
