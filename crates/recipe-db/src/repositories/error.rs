//! SQLx error mapping.

use recipe_core::DomainError;

/// Collapse a SQLx failure into the domain-level database error
pub fn map_db_error(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}
