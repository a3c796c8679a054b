//! # recipe-db
//!
//! Database layer implementing the `recipe-core` repository traits with
//! PostgreSQL via SQLx. This is the storage collaborator surface used by the
//! moderation consumer and the notification router: recipe load/save, step
//! bulk-load, and user/moderator lookup.

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, PgPool, PgPoolConfig};
pub use repositories::{PgRecipeRepository, PgRecipeStepRepository, PgUserRepository};
