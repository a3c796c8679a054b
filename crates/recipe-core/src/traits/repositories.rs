//! Storage ports.
//!
//! The moderation consumer and the notification router talk to storage
//! through these traits only; `recipe-db` provides the PostgreSQL
//! implementations and tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::entities::{Recipe, RecipeStep, User};
use crate::error::DomainError;

/// Result alias for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Recipe load/save surface used by the moderation pipeline
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Recipe>>;

    /// Persist lifecycle-state changes (status, reject reason, updated_at)
    async fn update(&self, recipe: &Recipe) -> RepoResult<()>;
}

/// Bulk access to a recipe's preparation steps
#[async_trait]
pub trait RecipeStepRepository: Send + Sync {
    /// All steps of a recipe, ordered by position
    async fn find_by_recipe(&self, recipe_id: i64) -> RepoResult<Vec<RecipeStep>>;
}

/// Account lookups needed for name resolution and moderator broadcasts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;

    /// Every non-banned account holding a moderator role
    async fn find_active_moderators(&self) -> RepoResult<Vec<User>>;
}
