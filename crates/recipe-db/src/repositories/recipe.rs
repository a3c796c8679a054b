//! Recipe rows in PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use recipe_core::{Recipe, RecipeRepository, RepoResult};

use crate::models::RecipeModel;

use super::error::map_db_error;

/// `RecipeRepository` backed by the `recipe_info` table
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Recipe>> {
        let result = sqlx::query_as::<_, RecipeModel>(
            r"
            SELECT id, user_id, title, description, category_id, cover_image,
                   status, reject_reason, view_count, created_at, updated_at
            FROM recipe_info
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Recipe::try_from).transpose()
    }

    #[instrument(skip(self, recipe), fields(recipe_id = recipe.id))]
    async fn update(&self, recipe: &Recipe) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE recipe_info
            SET status = $2, reject_reason = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(recipe.id)
        .bind(recipe.status.as_i16())
        .bind(&recipe.reject_reason)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
