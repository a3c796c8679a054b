//! Recipe step rows in PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use recipe_core::{RecipeStep, RecipeStepRepository, RepoResult};

use crate::models::RecipeStepModel;

use super::error::map_db_error;

/// `RecipeStepRepository` backed by the `recipe_step` table
#[derive(Clone)]
pub struct PgRecipeStepRepository {
    pool: PgPool,
}

impl PgRecipeStepRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStepRepository for PgRecipeStepRepository {
    #[instrument(skip(self))]
    async fn find_by_recipe(&self, recipe_id: i64) -> RepoResult<Vec<RecipeStep>> {
        let rows = sqlx::query_as::<_, RecipeStepModel>(
            r"
            SELECT id, recipe_id, step_order, description, image
            FROM recipe_step
            WHERE recipe_id = $1
            ORDER BY step_order
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(RecipeStep::from).collect())
    }
}
