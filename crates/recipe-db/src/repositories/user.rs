//! Account rows in PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use recipe_core::{RepoResult, User, UserRepository};

use crate::models::UserModel;

use super::error::map_db_error;

/// `UserRepository` backed by the `sys_user` table
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, username, nickname, avatar, role, status
            FROM sys_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(User::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_active_moderators(&self) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, username, nickname, avatar, role, status
            FROM sys_user
            WHERE role IN ('admin', 'common_admin') AND status = 0
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(User::try_from).collect()
    }
}
