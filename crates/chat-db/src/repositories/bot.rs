//! PostgreSQL implementation of BotRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::traits::{BotRepository, RepoResult};
use chat_core::{BotIdentity, Snowflake};

use crate::models::BotModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgBotRepository {
    pool: PgPool,
}

impl PgBotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BotRepository for PgBotRepository {
    #[instrument(skip_all)]
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<BotIdentity>> {
        let result = sqlx::query_as::<_, BotModel>(
            r#"
            SELECT id, app_id
            FROM bots
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(BotIdentity::from))
    }

    #[instrument(skip(self))]
    async fn find_by_app(&self, app_id: Snowflake) -> RepoResult<Option<BotIdentity>> {
        let result = sqlx::query_as::<_, BotModel>(
            r#"
            SELECT id, app_id
            FROM bots
            WHERE app_id = $1
            "#,
        )
        .bind(app_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(BotIdentity::from))
    }

    #[instrument(skip(self))]
    async fn find_by_bot(&self, bot_id: Snowflake) -> RepoResult<Option<BotIdentity>> {
        let result = sqlx::query_as::<_, BotModel>(
            r#"
            SELECT id, app_id
            FROM bots
            WHERE id = $1
            "#,
        )
        .bind(bot_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(BotIdentity::from))
    }
}
