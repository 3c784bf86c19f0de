//! PostgreSQL implementation of OverwriteRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::traits::{OverwriteRepository, RepoResult};
use chat_core::{Overwrite, Snowflake};

use crate::models::OverwriteModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgOverwriteRepository {
    pool: PgPool,
}

impl PgOverwriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OverwriteRepository for PgOverwriteRepository {
    #[instrument(skip(self))]
    async fn find_for_targets(
        &self,
        channel_id: Snowflake,
        target_ids: &[Snowflake],
    ) -> RepoResult<Vec<Overwrite>> {
        if target_ids.is_empty() {
            return Ok(Vec::new());
        }

        let targets: Vec<i64> = target_ids.iter().map(|s| s.into_inner()).collect();

        let rows = sqlx::query_as::<_, OverwriteModel>(
            r#"
            SELECT channel_id, target_id, allow_bits, deny_bits
            FROM overwrites
            WHERE channel_id = $1 AND target_id = ANY($2)
            "#,
        )
        .bind(channel_id.into_inner())
        .bind(&targets)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Overwrite::from).collect())
    }

    #[instrument(skip(self))]
    async fn upsert(&self, overwrite: &Overwrite) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO overwrites (channel_id, target_id, allow_bits, deny_bits)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (channel_id, target_id)
            DO UPDATE SET allow_bits = EXCLUDED.allow_bits, deny_bits = EXCLUDED.deny_bits
            "#,
        )
        .bind(overwrite.channel_id.into_inner())
        .bind(overwrite.target_id.into_inner())
        .bind(overwrite.allow.to_i64())
        .bind(overwrite.deny.to_i64())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
