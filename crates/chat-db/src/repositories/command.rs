//! PostgreSQL implementation of CommandRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::traits::{CommandRepository, RepoResult};
use chat_core::{Command, DomainError, Snowflake};

use crate::mappers::CommandInsert;
use crate::models::CommandModel;

use super::error::{command_not_found, map_db_error, map_unique_violation};

#[derive(Clone)]
pub struct PgCommandRepository {
    pool: PgPool,
}

impl PgCommandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommandRepository for PgCommandRepository {
    #[instrument(skip(self))]
    async fn find_by_name(&self, app_id: Snowflake, name: &str) -> RepoResult<Option<Command>> {
        let result = sqlx::query_as::<_, CommandModel>(
            r#"
            SELECT id, app_id, name, description, options
            FROM commands
            WHERE app_id = $1 AND name = $2
            "#,
        )
        .bind(app_id.into_inner())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Command::try_from).transpose()
    }

    #[instrument(skip(self, command), fields(name = %command.name))]
    async fn create(&self, command: &Command) -> RepoResult<()> {
        let insert = CommandInsert::new(command);

        sqlx::query(
            r#"
            INSERT INTO commands (id, app_id, name, description, options)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(insert.id)
        .bind(insert.app_id)
        .bind(insert.name)
        .bind(insert.description)
        .bind(&insert.options)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::CommandExists(command.name.clone())))?;

        Ok(())
    }

    #[instrument(skip(self, command), fields(name = %command.name))]
    async fn update(&self, command: &Command) -> RepoResult<()> {
        let insert = CommandInsert::new(command);

        let result = sqlx::query(
            r#"
            UPDATE commands
            SET description = $3, options = $4
            WHERE app_id = $1 AND name = $2
            "#,
        )
        .bind(insert.app_id)
        .bind(insert.name)
        .bind(insert.description)
        .bind(&insert.options)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(command_not_found(&command.name));
        }

        Ok(())
    }
}
