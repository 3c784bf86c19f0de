//! Command service
//!
//! Registry of slash commands declared by bots. Re-declaring a command is
//! idempotent: identical schemas are left alone, changed ones are updated
//! in place.

use chat_core::{
    BotIdentity, Command, CommandOption, DomainError, DEFAULT_COMMAND_DESCRIPTION,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::ValidateCommandRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// What a declaration did to the stored command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct CommandValidation {
    pub command: Command,
    pub outcome: CommandOutcome,
}

/// Command service
pub struct CommandService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommandService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create, update or confirm a command declared by `identity`'s bot
    #[instrument(skip(self, identity, request), fields(app_id = %identity.app_id, bot_id = %identity.bot_id, name = %request.name))]
    pub async fn validate_command(
        &self,
        identity: &BotIdentity,
        request: ValidateCommandRequest,
    ) -> ServiceResult<CommandValidation> {
        if let Some(token) = request.token.as_deref() {
            self.verify_sender(identity, token).await?;
        }

        request.validate()?;

        let description = request
            .description
            .unwrap_or_else(|| DEFAULT_COMMAND_DESCRIPTION.to_string());
        let options = request.options.unwrap_or_default();

        let existing = self
            .ctx
            .command_repo()
            .find_by_name(identity.app_id, &request.name)
            .await?;

        let (command, outcome) = match existing {
            Some(stored) => self.reconcile(stored, description, options).await?,
            None => {
                let command = Command::new(
                    self.ctx.generate_id(),
                    identity.app_id,
                    request.name,
                    description,
                    options,
                );

                let created = self.ctx.command_repo().create(&command).await;
                match created {
                    Ok(()) => (command, CommandOutcome::Created),
                    // A concurrent declaration created it first
                    Err(DomainError::CommandExists(_)) => {
                        let stored = self
                            .ctx
                            .command_repo()
                            .find_by_name(identity.app_id, &command.name)
                            .await?
                            .ok_or_else(|| ServiceError::not_found("Command", &command.name))?;
                        self.reconcile(stored, command.description, command.options)
                            .await?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        info!(command_id = %command.id, ?outcome, "Command validated");

        Ok(CommandValidation { command, outcome })
    }

    /// Bring a stored command in line with a declaration; one update at most
    async fn reconcile(
        &self,
        mut stored: Command,
        description: String,
        options: Vec<CommandOption>,
    ) -> ServiceResult<(Command, CommandOutcome)> {
        if !stored.differs_from(&description, &options) {
            return Ok((stored, CommandOutcome::Unchanged));
        }

        stored.description = description;
        stored.options = options;
        self.ctx.command_repo().update(&stored).await?;
        Ok((stored, CommandOutcome::Updated))
    }

    /// A token in the payload must resolve to the connected bot
    async fn verify_sender(&self, identity: &BotIdentity, token: &str) -> ServiceResult<()> {
        match self.ctx.bot_repo().find_by_token(token).await? {
            Some(sender) if sender.bot_id == identity.bot_id => Ok(()),
            _ => Err(ServiceError::invalid_sender()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{fixture, fixture_with, id};
    use async_trait::async_trait;
    use chat_core::{CommandRepository, RepoResult, Snowflake};
    use chat_db::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    /// Yields between the lookup and the insert so two declarations interleave
    struct YieldingCommands {
        inner: MemoryStore,
    }

    #[async_trait]
    impl CommandRepository for YieldingCommands {
        async fn find_by_name(&self, app_id: Snowflake, name: &str) -> RepoResult<Option<Command>> {
            let found = self.inner.command(app_id, name);
            tokio::task::yield_now().await;
            Ok(found)
        }

        async fn create(&self, command: &Command) -> RepoResult<()> {
            CommandRepository::create(&self.inner, command).await
        }

        async fn update(&self, command: &Command) -> RepoResult<()> {
            CommandRepository::update(&self.inner, command).await
        }
    }

    fn interleaving_fixture() -> crate::services::test_support::Fixture {
        fixture_with(|store, builder| {
            builder.command_repo(Arc::new(YieldingCommands {
                inner: store.clone(),
            }))
        })
    }

    fn identity() -> BotIdentity {
        BotIdentity::new(id(7), id(70))
    }

    fn request(value: serde_json::Value) -> ValidateCommandRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_first_declaration_creates_with_defaults() {
        let fx = fixture();
        let service = CommandService::new(&fx.ctx);

        let result = service
            .validate_command(&identity(), request(json!({"name": "ping"})))
            .await
            .unwrap();

        assert_eq!(result.outcome, CommandOutcome::Created);
        assert_eq!(result.command.description, "No description provided");
        assert!(result.command.options.is_empty());
        assert_eq!(fx.store.command_creates(), 1);
    }

    #[tokio::test]
    async fn test_identical_redeclaration_writes_nothing() {
        let fx = fixture();
        let service = CommandService::new(&fx.ctx);
        let body = json!({
            "name": "roll",
            "description": "Roll a die",
            "options": [{"name": "sides", "description": "Faces", "type": "integer", "required": true}]
        });

        service.validate_command(&identity(), request(body.clone())).await.unwrap();
        let second = service.validate_command(&identity(), request(body)).await.unwrap();

        assert_eq!(second.outcome, CommandOutcome::Unchanged);
        assert_eq!(fx.store.command_creates(), 1);
        assert_eq!(fx.store.command_updates(), 0);
    }

    #[tokio::test]
    async fn test_changed_description_updates_once() {
        let fx = fixture();
        let service = CommandService::new(&fx.ctx);

        let created = service
            .validate_command(&identity(), request(json!({"name": "ping", "description": "Ping"})))
            .await
            .unwrap();
        let updated = service
            .validate_command(&identity(), request(json!({"name": "ping", "description": "Pong"})))
            .await
            .unwrap();

        assert_eq!(updated.outcome, CommandOutcome::Updated);
        assert_eq!(updated.command.id, created.command.id);
        assert_eq!(fx.store.command_updates(), 1);
        assert_eq!(fx.store.command(id(70), "ping").unwrap().description, "Pong");
    }

    #[tokio::test]
    async fn test_changed_options_update() {
        let fx = fixture();
        let service = CommandService::new(&fx.ctx);

        service
            .validate_command(&identity(), request(json!({"name": "roll"})))
            .await
            .unwrap();
        let result = service
            .validate_command(
                &identity(),
                request(json!({"name": "roll", "options": [{"name": "sides", "type": "integer"}]})),
            )
            .await
            .unwrap();

        assert_eq!(result.outcome, CommandOutcome::Updated);
        assert_eq!(result.command.options.len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_token_is_invalid_sender() {
        let fx = fixture();
        fx.store.insert_bot("mine", identity());
        fx.store.insert_bot("theirs", BotIdentity::new(id(8), id(80)));
        let service = CommandService::new(&fx.ctx);

        let err = service
            .validate_command(&identity(), request(json!({"name": "ping", "token": "theirs"})))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "Invalid Sender");
        assert_eq!(fx.store.command_creates(), 0);

        let ok = service
            .validate_command(&identity(), request(json!({"name": "ping", "token": "mine"})))
            .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_name_is_validation_error() {
        let fx = fixture();
        let service = CommandService::new(&fx.ctx);

        let err = service
            .validate_command(&identity(), request(json!({"name": "Bad Name"})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_concurrent_identical_declarations_both_succeed() {
        let fx = interleaving_fixture();
        let first = CommandService::new(&fx.ctx);
        let second = CommandService::new(&fx.ctx);
        let body = json!({"name": "ping", "description": "Ping"});

        let (id_a, id_b) = (identity(), identity());
        let (a, b) = tokio::join!(
            first.validate_command(&id_a, request(body.clone())),
            second.validate_command(&id_b, request(body)),
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.command.id, b.command.id);
        assert_eq!(a.outcome, CommandOutcome::Created);
        assert_eq!(b.outcome, CommandOutcome::Unchanged);
        assert_eq!(fx.store.command_creates(), 1);
        assert_eq!(fx.store.command_updates(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_differing_declaration_updates_the_winner() {
        let fx = interleaving_fixture();
        let first = CommandService::new(&fx.ctx);
        let second = CommandService::new(&fx.ctx);

        let (id_a, id_b) = (identity(), identity());
        let (a, b) = tokio::join!(
            first.validate_command(&id_a, request(json!({"name": "ping", "description": "Ping"}))),
            second.validate_command(&id_b, request(json!({"name": "ping", "description": "Pong"}))),
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.command.id, b.command.id);
        assert_eq!(b.outcome, CommandOutcome::Updated);
        assert_eq!(fx.store.command_creates(), 1);
        assert_eq!(fx.store.command_updates(), 1);
        assert_eq!(fx.store.command(id(70), "ping").unwrap().description, "Pong");
    }
}
