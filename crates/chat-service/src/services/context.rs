//! Service context - dependency container for services
//!
//! Holds the repositories, the broadcast handle and the shared generators
//! every service borrows.

use std::sync::Arc;

use chat_common::JwtService;
use chat_core::traits::{
    BotRepository, CommandRepository, ConversationRepository, MemberRepository, MessageRepository,
    OverwriteRepository, UserRepository,
};
use chat_core::{Snowflake, SnowflakeGenerator};

use super::broadcast::Broadcaster;
use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    conversation_repo: Arc<dyn ConversationRepository>,
    overwrite_repo: Arc<dyn OverwriteRepository>,
    member_repo: Arc<dyn MemberRepository>,
    user_repo: Arc<dyn UserRepository>,
    command_repo: Arc<dyn CommandRepository>,
    bot_repo: Arc<dyn BotRepository>,
    message_repo: Arc<dyn MessageRepository>,

    // Fanout
    broadcaster: Broadcaster,

    // Services
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn overwrite_repo(&self) -> &dyn OverwriteRepository {
        self.overwrite_repo.as_ref()
    }

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn command_repo(&self) -> &dyn CommandRepository {
        self.command_repo.as_ref()
    }

    pub fn bot_repo(&self) -> &dyn BotRepository {
        self.bot_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Fanout ===

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("broadcaster", &self.broadcaster)
            .field("worker_id", &self.snowflake_generator.worker_id())
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    overwrite_repo: Option<Arc<dyn OverwriteRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    command_repo: Option<Arc<dyn CommandRepository>>,
    bot_repo: Option<Arc<dyn BotRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    broadcaster: Option<Broadcaster>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one store for every repository
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: ConversationRepository
            + OverwriteRepository
            + MemberRepository
            + UserRepository
            + CommandRepository
            + BotRepository
            + MessageRepository
            + 'static,
    {
        self.conversation_repo(store.clone())
            .overwrite_repo(store.clone())
            .member_repo(store.clone())
            .user_repo(store.clone())
            .command_repo(store.clone())
            .bot_repo(store.clone())
            .message_repo(store)
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn overwrite_repo(mut self, repo: Arc<dyn OverwriteRepository>) -> Self {
        self.overwrite_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn command_repo(mut self, repo: Arc<dyn CommandRepository>) -> Self {
        self.command_repo = Some(repo);
        self
    }

    pub fn bot_repo(mut self, repo: Arc<dyn BotRepository>) -> Self {
        self.bot_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn broadcaster(mut self, broadcaster: Broadcaster) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            conversation_repo: required(self.conversation_repo, "conversation_repo")?,
            overwrite_repo: required(self.overwrite_repo, "overwrite_repo")?,
            member_repo: required(self.member_repo, "member_repo")?,
            user_repo: required(self.user_repo, "user_repo")?,
            command_repo: required(self.command_repo, "command_repo")?,
            bot_repo: required(self.bot_repo, "bot_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            broadcaster: required(self.broadcaster, "broadcaster")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
        })
    }
}
