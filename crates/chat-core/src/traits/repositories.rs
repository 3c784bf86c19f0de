//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every operation is idempotent from the
//! caller's point of view.

use async_trait::async_trait;

use crate::entities::{BotIdentity, Command, Conversation, Message, Overwrite, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Check if a user participates in a direct or group conversation
    async fn is_participant(&self, conversation_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Overwrite Repository
// ============================================================================

#[async_trait]
pub trait OverwriteRepository: Send + Sync {
    /// Overwrites of a channel whose target is one of `target_ids`
    async fn find_for_targets(
        &self,
        channel_id: Snowflake,
        target_ids: &[Snowflake],
    ) -> RepoResult<Vec<Overwrite>>;

    /// Insert or replace the overwrite for `(channel_id, target_id)`
    async fn upsert(&self, overwrite: &Overwrite) -> RepoResult<()>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Role ids a principal holds in a server
    async fn role_ids(&self, server_id: Snowflake, principal_id: Snowflake) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;
}

// ============================================================================
// Command Repository
// ============================================================================

#[async_trait]
pub trait CommandRepository: Send + Sync {
    /// Find a command by app and name
    async fn find_by_name(&self, app_id: Snowflake, name: &str) -> RepoResult<Option<Command>>;

    /// Create a new command
    async fn create(&self, command: &Command) -> RepoResult<()>;

    /// Replace description and options of an existing command
    async fn update(&self, command: &Command) -> RepoResult<()>;
}

// ============================================================================
// Bot Repository
// ============================================================================

#[async_trait]
pub trait BotRepository: Send + Sync {
    /// Exchange an opaque bearer token for the bot identity
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<BotIdentity>>;

    /// Bot serving an app
    async fn find_by_app(&self, app_id: Snowflake) -> RepoResult<Option<BotIdentity>>;

    /// Identity of a bot account
    async fn find_by_bot(&self, bot_id: Snowflake) -> RepoResult<Option<BotIdentity>>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Create a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Update content, embeds, components and edit time
    async fn update(&self, message: &Message) -> RepoResult<()>;

    /// Delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}
