//! # chat-core
//!
//! Domain layer containing identifiers, permissions, room keys, entities,
//! overwrite evaluation and the collaborator traits the services consume.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    base_capability, canonical_options, evaluate_overwrites, validate_components,
    validate_embeds, BotIdentity, ButtonStyle, Command, CommandChoice, CommandOption,
    CommandOptionType, Component, Conversation, ConversationKind, Embed, EmbedField, Message,
    Overwrite, Principal, PrincipalKind, User, DEFAULT_COMMAND_DESCRIPTION,
};
pub use error::DomainError;
pub use traits::{
    BotRepository, CommandRepository, ConversationRepository, MemberRepository,
    MessageRepository, OverwriteRepository, RepoResult, UserRepository,
};
pub use value_objects::{
    Namespace, Permissions, RoomKey, Snowflake, SnowflakeGenerator, SnowflakeParseError,
};
