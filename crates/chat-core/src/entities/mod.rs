//! Domain entities - core business objects

mod bot;
mod command;
mod component;
mod conversation;
mod message;
mod overwrite;
mod principal;
mod user;

pub use bot::BotIdentity;
pub use command::{
    canonical_options, validate_command_name, Command, CommandChoice, CommandOption,
    CommandOptionType, DEFAULT_COMMAND_DESCRIPTION, MAX_COMMAND_DESCRIPTION_LEN,
    MAX_COMMAND_NAME_LEN, MAX_COMMAND_OPTIONS,
};
pub use component::{
    validate_components, validate_embeds, ButtonStyle, Component, Embed, EmbedField,
    MAX_COMPONENTS, MAX_EMBEDS,
};
pub use conversation::{Conversation, ConversationKind};
pub use message::Message;
pub use overwrite::{base_capability, evaluate_overwrites, Overwrite};
pub use principal::{Principal, PrincipalKind};
pub use user::User;
