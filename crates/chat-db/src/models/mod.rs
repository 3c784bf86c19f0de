//! Database models - SQLx-compatible structs for PostgreSQL tables

mod bot;
mod command;
mod conversation;
mod message;
mod overwrite;
mod user;

pub use bot::BotModel;
pub use command::CommandModel;
pub use conversation::ConversationModel;
pub use message::MessageModel;
pub use overwrite::OverwriteModel;
pub use user::UserModel;
