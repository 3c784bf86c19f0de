//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.

mod bot;
mod command;
mod conversation;
mod error;
mod member;
mod message;
mod overwrite;
mod user;

pub use bot::PgBotRepository;
pub use command::PgCommandRepository;
pub use conversation::PgConversationRepository;
pub use member::PgMemberRepository;
pub use message::PgMessageRepository;
pub use overwrite::PgOverwriteRepository;
pub use user::PgUserRepository;
