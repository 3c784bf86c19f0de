//! # chat-bot
//!
//! Client side of the bot protocol. A [`BotClient`] keeps one socket on the
//! bot stream for requests and acks and one on the interaction stream for
//! slash commands and button clicks.
//!
//! Acks carry no correlation id: each ack resolves the oldest pending
//! request of its kind, and a request without an ack is rejected after the
//! configured timeout.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pending;
pub mod protocol;

pub use client::{BotClient, BotClientBuilder};
pub use config::BotConfig;
pub use error::{BotError, BotResult};
pub use handlers::{ButtonHandler, CommandHandler, Handlers};
pub use pending::{AckKind, PendingAcks};
pub use protocol::{
    ButtonClick, CommandDeclaration, CommandValidated, ErrorEvent, Frame, Interaction,
    MessageRemoved, MessageSent, MessageUpdated, SendMessage, UpdateMessage,
};
