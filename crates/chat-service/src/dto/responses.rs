//! Response DTOs: event payloads, bot acks and HTTP bodies
//!
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chat_core::{Command, CommandOption, Component, Embed, Message, Snowflake, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Shared
// ============================================================================

/// Public user profile attached to message events
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Snowflake,
    pub username: String,
    pub avatar: Option<String>,
    pub bot: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            bot: user.bot,
        }
    }
}

// ============================================================================
// Room Events
// ============================================================================

/// `newMessage`
#[derive(Debug, Clone, Serialize)]
pub struct NewMessagePayload {
    pub id: Snowflake,
    pub conversation: Snowflake,
    /// Message text
    pub message: String,
    pub user: UserResponse,
    pub created_at: DateTime<Utc>,
    pub created_timestamp: i64,
    pub reply_to: Option<Snowflake>,
    pub files: Vec<String>,
    pub embeds: Vec<Embed>,
    pub components: Vec<Component>,
}

impl NewMessagePayload {
    pub fn new(message: &Message, author: &User) -> Self {
        Self {
            id: message.id,
            conversation: message.conversation_id,
            message: message.content.clone(),
            user: UserResponse::from(author),
            created_at: message.created_at,
            created_timestamp: message.created_timestamp(),
            reply_to: message.reply_to,
            files: message.files.clone(),
            embeds: message.embeds.clone(),
            components: message.components.clone(),
        }
    }
}

/// `messageEdited`
#[derive(Debug, Clone, Serialize)]
pub struct MessageEditedPayload {
    pub id: Snowflake,
    pub conversation: Snowflake,
    pub message: String,
    pub embeds: Vec<Embed>,
    pub components: Vec<Component>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl From<&Message> for MessageEditedPayload {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            conversation: message.conversation_id,
            message: message.content.clone(),
            embeds: message.embeds.clone(),
            components: message.components.clone(),
            edited_at: message.edited_at,
        }
    }
}

/// `messageDeleted`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageDeletedPayload {
    pub id: Snowflake,
    pub conversation: Snowflake,
}

/// `joinedConversation`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JoinedConversationPayload {
    pub conversation_id: Snowflake,
}

/// `interactionCreate`, delivered to every bot connection of the app
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCreatePayload {
    pub app_id: Snowflake,
    pub bot_id: Snowflake,
    pub command: String,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub args: serde_json::Value,
    pub token: String,
}

/// `buttonClicked`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonClickedPayload {
    pub app_id: Snowflake,
    pub bot_id: Snowflake,
    pub custom_id: String,
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub token: String,
}

// ============================================================================
// Bot Acks
// ============================================================================

/// `commandValidated`; `command` is the declared name
#[derive(Debug, Clone, Serialize)]
pub struct CommandValidatedPayload {
    pub command: String,
    pub id: Snowflake,
    pub description: String,
    pub options: Vec<CommandOption>,
}

impl From<&Command> for CommandValidatedPayload {
    fn from(command: &Command) -> Self {
        Self {
            command: command.name.clone(),
            id: command.id,
            description: command.description.clone(),
            options: command.options.clone(),
        }
    }
}

/// `messageSent`
#[derive(Debug, Clone, Serialize)]
pub struct MessageSentAck {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub created_at: DateTime<Utc>,
    pub created_timestamp: i64,
}

impl From<&Message> for MessageSentAck {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.conversation_id,
            created_at: message.created_at,
            created_timestamp: message.created_timestamp(),
        }
    }
}

/// `messageUpdate`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageUpdateAck {
    pub id: Snowflake,
    pub edited_at: Option<DateTime<Utc>>,
}

/// `messageRemoved`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageRemovedAck {
    pub id: Snowflake,
}

// ============================================================================
// HTTP
// ============================================================================

/// `202 Accepted` body of a dispatched slash command
#[derive(Debug, Clone, Serialize)]
pub struct InteractionAcceptedResponse {
    pub token: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness response, reports the bus state
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub bus: &'static str,
    pub instance_id: String,
    pub connections: usize,
    /// Envelopes the fanout loop lost to lag since startup
    pub dropped_events: u64,
}
