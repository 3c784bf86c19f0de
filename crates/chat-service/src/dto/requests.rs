//! Request DTOs for socket events and HTTP calls
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chat_core::entities::validate_command_name;
use chat_core::{CommandOption, Component, Embed, Snowflake};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Conversation Requests
// ============================================================================

/// `joinConversation` and `leaveConversation`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ConversationRequest {
    pub conversation_id: Snowflake,
}

// ============================================================================
// User Message Requests
// ============================================================================

/// `sendMessage` on the user stream
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub conversation_id: Snowflake,

    #[serde(default)]
    #[validate(length(max = 4000, message = "Message content must be at most 4000 characters"))]
    pub content: String,

    pub reply_to: Option<Snowflake>,

    /// Previously uploaded file URLs
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 files per message"))]
    pub files: Vec<String>,
}

/// `editMessage`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditMessageRequest {
    pub id: Snowflake,

    #[validate(length(min = 1, max = 4000, message = "Message content must be 1-4000 characters"))]
    pub content: String,
}

/// `deleteMessage` and the bot-side `removeMessage`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MessageIdRequest {
    pub id: Snowflake,
}

// ============================================================================
// Bot Requests
// ============================================================================

/// `validateCommand`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateCommandRequest {
    #[validate(custom(function = "validate_command_name"))]
    pub name: String,

    #[validate(length(max = 100, message = "Description must be at most 100 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 25, message = "At most 25 options per command"), nested)]
    pub options: Option<Vec<CommandOption>>,

    /// Optional sender token; must belong to the connected bot
    pub token: Option<String>,
}

/// Bot `sendMessage`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BotSendMessageRequest {
    pub channel_id: Snowflake,

    #[serde(default)]
    #[validate(length(max = 4000, message = "Message content must be at most 4000 characters"))]
    pub content: String,

    #[serde(default)]
    pub embeds: Vec<Embed>,

    #[serde(default)]
    pub components: Vec<Component>,

    pub reply_to: Option<Snowflake>,

    /// Correlation token of the interaction being answered
    pub interaction_token: Option<String>,
}

/// Bot `updateMessage`; absent fields are left untouched
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BotUpdateMessageRequest {
    pub id: Snowflake,

    #[validate(length(max = 4000, message = "Message content must be at most 4000 characters"))]
    pub content: Option<String>,

    pub embeds: Option<Vec<Embed>>,

    pub components: Option<Vec<Component>>,
}

// ============================================================================
// Interaction Requests
// ============================================================================

/// Body of `POST /api/v1/interactions`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SlashCommandRequest {
    pub app_id: Snowflake,

    #[validate(custom(function = "validate_command_name"))]
    pub command: String,

    pub channel_id: Snowflake,

    /// Free-form arguments forwarded verbatim to the bot
    #[serde(default)]
    pub args: serde_json::Value,
}

/// `buttonInteraction`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ButtonInteractionRequest {
    #[validate(length(min = 1, max = 100, message = "Custom id must be 1-100 characters"))]
    pub custom_id: String,

    pub message_id: Snowflake,
}
