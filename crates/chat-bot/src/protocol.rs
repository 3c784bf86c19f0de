//! Wire frames and payloads of the bot and interaction streams

use chat_core::{CommandOption, Component, Embed, Snowflake};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod events {
    pub const VALIDATE_COMMAND: &str = "validateCommand";
    pub const COMMAND_VALIDATED: &str = "commandValidated";
    pub const SEND_MESSAGE: &str = "sendMessage";
    pub const MESSAGE_SENT: &str = "messageSent";
    pub const UPDATE_MESSAGE: &str = "updateMessage";
    pub const MESSAGE_UPDATE: &str = "messageUpdate";
    pub const REMOVE_MESSAGE: &str = "removeMessage";
    pub const MESSAGE_REMOVED: &str = "messageRemoved";
    pub const INTERACTION_CREATE: &str = "interactionCreate";
    pub const BUTTON_CLICKED: &str = "buttonClicked";
    pub const ERROR: &str = "error";
}

/// One text frame: `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// `validateCommand`; absent description and options take server defaults
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CommandOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CommandDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.get_or_insert_with(Vec::new).push(option);
        self
    }
}

/// Bot `sendMessage`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub channel_id: Snowflake,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_token: Option<String>,
}

impl SendMessage {
    pub fn new(channel_id: Snowflake, content: impl Into<String>) -> Self {
        Self {
            channel_id,
            content: content.into(),
            embeds: Vec::new(),
            components: Vec::new(),
            reply_to: None,
            interaction_token: None,
        }
    }

    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    #[must_use]
    pub fn component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }
}

/// Bot `updateMessage`; `None` fields are left as they are
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMessage {
    pub id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
}

impl UpdateMessage {
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            content: None,
            embeds: None,
            components: None,
        }
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn components(mut self, components: Vec<Component>) -> Self {
        self.components = Some(components);
        self
    }
}

// ============================================================================
// Acks
// ============================================================================

/// `commandValidated`; `command` is the declared name
#[derive(Debug, Clone, Deserialize)]
pub struct CommandValidated {
    pub command: String,
    pub id: Snowflake,
    pub description: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageSent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub created_at: DateTime<Utc>,
    pub created_timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageUpdated {
    pub id: Snowflake,
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRemoved {
    pub id: Snowflake,
}

/// `error` frame; `event` names the request it answers
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEvent {
    pub reason: String,
    #[serde(default)]
    pub code: String,
    pub event: Option<String>,
}

// ============================================================================
// Interactions
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub app_id: Snowflake,
    pub bot_id: Snowflake,
    pub command: String,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(default)]
    pub args: Value,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonClick {
    pub app_id: Snowflake,
    pub bot_id: Snowflake,
    pub custom_id: String,
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declaration_omits_absent_fields() {
        let json = serde_json::to_value(CommandDeclaration::new("ping")).unwrap();
        assert_eq!(json, json!({"name": "ping"}));
    }

    #[test]
    fn test_update_omits_untouched_fields() {
        let update = UpdateMessage::new(Snowflake::new(5)).content("edited");
        let json = serde_json::to_value(update).unwrap();
        assert_eq!(json, json!({"id": "5", "content": "edited"}));
    }

    #[test]
    fn test_interaction_from_gateway_payload() {
        let interaction: Interaction = serde_json::from_value(json!({
            "appId": "70",
            "botId": "7",
            "command": "roll",
            "channelId": "10",
            "userId": "3",
            "args": {"sides": 6},
            "token": "abc"
        }))
        .unwrap();

        assert_eq!(interaction.app_id, Snowflake::new(70));
        assert_eq!(interaction.args["sides"], 6);
    }

    #[test]
    fn test_command_validated_names_the_command() {
        let ack: CommandValidated = serde_json::from_value(json!({
            "command": "ping",
            "id": "42",
            "description": "No description provided"
        }))
        .unwrap();

        assert_eq!(ack.command, "ping");
        assert_eq!(ack.id, Snowflake::new(42));
        assert!(ack.options.is_empty());
    }

    #[test]
    fn test_frame_without_data() {
        let frame = Frame::from_json(r#"{"event":"messageRemoved"}"#).unwrap();
        assert!(frame.data.is_null());
    }
}
