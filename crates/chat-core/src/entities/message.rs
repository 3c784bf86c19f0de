//! Message entity - a chat message authored by a user or a bot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::component::{Component, Embed};
use crate::value_objects::Snowflake;

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub author_id: Snowflake,
    /// Set when a bot authored the message; ownership checks compare it
    pub bot_id: Option<Snowflake>,
    pub content: String,
    pub embeds: Vec<Embed>,
    pub components: Vec<Component>,
    pub reply_to: Option<Snowflake>,
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a user-authored message
    pub fn new(id: Snowflake, conversation_id: Snowflake, author_id: Snowflake, content: String) -> Self {
        Self {
            id,
            conversation_id,
            author_id,
            bot_id: None,
            content,
            embeds: Vec::new(),
            components: Vec::new(),
            reply_to: None,
            files: Vec::new(),
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    /// Create a bot-authored message; the bot is also the author
    pub fn from_bot(id: Snowflake, conversation_id: Snowflake, bot_id: Snowflake, content: String) -> Self {
        Self {
            bot_id: Some(bot_id),
            ..Self::new(id, conversation_id, bot_id, content)
        }
    }

    #[inline]
    pub fn is_bot_authored(&self) -> bool {
        self.bot_id.is_some()
    }

    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.edited_at = Some(Utc::now());
    }

    /// Find an interactive button by its custom id
    pub fn button(&self, custom_id: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.custom_id() == Some(custom_id))
    }

    /// Creation time in milliseconds since the Unix epoch
    #[inline]
    pub fn created_timestamp(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    /// Check if message has no text, embeds or files
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.embeds.is_empty() && self.files.is_empty()
    }
}
