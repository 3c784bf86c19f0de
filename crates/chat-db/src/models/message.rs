//! Message database model

use chat_core::{Component, Embed};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub conversation_id: i64,
    pub author_id: i64,
    pub bot_id: Option<i64>,
    pub content: String,
    pub embeds: Json<Vec<Embed>>,
    pub components: Json<Vec<Component>>,
    pub reply_to: Option<i64>,
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl MessageModel {
    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }
}
