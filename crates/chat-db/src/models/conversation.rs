//! Conversation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub server_id: Option<i64>,
    pub kind: i16,
    pub is_private: bool,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}
