//! Conversation entity - a server channel, a direct message or a group

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Kind of conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// Server channel, visibility governed by `is_private` and overwrites
    #[default]
    Channel,
    /// Direct message between two users
    Direct,
    /// Group conversation with an explicit participant list
    Group,
}

impl ConversationKind {
    #[inline]
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Channel => 0,
            Self::Direct => 1,
            Self::Group => 3,
        }
    }
}

impl From<i16> for ConversationKind {
    fn from(value: i16) -> Self {
        match value {
            1 => Self::Direct,
            3 => Self::Group,
            _ => Self::Channel,
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Snowflake,
    pub server_id: Option<Snowflake>,
    pub kind: ConversationKind,
    pub is_private: bool,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a server channel
    #[must_use]
    pub fn new_channel(id: Snowflake, server_id: Snowflake, name: String, is_private: bool) -> Self {
        Self {
            id,
            server_id: Some(server_id),
            kind: ConversationKind::Channel,
            is_private,
            name: Some(name),
            created_at: Utc::now(),
        }
    }

    /// Create a direct message conversation
    #[must_use]
    pub fn new_direct(id: Snowflake) -> Self {
        Self {
            id,
            server_id: None,
            kind: ConversationKind::Direct,
            is_private: true,
            name: None,
            created_at: Utc::now(),
        }
    }

    /// Create a group conversation
    #[must_use]
    pub fn new_group(id: Snowflake, name: Option<String>) -> Self {
        Self {
            id,
            server_id: None,
            kind: ConversationKind::Group,
            is_private: true,
            name,
            created_at: Utc::now(),
        }
    }

    /// Server channels are subject to permission resolution; DMs and groups
    /// are governed by participant membership.
    #[inline]
    pub fn is_server_channel(&self) -> bool {
        self.kind == ConversationKind::Channel && self.server_id.is_some()
    }
}
