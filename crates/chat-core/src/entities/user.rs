//! User entity - public profile attached to outgoing message events

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Public user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub avatar: Option<String>,
    /// True for bot accounts
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: Snowflake, username: String) -> Self {
        Self {
            id,
            username,
            avatar: None,
            bot: false,
        }
    }

    pub fn new_bot(id: Snowflake, username: String) -> Self {
        Self {
            bot: true,
            ..Self::new(id, username)
        }
    }

    /// Profile used when the author no longer resolves
    pub fn unknown(id: Snowflake) -> Self {
        Self::new(id, "Unknown".to_string())
    }
}
