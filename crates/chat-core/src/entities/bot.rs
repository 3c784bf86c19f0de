//! Bot identity resolved from an opaque bearer token

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// The `(bot_id, app_id)` pair a bot connection acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotIdentity {
    pub bot_id: Snowflake,
    pub app_id: Snowflake,
}

impl BotIdentity {
    pub const fn new(bot_id: Snowflake, app_id: Snowflake) -> Self {
        Self { bot_id, app_id }
    }
}
