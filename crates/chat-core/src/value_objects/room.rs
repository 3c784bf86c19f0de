//! Namespaces and room keys
//!
//! A room is an ephemeral set of connections inside one namespace. Rooms are
//! never persisted; the key only names the event stream.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// Logical socket namespace a connection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// User message stream
    Messages,
    /// Bot stream: command registration and message mutations
    Bots,
    /// Bot interaction stream
    Interactions,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Self::Messages, Self::Bots, Self::Interactions];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Bots => "bots",
            Self::Interactions => "interactions",
        }
    }

    /// True for namespaces whose connections authenticate with bot tokens
    pub fn is_bot(self) -> bool {
        matches!(self, Self::Bots | Self::Interactions)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "messages" => Ok(Self::Messages),
            "bots" => Ok(Self::Bots),
            "interactions" => Ok(Self::Interactions),
            other => Err(format!("unknown namespace: {other}")),
        }
    }
}

/// Key of a room: namespace plus an opaque key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomKey {
    pub namespace: Namespace,
    pub key: String,
}

impl RoomKey {
    pub fn new(namespace: Namespace, key: impl Into<String>) -> Self {
        Self {
            namespace,
            key: key.into(),
        }
    }

    /// Room of a conversation in the user message stream
    pub fn conversation(conversation_id: Snowflake) -> Self {
        Self::new(Namespace::Messages, format!("conversation:{conversation_id}"))
    }

    /// Room every connection of one app joins inside a bot namespace
    pub fn app(namespace: Namespace, app_id: Snowflake) -> Self {
        Self::new(namespace, format!("app:{app_id}"))
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_roundtrip() {
        for ns in Namespace::ALL {
            assert_eq!(ns.as_str().parse::<Namespace>().unwrap(), ns);
        }
        assert!("admin".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_bot_namespaces() {
        assert!(!Namespace::Messages.is_bot());
        assert!(Namespace::Bots.is_bot());
        assert!(Namespace::Interactions.is_bot());
    }

    #[test]
    fn test_room_keys_are_namespaced() {
        let app = Snowflake::new(7);
        assert_ne!(
            RoomKey::app(Namespace::Bots, app),
            RoomKey::app(Namespace::Interactions, app)
        );
        assert_eq!(RoomKey::conversation(Snowflake::new(1)).to_string(), "messages/conversation:1");
    }

    #[test]
    fn test_room_key_json() {
        let room = RoomKey::app(Namespace::Interactions, Snowflake::new(9));
        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(json["namespace"], "interactions");
        assert_eq!(json["key"], "app:9");
    }
}
