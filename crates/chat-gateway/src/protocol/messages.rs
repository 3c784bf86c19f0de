//! Gateway message format

use chat_service::dto::events::ERROR;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message format
///
/// All messages sent over a WebSocket connection follow this format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Event name
    pub event: String,

    /// Event payload
    #[serde(default)]
    pub data: Value,
}

/// Body of an `error` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub reason: String,
    pub code: String,
    /// Request event that failed, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl GatewayMessage {
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Build a message from any serializable payload
    #[must_use]
    pub fn with_payload(event: impl Into<String>, payload: &impl Serialize) -> Self {
        Self::new(event, serde_json::to_value(payload).unwrap_or_default())
    }

    /// Create an `error` event
    #[must_use]
    pub fn error(payload: &ErrorPayload) -> Self {
        Self::with_payload(ERROR, payload)
    }

    /// Decode the payload into a request type
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GatewayMessage(event={})", self.event)
    }
}
