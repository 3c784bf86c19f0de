//! Envelope carried across the bus

use chat_core::{Namespace, RoomKey};
use serde::{Deserialize, Serialize};

/// One room broadcast as it travels between instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEnvelope {
    /// Instance that published the envelope
    pub origin: String,
    /// Per-origin sequence number, increasing in publish order
    pub seq: u64,
    pub room: RoomKey,
    pub event: String,
    pub data: serde_json::Value,
}

impl BusEnvelope {
    #[must_use]
    pub fn new(origin: impl Into<String>, seq: u64, room: RoomKey, event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            origin: origin.into(),
            seq,
            room,
            event: event.into(),
            data,
        }
    }

    #[inline]
    pub fn namespace(&self) -> Namespace {
        self.room.namespace
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
