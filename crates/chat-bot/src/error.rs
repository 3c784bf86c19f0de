//! Bot client errors

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connect(#[source] Box<tungstenite::Error>),

    /// No ack arrived in time; the request may still have been applied
    #[error("No {event} ack within {timeout:?}")]
    AckTimeout { event: &'static str, timeout: Duration },

    /// The gateway answered with an `error` event
    #[error("{reason}")]
    Rejected { reason: String, code: String },

    #[error("Disconnected from gateway")]
    Disconnected,

    #[error("Malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Handler failed: {0}")]
    Handler(String),
}

impl BotError {
    /// Reason sent back by the gateway, if this is a rejection
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::AckTimeout { .. })
    }
}

impl From<tungstenite::Error> for BotError {
    fn from(err: tungstenite::Error) -> Self {
        Self::Connect(Box::new(err))
    }
}

pub type BotResult<T> = Result<T, BotError>;
