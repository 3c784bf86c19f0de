//! Handler error types

use crate::protocol::ErrorPayload;
use chat_service::{ErrorKind, ServiceError};
use thiserror::Error;

/// Handler error type
///
/// Every variant is reported to the client as an `error` event; the
/// connection stays open.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame or payload could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Event name not handled in this namespace
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl HandlerError {
    /// Error code sent to the client
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidPayload(_) => "VALIDATION_ERROR",
            Self::UnknownEvent(_) => "UNKNOWN_EVENT",
            Self::Service(e) => e.error_code(),
        }
    }

    /// Reason sent to the client
    pub fn reason(&self) -> String {
        match self {
            Self::Service(e) => e.reason(),
            other => other.to_string(),
        }
    }

    /// True when the failure is ours rather than the client's
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Service(e) if e.kind() == ErrorKind::Internal)
    }

    /// Body of the `error` event answering `event`
    pub fn to_payload(&self, event: Option<&str>) -> ErrorPayload {
        ErrorPayload {
            reason: self.reason(),
            code: self.code().to_string(),
            event: event.map(str::to_string),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::DomainError;

    #[test]
    fn test_invalid_sender_payload() {
        let err = HandlerError::from(ServiceError::invalid_sender());
        let payload = err.to_payload(Some("removeMessage"));

        assert_eq!(payload.reason, "Invalid Sender");
        assert_eq!(payload.code, "INVALID_SENDER");
        assert_eq!(payload.event.as_deref(), Some("removeMessage"));
    }

    #[test]
    fn test_internal_reason_is_redacted() {
        let err = HandlerError::from(ServiceError::from(DomainError::DatabaseError(
            "connection refused at 10.0.0.3".to_string(),
        )));

        assert!(err.is_internal());
        assert!(!err.reason().contains("10.0.0.3"));
    }

    #[test]
    fn test_decode_failure_is_validation() {
        let err = HandlerError::from(serde_json::from_str::<u32>("x").unwrap_err());
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(!err.is_internal());
    }
}
