//! Individual WebSocket connection
//!
//! An authenticated socket: its namespace, who is on the other end and the
//! queue feeding its writer task.

use crate::protocol::GatewayMessage;
use chat_core::{BotIdentity, Namespace, PrincipalKind, Snowflake};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Connection identifier, unique per socket
pub type ConnectionId = Uuid;

/// Who authenticated the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    User(Snowflake),
    Bot(BotIdentity),
}

impl Identity {
    /// User id or bot id
    pub fn principal_id(&self) -> Snowflake {
        match self {
            Self::User(id) => *id,
            Self::Bot(identity) => identity.bot_id,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::User(_) => PrincipalKind::User,
            Self::Bot(_) => PrincipalKind::Bot,
        }
    }

    pub fn bot(&self) -> Option<&BotIdentity> {
        match self {
            Self::Bot(identity) => Some(identity),
            Self::User(_) => None,
        }
    }
}

/// A single WebSocket connection
pub struct Connection {
    id: ConnectionId,
    namespace: Namespace,
    identity: Identity,

    /// Channel to the socket's writer task
    sender: mpsc::Sender<GatewayMessage>,

    created_at: Instant,
}

impl Connection {
    pub fn new(
        namespace: Namespace,
        identity: Identity,
        sender: mpsc::Sender<GatewayMessage>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            namespace,
            identity,
            sender,
            created_at: Instant::now(),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Queue a message for this connection, waiting for room in the queue
    pub async fn send(&self, message: GatewayMessage) -> Result<(), mpsc::error::SendError<GatewayMessage>> {
        self.sender.send(message).await
    }

    /// Queue a message without waiting
    pub fn try_send(&self, message: GatewayMessage) -> Result<(), mpsc::error::TrySendError<GatewayMessage>> {
        self.sender.try_send(message)
    }

    /// Check if the writer task has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("namespace", &self.namespace)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (tx, _rx) = mpsc::channel(10);
        let a = Connection::new(Namespace::Messages, Identity::User(Snowflake::new(1)), tx.clone());
        let b = Connection::new(Namespace::Messages, Identity::User(Snowflake::new(1)), tx);

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_send_reaches_writer_queue() {
        let (tx, mut rx) = mpsc::channel(10);
        let conn = Connection::new(Namespace::Messages, Identity::User(Snowflake::new(1)), tx);

        conn.send(GatewayMessage::new("newMessage", serde_json::Value::Null))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().event, "newMessage");

        drop(rx);
        assert!(conn.is_closed());
    }

    #[test]
    fn test_bot_identity() {
        let bot = BotIdentity::new(Snowflake::new(7), Snowflake::new(70));
        let identity = Identity::Bot(bot);

        assert_eq!(identity.principal_id(), Snowflake::new(7));
        assert_eq!(identity.kind(), PrincipalKind::Bot);
        assert_eq!(identity.bot(), Some(&bot));
        assert!(Identity::User(Snowflake::new(1)).bot().is_none());
    }
}
