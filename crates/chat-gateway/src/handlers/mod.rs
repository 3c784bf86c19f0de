//! Namespace event handlers
//!
//! Routes each decoded client frame to the handler of the connection's
//! namespace.

mod bots;
mod error;
mod messages;

pub use bots::BotHandler;
pub use error::{HandlerError, HandlerResult};
pub use messages::MessageHandler;

use crate::connection::Connection;
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;
use chat_core::Namespace;
use std::sync::Arc;

/// Dispatch incoming client messages to the namespace's handler
pub struct EventRouter;

impl EventRouter {
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<()> {
        match connection.namespace() {
            Namespace::Messages => MessageHandler::handle(state, connection, message).await,
            Namespace::Bots | Namespace::Interactions => {
                BotHandler::handle(state, connection, message).await
            }
        }
    }
}

/// Send a reply to the requesting connection only
pub(crate) async fn reply(connection: &Connection, event: &str, payload: &impl serde::Serialize) {
    if connection
        .send(GatewayMessage::with_payload(event, payload))
        .await
        .is_err()
    {
        tracing::debug!(conn_id = %connection.id(), event, "Reply dropped, connection closing");
    }
}
