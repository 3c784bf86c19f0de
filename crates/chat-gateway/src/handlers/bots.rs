//! Bot stream handler
//!
//! Command registration and bot-issued message mutations. Mutations answer
//! the requesting socket first, then broadcast to the conversation room.

use crate::connection::Connection;
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;
use chat_core::{BotIdentity, Namespace};
use chat_service::dto::events::{
    COMMAND_VALIDATED, MESSAGE_REMOVED, MESSAGE_SENT, MESSAGE_UPDATE, REMOVE_MESSAGE, SEND_MESSAGE,
    UPDATE_MESSAGE, VALIDATE_COMMAND,
};
use chat_service::dto::CommandValidatedPayload;
use chat_service::{Acked, CommandService, MessageService, ServiceError};
use serde::Serialize;
use std::sync::Arc;

use super::{reply, HandlerError, HandlerResult};

/// Handles events on `/ws/bots` and `/ws/interactions`
pub struct BotHandler;

impl BotHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<()> {
        let identity = *connection
            .identity()
            .bot()
            .ok_or_else(|| HandlerError::Service(ServiceError::invalid_sender()))?;
        let ctx = state.service_context();

        match message.event.as_str() {
            VALIDATE_COMMAND if connection.namespace() == Namespace::Bots => {
                let validation = CommandService::new(ctx)
                    .validate_command(&identity, message.parse_data()?)
                    .await?;

                reply(
                    connection,
                    COMMAND_VALIDATED,
                    &CommandValidatedPayload::from(&validation.command),
                )
                .await;
                Ok(())
            }
            SEND_MESSAGE => {
                let acked = MessageService::new(ctx)
                    .bot_send(&identity, message.parse_data()?)
                    .await?;
                Self::ack_then_broadcast(state, connection, &identity, MESSAGE_SENT, acked).await;
                Ok(())
            }
            UPDATE_MESSAGE => {
                let acked = MessageService::new(ctx)
                    .bot_update(&identity, message.parse_data()?)
                    .await?;
                Self::ack_then_broadcast(state, connection, &identity, MESSAGE_UPDATE, acked).await;
                Ok(())
            }
            REMOVE_MESSAGE => {
                let acked = MessageService::new(ctx)
                    .bot_remove(&identity, message.parse_data()?)
                    .await?;
                Self::ack_then_broadcast(state, connection, &identity, MESSAGE_REMOVED, acked).await;
                Ok(())
            }
            _ => Err(HandlerError::UnknownEvent(message.event.clone())),
        }
    }

    async fn ack_then_broadcast<A: Serialize>(
        state: &GatewayState,
        connection: &Connection,
        identity: &BotIdentity,
        ack_event: &str,
        acked: Acked<A>,
    ) {
        reply(connection, ack_event, &acked.ack).await;

        tracing::debug!(
            bot_id = %identity.bot_id,
            app_id = %identity.app_id,
            event = ack_event,
            "Bot mutation acknowledged"
        );

        state.service_context().broadcaster().emit(acked.event).await;
    }
}
