//! User message stream handler

use crate::connection::Connection;
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;
use chat_core::{PrincipalKind, RoomKey, Snowflake};
use chat_service::dto::events::{
    BUTTON_INTERACTION, DELETE_MESSAGE, EDIT_MESSAGE, JOINED_CONVERSATION, JOIN_CONVERSATION,
    LEAVE_CONVERSATION, SEND_MESSAGE,
};
use chat_service::dto::{ConversationRequest, JoinedConversationPayload};
use chat_service::{InteractionService, MessageService, PermissionService};
use std::sync::Arc;

use super::{reply, HandlerError, HandlerResult};

/// Handles events on `/ws/messages`
pub struct MessageHandler;

impl MessageHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<()> {
        let user_id = connection.identity().principal_id();
        let ctx = state.service_context();

        match message.event.as_str() {
            JOIN_CONVERSATION => Self::join(state, connection, message.parse_data()?).await,
            LEAVE_CONVERSATION => {
                let request: ConversationRequest = message.parse_data()?;
                state
                    .connections()
                    .leave(connection.id(), &RoomKey::conversation(request.conversation_id));
                Ok(())
            }
            SEND_MESSAGE => {
                MessageService::new(ctx).send(user_id, message.parse_data()?).await?;
                Ok(())
            }
            EDIT_MESSAGE => {
                MessageService::new(ctx).edit(user_id, message.parse_data()?).await?;
                Ok(())
            }
            DELETE_MESSAGE => {
                MessageService::new(ctx).delete(user_id, message.parse_data()?).await?;
                Ok(())
            }
            BUTTON_INTERACTION => {
                InteractionService::new(ctx)
                    .dispatch_button(user_id, message.parse_data()?)
                    .await?;
                Ok(())
            }
            _ => Err(HandlerError::UnknownEvent(message.event.clone())),
        }
    }

    /// Join a conversation room after a visibility check
    async fn join(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: ConversationRequest,
    ) -> HandlerResult<()> {
        let user_id: Snowflake = connection.identity().principal_id();
        let (conversation, _) = PermissionService::new(state.service_context())
            .visible_conversation(request.conversation_id, user_id, PrincipalKind::User)
            .await?;

        state
            .connections()
            .join(connection.id(), RoomKey::conversation(conversation.id));

        tracing::debug!(
            conn_id = %connection.id(),
            conversation_id = %conversation.id,
            "Joined conversation"
        );

        reply(
            connection,
            JOINED_CONVERSATION,
            &JoinedConversationPayload {
                conversation_id: conversation.id,
            },
        )
        .await;

        Ok(())
    }
}
