//! Interaction service
//!
//! Turns slash commands and button clicks into events on the app's
//! interaction room. Dispatch is fire-and-forget: bots answer through their
//! own message mutations, correlated by the token minted here.

use chat_core::{Namespace, PrincipalKind, RoomKey, Snowflake};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::events::{BUTTON_CLICKED, INTERACTION_CREATE};
use crate::dto::{
    ButtonClickedPayload, ButtonInteractionRequest, InteractionAcceptedResponse,
    InteractionCreatePayload, SlashCommandRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Interaction service
pub struct InteractionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InteractionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Dispatch a slash command to every bot connection of the app
    #[instrument(skip(self, request), fields(app_id = %request.app_id, command = %request.command))]
    pub async fn dispatch_slash_command(
        &self,
        user_id: Snowflake,
        request: SlashCommandRequest,
    ) -> ServiceResult<InteractionAcceptedResponse> {
        request.validate()?;

        let (conversation, _) = PermissionService::new(self.ctx)
            .visible_conversation(request.channel_id, user_id, PrincipalKind::User)
            .await?;

        let command = self
            .ctx
            .command_repo()
            .find_by_name(request.app_id, &request.command)
            .await?
            .ok_or_else(|| ServiceError::not_found("Command", &request.command))?;

        let bot = self
            .ctx
            .bot_repo()
            .find_by_app(request.app_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bot", request.app_id))?;

        let token = Uuid::new_v4().to_string();
        let payload = InteractionCreatePayload {
            app_id: bot.app_id,
            bot_id: bot.bot_id,
            command: command.name,
            channel_id: conversation.id,
            user_id,
            args: request.args,
            token: token.clone(),
        };

        self.ctx
            .broadcaster()
            .broadcast(RoomKey::app(Namespace::Interactions, bot.app_id), INTERACTION_CREATE, &payload)
            .await;

        info!(token = %token, "Interaction dispatched");

        Ok(InteractionAcceptedResponse { token })
    }

    /// Dispatch a click on a button of a bot-authored message
    #[instrument(skip(self, request), fields(message_id = %request.message_id, custom_id = %request.custom_id))]
    pub async fn dispatch_button(
        &self,
        user_id: Snowflake,
        request: ButtonInteractionRequest,
    ) -> ServiceResult<InteractionAcceptedResponse> {
        request.validate()?;

        let message = self
            .ctx
            .message_repo()
            .find_by_id(request.message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", request.message_id))?;

        let bot_id = message
            .bot_id
            .ok_or_else(|| ServiceError::validation("Message was not sent by a bot"))?;

        if message.button(&request.custom_id).is_none() {
            return Err(ServiceError::not_found("Button", &request.custom_id));
        }

        PermissionService::new(self.ctx)
            .visible_conversation(message.conversation_id, user_id, PrincipalKind::User)
            .await?;

        let bot = self
            .ctx
            .bot_repo()
            .find_by_bot(bot_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bot", bot_id))?;

        let token = Uuid::new_v4().to_string();
        let payload = ButtonClickedPayload {
            app_id: bot.app_id,
            bot_id: bot.bot_id,
            custom_id: request.custom_id,
            message_id: message.id,
            channel_id: message.conversation_id,
            user_id,
            token: token.clone(),
        };

        self.ctx
            .broadcaster()
            .broadcast(RoomKey::app(Namespace::Interactions, bot.app_id), BUTTON_CLICKED, &payload)
            .await;

        info!(token = %token, "Button click dispatched");

        Ok(InteractionAcceptedResponse { token })
    }
}
