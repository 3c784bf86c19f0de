//! Message service
//!
//! Message mutations from both streams. User mutations broadcast directly.
//! Bot mutations hand the room event back with the ack so the gateway can
//! answer the requesting socket before the broadcast goes out.

use chat_core::{
    validate_components, validate_embeds, BotIdentity, Conversation, DomainError, Message,
    PrincipalKind, RoomKey, Snowflake, User,
};
use chrono::Utc;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::events::{MESSAGE_DELETED, MESSAGE_EDITED, NEW_MESSAGE};
use crate::dto::{
    BotSendMessageRequest, BotUpdateMessageRequest, EditMessageRequest, MessageDeletedPayload,
    MessageEditedPayload, MessageIdRequest, MessageRemovedAck, MessageSentAck, MessageUpdateAck,
    NewMessagePayload, SendMessageRequest,
};

use super::broadcast::RoomEvent;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Bot ack plus the room event to publish once the ack is on its way
#[derive(Debug, Clone)]
pub struct Acked<A> {
    pub ack: A,
    pub event: RoomEvent,
}

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // User stream
    // ========================================================================

    /// Persist a user message and broadcast `newMessage`
    #[instrument(skip(self, request), fields(conversation_id = %request.conversation_id))]
    pub async fn send(&self, user_id: Snowflake, request: SendMessageRequest) -> ServiceResult<Message> {
        request.validate()?;

        let (conversation, _) = PermissionService::new(self.ctx)
            .visible_conversation(request.conversation_id, user_id, PrincipalKind::User)
            .await?;

        let mut message = Message::new(self.ctx.generate_id(), conversation.id, user_id, request.content);
        message.reply_to = request.reply_to;
        message.files = request.files;

        if message.is_empty() {
            return Err(ServiceError::validation("Message must have content or files"));
        }

        self.ctx.message_repo().create(&message).await?;
        info!(message_id = %message.id, "Message created");

        let author = self.author(user_id).await?;
        self.ctx
            .broadcaster()
            .broadcast(
                RoomKey::conversation(conversation.id),
                NEW_MESSAGE,
                &NewMessagePayload::new(&message, &author),
            )
            .await;

        Ok(message)
    }

    /// Edit own message and broadcast `messageEdited`
    #[instrument(skip(self, request), fields(message_id = %request.id))]
    pub async fn edit(&self, user_id: Snowflake, request: EditMessageRequest) -> ServiceResult<Message> {
        request.validate()?;

        let mut message = self.find(request.id).await?;
        if message.author_id != user_id || message.is_bot_authored() {
            return Err(DomainError::NotMessageAuthor.into());
        }

        message.edit(request.content);
        self.ctx.message_repo().update(&message).await?;
        info!("Message edited");

        self.ctx
            .broadcaster()
            .broadcast(
                RoomKey::conversation(message.conversation_id),
                MESSAGE_EDITED,
                &MessageEditedPayload::from(&message),
            )
            .await;

        Ok(message)
    }

    /// Delete a message as its author, or with `MANAGE_CHANNELS` on the channel
    #[instrument(skip(self, request), fields(message_id = %request.id))]
    pub async fn delete(&self, user_id: Snowflake, request: MessageIdRequest) -> ServiceResult<()> {
        let message = self.find(request.id).await?;

        if message.author_id != user_id {
            let conversation = self.conversation(message.conversation_id).await?;
            let permissions = PermissionService::new(self.ctx);
            let principal = permissions
                .principal_for(user_id, conversation.server_id, PrincipalKind::User)
                .await?;
            if !permissions.can_manage(&conversation, &principal).await? {
                return Err(DomainError::NotMessageAuthor.into());
            }
        }

        self.ctx.message_repo().delete(message.id).await?;
        info!("Message deleted");

        self.ctx
            .broadcaster()
            .broadcast(
                RoomKey::conversation(message.conversation_id),
                MESSAGE_DELETED,
                &MessageDeletedPayload {
                    id: message.id,
                    conversation: message.conversation_id,
                },
            )
            .await;

        Ok(())
    }

    // ========================================================================
    // Bot stream
    // ========================================================================

    /// Persist a bot message; the caller acks then emits `newMessage`
    #[instrument(skip(self, identity, request), fields(bot_id = %identity.bot_id, channel_id = %request.channel_id))]
    pub async fn bot_send(
        &self,
        identity: &BotIdentity,
        request: BotSendMessageRequest,
    ) -> ServiceResult<Acked<MessageSentAck>> {
        request.validate()?;
        validate_embeds(&request.embeds)?;
        validate_components(&request.components)?;

        let (conversation, _) = PermissionService::new(self.ctx)
            .visible_conversation(request.channel_id, identity.bot_id, PrincipalKind::Bot)
            .await?;

        let mut message = Message::from_bot(
            self.ctx.generate_id(),
            conversation.id,
            identity.bot_id,
            request.content,
        );
        message.embeds = request.embeds;
        message.components = request.components;
        message.reply_to = request.reply_to;

        if message.is_empty() && message.components.is_empty() {
            return Err(ServiceError::validation("Message must have content, embeds or components"));
        }

        self.ctx.message_repo().create(&message).await?;
        info!(message_id = %message.id, interaction_token = ?request.interaction_token, "Bot message created");

        let author = self
            .ctx
            .user_repo()
            .find_by_id(identity.bot_id)
            .await?
            .unwrap_or_else(|| User {
                bot: true,
                ..User::unknown(identity.bot_id)
            });

        Ok(Acked {
            ack: MessageSentAck::from(&message),
            event: RoomEvent::new(
                RoomKey::conversation(conversation.id),
                NEW_MESSAGE,
                &NewMessagePayload::new(&message, &author),
            ),
        })
    }

    /// Update a message this bot owns; the caller acks then emits `messageEdited`
    #[instrument(skip(self, identity, request), fields(bot_id = %identity.bot_id, message_id = %request.id))]
    pub async fn bot_update(
        &self,
        identity: &BotIdentity,
        request: BotUpdateMessageRequest,
    ) -> ServiceResult<Acked<MessageUpdateAck>> {
        request.validate()?;

        let mut message = self.find(request.id).await?;
        Self::require_owner(&message, identity)?;

        if let Some(embeds) = request.embeds {
            validate_embeds(&embeds)?;
            message.embeds = embeds;
        }
        if let Some(components) = request.components {
            validate_components(&components)?;
            message.components = components;
        }
        if let Some(content) = request.content {
            message.content = content;
        }
        message.edited_at = Some(Utc::now());

        self.ctx.message_repo().update(&message).await?;
        info!("Bot message updated");

        Ok(Acked {
            ack: MessageUpdateAck {
                id: message.id,
                edited_at: message.edited_at,
            },
            event: RoomEvent::new(
                RoomKey::conversation(message.conversation_id),
                MESSAGE_EDITED,
                &MessageEditedPayload::from(&message),
            ),
        })
    }

    /// Remove a message this bot owns; the caller acks then emits `messageDeleted`
    #[instrument(skip(self, identity, request), fields(bot_id = %identity.bot_id, message_id = %request.id))]
    pub async fn bot_remove(
        &self,
        identity: &BotIdentity,
        request: MessageIdRequest,
    ) -> ServiceResult<Acked<MessageRemovedAck>> {
        let message = self.find(request.id).await?;
        Self::require_owner(&message, identity)?;

        self.ctx.message_repo().delete(message.id).await?;
        info!("Bot message removed");

        Ok(Acked {
            ack: MessageRemovedAck { id: message.id },
            event: RoomEvent::new(
                RoomKey::conversation(message.conversation_id),
                MESSAGE_DELETED,
                &MessageDeletedPayload {
                    id: message.id,
                    conversation: message.conversation_id,
                },
            ),
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Stored `bot_id` must be the connection's bot
    fn require_owner(message: &Message, identity: &BotIdentity) -> ServiceResult<()> {
        if message.bot_id == Some(identity.bot_id) {
            Ok(())
        } else {
            Err(ServiceError::invalid_sender())
        }
    }

    async fn find(&self, id: Snowflake) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", id))
    }

    async fn conversation(&self, id: Snowflake) -> ServiceResult<Conversation> {
        self.ctx
            .conversation_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", id))
    }

    async fn author(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .unwrap_or_else(|| User::unknown(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{fixture, id, Fixture};
    use chat_core::{Overwrite, Permissions};
    use serde_json::json;

    const SERVER: i64 = 1;
    const CHANNEL: i64 = 10;
    const ALICE: i64 = 3;
    const BOB: i64 = 4;
    const BOT: i64 = 7;
    const OTHER_BOT: i64 = 8;

    fn seeded() -> Fixture {
        let fx = fixture();
        fx.store.insert_conversation(Conversation::new_channel(
            id(CHANNEL),
            id(SERVER),
            "general".into(),
            false,
        ));
        fx.store.insert_user(User::new(id(ALICE), "alice".into()));
        fx.store.insert_user(User::new_bot(id(BOT), "helper".into()));
        fx
    }

    fn send(content: &str) -> SendMessageRequest {
        serde_json::from_value(json!({"conversation_id": CHANNEL.to_string(), "content": content})).unwrap()
    }

    fn bot() -> BotIdentity {
        BotIdentity::new(id(BOT), id(70))
    }

    #[tokio::test]
    async fn test_send_persists_and_broadcasts() {
        let mut fx = seeded();
        let service = MessageService::new(&fx.ctx);

        let message = service.send(id(ALICE), send("hello")).await.unwrap();
        assert!(fx.store.message(message.id).is_some());

        let envelope = fx.next_event().unwrap();
        assert_eq!(envelope.event, NEW_MESSAGE);
        assert_eq!(envelope.room, RoomKey::conversation(id(CHANNEL)));
        assert_eq!(envelope.data["id"], message.id.to_string());
        assert_eq!(envelope.data["user"]["username"], "alice");
    }

    #[tokio::test]
    async fn test_send_to_hidden_channel_is_forbidden() {
        let mut fx = seeded();
        fx.store.insert_overwrite(Overwrite::new(id(CHANNEL), id(ALICE)).deny(Permissions::VIEW_CHANNEL));
        let service = MessageService::new(&fx.ctx);

        let err = service.send(id(ALICE), send("hello")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(fx.next_event().is_none());
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let fx = seeded();
        let service = MessageService::new(&fx.ctx);

        let err = service.send(id(ALICE), send("   ")).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_edit_by_other_user_is_refused() {
        let fx = seeded();
        let service = MessageService::new(&fx.ctx);
        let message = service.send(id(ALICE), send("hello")).await.unwrap();

        let request = serde_json::from_value(json!({"id": message.id, "content": "hacked"})).unwrap();
        let err = service.edit(id(BOB), request).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(fx.store.message(message.id).unwrap().content, "hello");
    }

    #[tokio::test]
    async fn test_moderator_can_delete_others_message() {
        let mut fx = seeded();
        let message = MessageService::new(&fx.ctx)
            .send(id(ALICE), send("hello"))
            .await
            .unwrap();
        let _ = fx.next_event();

        // Public channels grant MANAGE_CHANNELS by default
        MessageService::new(&fx.ctx)
            .delete(id(BOB), MessageIdRequest { id: message.id })
            .await
            .unwrap();

        let envelope = fx.next_event().unwrap();
        assert_eq!(envelope.event, MESSAGE_DELETED);
        assert!(fx.store.message(message.id).is_none());
    }

    #[tokio::test]
    async fn test_delete_without_manage_is_refused() {
        let fx = seeded();
        fx.store
            .insert_overwrite(Overwrite::new(id(CHANNEL), id(SERVER)).deny(Permissions::MANAGE_CHANNELS));
        let service = MessageService::new(&fx.ctx);
        let message = service.send(id(ALICE), send("hello")).await.unwrap();

        let err = service.delete(id(BOB), MessageIdRequest { id: message.id }).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(fx.store.message_deletes(), 0);
    }

    #[tokio::test]
    async fn test_bot_send_returns_ack_and_deferred_event() {
        let mut fx = seeded();
        let service = MessageService::new(&fx.ctx);
        let request = serde_json::from_value(json!({
            "channel_id": CHANNEL.to_string(),
            "content": "Pong",
            "components": [{"type": "button", "custom_id": "again", "label": "Again"}]
        }))
        .unwrap();

        let acked = service.bot_send(&bot(), request).await.unwrap();

        assert_eq!(acked.ack.channel_id, id(CHANNEL));
        assert_eq!(acked.event.event, NEW_MESSAGE);
        assert_eq!(acked.event.data["user"]["bot"], true);
        assert!(fx.next_event().is_none(), "bot events are emitted by the caller");
        assert_eq!(fx.store.message(acked.ack.id).unwrap().bot_id, Some(id(BOT)));
    }

    #[tokio::test]
    async fn test_bot_send_rejects_duplicate_custom_ids() {
        let fx = seeded();
        let service = MessageService::new(&fx.ctx);
        let request = serde_json::from_value(json!({
            "channel_id": CHANNEL.to_string(),
            "content": "Pick",
            "components": [
                {"type": "button", "custom_id": "x", "label": "A"},
                {"type": "button", "custom_id": "x", "label": "B"}
            ]
        }))
        .unwrap();

        let err = service.bot_send(&bot(), request).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_other_bot_cannot_update_or_remove() {
        let fx = seeded();
        fx.store
            .insert_message(Message::from_bot(id(200), id(CHANNEL), id(BOT), "mine".into()));
        let service = MessageService::new(&fx.ctx);
        let intruder = BotIdentity::new(id(OTHER_BOT), id(80));

        let update = serde_json::from_value(json!({"id": "200", "content": "theirs"})).unwrap();
        let err = service.bot_update(&intruder, update).await.unwrap_err();
        assert_eq!(err.reason(), "Invalid Sender");

        let err = service
            .bot_remove(&intruder, MessageIdRequest { id: id(200) })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "Invalid Sender");

        assert_eq!(fx.store.message(id(200)).unwrap().content, "mine");
        assert_eq!(fx.store.message_updates(), 0);
        assert_eq!(fx.store.message_deletes(), 0);
    }

    #[tokio::test]
    async fn test_bot_update_keeps_absent_fields() {
        let fx = seeded();
        let mut original = Message::from_bot(id(200), id(CHANNEL), id(BOT), "mine".into());
        original.components = vec![chat_core::Component::LinkButton {
            url: "https://example.com".into(),
            label: "Docs".into(),
        }];
        fx.store.insert_message(original);
        let service = MessageService::new(&fx.ctx);

        let update = serde_json::from_value(json!({"id": "200", "content": "edited"})).unwrap();
        let acked = service.bot_update(&bot(), update).await.unwrap();

        let stored = fx.store.message(id(200)).unwrap();
        assert_eq!(stored.content, "edited");
        assert_eq!(stored.components.len(), 1);
        assert!(acked.ack.edited_at.is_some());
        assert_eq!(acked.event.event, MESSAGE_EDITED);
    }
}
