//! Message entity <-> model mapper

use chat_core::{Component, Embed, Message, Snowflake};
use sqlx::types::Json;

use crate::models::MessageModel;

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            author_id: Snowflake::new(model.author_id),
            bot_id: model.bot_id.map(Snowflake::new),
            content: model.content,
            embeds: model.embeds.0,
            components: model.components.0,
            reply_to: model.reply_to.map(Snowflake::new),
            files: model.files,
            created_at: model.created_at,
            edited_at: model.edited_at,
        }
    }
}

/// Message values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub conversation_id: i64,
    pub author_id: i64,
    pub bot_id: Option<i64>,
    pub content: &'a str,
    pub embeds: Json<&'a [Embed]>,
    pub components: Json<&'a [Component]>,
    pub reply_to: Option<i64>,
    pub files: &'a [String],
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            conversation_id: message.conversation_id.into_inner(),
            author_id: message.author_id.into_inner(),
            bot_id: message.bot_id.map(Snowflake::into_inner),
            content: &message.content,
            embeds: Json(&message.embeds),
            components: Json(&message.components),
            reply_to: message.reply_to.map(Snowflake::into_inner),
            files: &message.files,
        }
    }
}
