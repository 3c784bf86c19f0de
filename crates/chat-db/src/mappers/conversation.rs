//! Conversation entity <-> model mapper

use chat_core::{Conversation, ConversationKind, Snowflake};

use crate::models::ConversationModel;

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            server_id: model.server_id.map(Snowflake::new),
            kind: ConversationKind::from(model.kind),
            is_private: model.is_private,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_group_row_has_no_server() {
        let model = ConversationModel {
            id: 7,
            server_id: None,
            kind: 3,
            is_private: true,
            name: Some("friends".to_string()),
            created_at: Utc::now(),
        };

        let conversation = Conversation::from(model);
        assert_eq!(conversation.kind, ConversationKind::Group);
        assert!(!conversation.is_server_channel());
    }
}
