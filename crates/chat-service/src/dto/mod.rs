//! Data transfer objects for socket events and HTTP calls
//!
//! - Request DTOs with validation for inbound payloads
//! - Response DTOs for room events, bot acks and HTTP bodies
//! - Wire event names

pub mod events;
pub mod requests;
pub mod responses;

pub use requests::{
    BotSendMessageRequest, BotUpdateMessageRequest, ButtonInteractionRequest, ConversationRequest,
    EditMessageRequest, MessageIdRequest, SendMessageRequest, SlashCommandRequest,
    ValidateCommandRequest,
};

pub use responses::{
    ButtonClickedPayload, CommandValidatedPayload, HealthResponse, InteractionAcceptedResponse,
    InteractionCreatePayload, JoinedConversationPayload, MessageDeletedPayload,
    MessageEditedPayload, MessageRemovedAck, MessageSentAck, MessageUpdateAck, NewMessagePayload,
    ReadinessResponse, UserResponse,
};
