//! # chat-service
//!
//! Application layer: permission resolution, the command registry,
//! interaction dispatch and message mutations, plus the DTOs both
//! transports speak.

pub mod dto;
pub mod services;

pub use services::{
    Acked, Broadcaster, CommandOutcome, CommandService, CommandValidation, ErrorKind,
    InteractionService, MessageService, PermissionService, RoomEvent, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult,
};
