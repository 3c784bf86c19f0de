//! Business logic services
//!
//! Each service borrows the shared `ServiceContext` for the duration of one
//! operation. Both gateway namespaces and the HTTP interaction endpoint call
//! into these.

pub mod broadcast;
pub mod command;
pub mod context;
pub mod error;
pub mod interaction;
pub mod message;
pub mod permission;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast::{Broadcaster, RoomEvent};
pub use command::{CommandOutcome, CommandService, CommandValidation};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use interaction::InteractionService;
pub use message::{Acked, MessageService};
pub use permission::PermissionService;
