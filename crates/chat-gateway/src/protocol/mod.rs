//! Gateway protocol definitions
//!
//! Every text frame, in both directions and on every namespace, is a
//! `{ "event": ..., "data": ... }` object.

mod messages;

pub use messages::{ErrorPayload, GatewayMessage};
