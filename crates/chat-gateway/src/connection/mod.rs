//! Connection management
//!
//! The connection registry and the room membership index built on it.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionId, Identity};
pub use manager::ConnectionManager;
