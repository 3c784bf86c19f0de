//! Integration test utilities for the chat gateway
//!
//! Spawns gateways on ephemeral ports over an in-memory store and bus, and
//! provides raw socket clients for the user and bot streams.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
