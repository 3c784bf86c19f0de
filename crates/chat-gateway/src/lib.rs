//! # chat-gateway
//!
//! Real-time gateway: three WebSocket namespaces, the connection registry
//! and room membership, the bus fanout loop and the HTTP interaction route.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod http;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, serve, start, GatewayState};
