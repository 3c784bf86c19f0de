//! Cross-instance event bus.
//!
//! Every room broadcast is published to the bus and delivered to local
//! sockets only when it comes back, on the publishing instance as on every
//! other. There is no local-only path.

mod memory;
mod redis_bus;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

pub use memory::MemoryBus;
pub use redis_bus::RedisBus;

use crate::pool::RedisPoolError;
use crate::pubsub::BusEnvelope;

/// Health of the bus connection as seen by this instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    /// Initial connection not yet established
    Connecting,
    /// Subscribed and delivering
    Live,
    /// Connection lost; reconnecting with backoff
    Degraded { attempts: u32 },
}

impl BusState {
    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Degraded { .. } => "degraded",
        }
    }
}

/// Bus errors
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Redis pool error: {0}")]
    Pool(#[from] RedisPoolError),

    #[error("Bus publisher is closed")]
    Closed,

    #[error("Bus not live after {0:?}")]
    StartupTimeout(Duration),
}

/// Shared pub/sub bus handle, created once per process and injected wherever
/// a broadcast can originate.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Queue an envelope for every instance, this one included
    async fn publish(&self, envelope: BusEnvelope) -> Result<(), BusError>;

    /// Envelopes arriving from the bus
    fn subscribe(&self) -> broadcast::Receiver<BusEnvelope>;

    /// Current and future connection state
    fn state(&self) -> watch::Receiver<BusState>;
}

/// Wait until the bus reports `Live`, failing after `timeout`.
pub async fn wait_until_live(bus: &dyn EventBus, timeout: Duration) -> Result<(), BusError> {
    let mut state = bus.state();
    let live = tokio::time::timeout(timeout, state.wait_for(BusState::is_live))
        .await
        .is_ok_and(|r| r.is_ok());

    if live {
        Ok(())
    } else {
        Err(BusError::StartupTimeout(timeout))
    }
}
