//! In-process bus for tests and single-node development.
//!
//! Clones share one channel, so several gateway instances inside one process
//! see each other's publishes exactly like separate processes on Redis.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use super::{BusError, BusState, EventBus};
use crate::pubsub::BusEnvelope;

const MEMORY_BUS_CAPACITY: usize = 4096;

#[derive(Clone)]
pub struct MemoryBus {
    tx: broadcast::Sender<BusEnvelope>,
    state: Arc<watch::Sender<BusState>>,
}

impl MemoryBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_BUS_CAPACITY)
    }

    /// Bus whose subscribers lag once `capacity` envelopes are unread
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        let (state, _) = watch::channel(BusState::Live);
        Self {
            tx,
            state: Arc::new(state),
        }
    }

    /// Force a state transition, e.g. to exercise readiness reporting
    pub fn set_state(&self, state: BusState) {
        self.state.send_replace(state);
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBus")
            .field("receivers", &self.tx.receiver_count())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

#[async_trait]
impl EventBus for MemoryBus {
    async fn publish(&self, envelope: BusEnvelope) -> Result<(), BusError> {
        // Zero subscribers is not an error: nobody is listening yet.
        let _ = self.tx.send(envelope);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BusEnvelope> {
        self.tx.subscribe()
    }

    fn state(&self) -> watch::Receiver<BusState> {
        self.state.subscribe()
    }
}
