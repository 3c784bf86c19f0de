//! Fanout adapter
//!
//! Runs the instance's single bus dispatch loop. Every room event reaches
//! local sockets through here, including events this instance published.

use crate::connection::ConnectionManager;
use crate::protocol::GatewayMessage;
use chat_cache::{wait_until_live, BusEnvelope, BusError, BusState, EventBus};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Routes bus envelopes to the members of their room
pub struct FanoutAdapter {
    bus: Arc<dyn EventBus>,
    connections: Arc<ConnectionManager>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl FanoutAdapter {
    pub fn new(bus: Arc<dyn EventBus>, connections: Arc<ConnectionManager>) -> Self {
        Self {
            bus,
            connections,
            tasks: Mutex::new(Vec::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Start the dispatch loop once the bus is live.
    ///
    /// Must complete before the listener is bound; a bus that does not come
    /// up within `startup_timeout` is an error.
    pub async fn start(self: &Arc<Self>, startup_timeout: Duration) -> Result<(), BusError> {
        // Subscribe before waiting so nothing published in between is missed
        let receiver = self.bus.subscribe();
        let states = self.bus.state();

        wait_until_live(self.bus.as_ref(), startup_timeout).await?;

        let adapter = self.clone();
        let dispatch = tokio::spawn(async move { adapter.run(receiver).await });
        let monitor = tokio::spawn(watch_state(states));

        self.tasks.lock().extend([dispatch, monitor]);
        tracing::info!("Fanout adapter started");

        Ok(())
    }

    /// Stop the dispatch loop
    pub fn stop(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        tracing::info!("Fanout adapter stopped");
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().iter().any(|t| !t.is_finished())
    }

    /// Envelopes skipped because the dispatch loop fell behind the bus
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Current bus state
    pub fn bus_state(&self) -> BusState {
        *self.bus.state().borrow()
    }

    async fn run(&self, mut receiver: broadcast::Receiver<BusEnvelope>) {
        loop {
            match receiver.recv().await {
                Ok(envelope) => {
                    self.dispatch(envelope);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    let total = self.dropped.fetch_add(n, Ordering::Relaxed) + n;
                    tracing::error!(lagged = n, total, "Fanout dispatch lagged, envelopes dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Bus receiver closed");
                    break;
                }
            }
        }

        tracing::info!("Fanout dispatch loop ended");
    }

    /// Deliver one envelope to local members of its room
    pub fn dispatch(&self, envelope: BusEnvelope) -> usize {
        let BusEnvelope {
            origin,
            seq,
            room,
            event,
            data,
        } = envelope;

        let sent = self
            .connections
            .deliver(&room, &GatewayMessage::new(event.as_str(), data));

        tracing::trace!(
            room = %room,
            event = %event,
            origin = %origin,
            seq,
            sent,
            "Event dispatched"
        );

        sent
    }
}

impl Drop for FanoutAdapter {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

impl std::fmt::Debug for FanoutAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutAdapter")
            .field("connections", &self.connections)
            .field("bus_state", &self.bus_state())
            .field("dropped", &self.dropped_events())
            .finish()
    }
}

/// Log every bus state transition
async fn watch_state(mut states: watch::Receiver<BusState>) {
    while states.changed().await.is_ok() {
        let state = *states.borrow_and_update();
        match state {
            BusState::Live => tracing::info!(bus = state.as_str(), "Bus live"),
            BusState::Connecting => tracing::warn!(bus = state.as_str(), "Bus connecting"),
            BusState::Degraded { attempts } => {
                tracing::warn!(bus = state.as_str(), attempts, "Bus degraded, fanout paused");
            }
        }
    }
}
