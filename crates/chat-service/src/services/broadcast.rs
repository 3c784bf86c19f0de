//! Room broadcast handle used by services.
//!
//! Wraps the process-wide bus, stamping each envelope with this instance's
//! origin and a per-instance sequence number. Delivery to sockets happens in
//! the gateway when the envelope comes back from the bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chat_cache::{BusEnvelope, EventBus};
use chat_core::RoomKey;
use serde::Serialize;
use tracing::{trace, warn};

/// An event addressed to a room, ready to publish
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub room: RoomKey,
    pub event: &'static str,
    pub data: serde_json::Value,
}

impl RoomEvent {
    /// Serialize a payload for `room`.
    ///
    /// Payload types in this crate serialize infallibly; a failure degrades to
    /// `null` rather than dropping the event.
    pub fn new(room: RoomKey, event: &'static str, payload: &impl Serialize) -> Self {
        let data = serde_json::to_value(payload).unwrap_or_else(|e| {
            warn!(event, error = %e, "Failed to serialize event payload");
            serde_json::Value::Null
        });
        Self { room, event, data }
    }
}

/// Cloneable publishing handle
#[derive(Clone)]
pub struct Broadcaster {
    bus: Arc<dyn EventBus>,
    origin: Arc<str>,
    seq: Arc<AtomicU64>,
}

impl Broadcaster {
    pub fn new(bus: Arc<dyn EventBus>, origin: impl Into<Arc<str>>) -> Self {
        Self {
            bus,
            origin: origin.into(),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Instance id stamped on outgoing envelopes
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    /// Publish to every instance.
    ///
    /// Retries happen inside the bus; a failure here is logged and the
    /// event is dropped.
    pub async fn emit(&self, event: RoomEvent) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let room = event.room.to_string();
        let envelope = BusEnvelope::new(self.origin.as_ref(), seq, event.room, event.event, event.data);

        match self.bus.publish(envelope).await {
            Ok(()) => trace!(room = %room, event = event.event, seq, "Event queued"),
            Err(e) => warn!(room = %room, event = event.event, error = %e, "Dropping event"),
        }
    }

    /// Shorthand for [`RoomEvent::new`] followed by [`Broadcaster::emit`]
    pub async fn broadcast(&self, room: RoomKey, event: &'static str, payload: &impl Serialize) {
        self.emit(RoomEvent::new(room, event, payload)).await;
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("origin", &self.origin)
            .field("seq", &self.seq.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_cache::MemoryBus;
    use chat_core::Snowflake;
    use serde_json::json;

    #[tokio::test]
    async fn test_envelopes_are_stamped_and_sequenced() {
        let bus = MemoryBus::new();
        let mut rx = bus.subscribe();
        let broadcaster = Broadcaster::new(Arc::new(bus), "instance-a");
        let room = RoomKey::conversation(Snowflake::new(1));

        broadcaster.broadcast(room.clone(), "newMessage", &json!({"n": 1})).await;
        broadcaster.broadcast(room.clone(), "newMessage", &json!({"n": 2})).await;

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.origin, "instance-a");
        assert_eq!(first.room, room);
        assert_eq!(first.seq + 1, second.seq);
        assert_eq!(second.data["n"], 2);
    }
}
