//! Redis Pub/Sub subscriber.
//!
//! Holds one dedicated pub/sub connection subscribed to every fanout channel
//! and forwards decoded envelopes to a local broadcast channel. Connection
//! loss is never hidden: the state moves to `Degraded`, the loop reconnects
//! with exponential backoff and re-subscribes, and only then reports `Live`.

use chat_common::BusConfig;
use futures_util::StreamExt;
use redis::Client;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::bus::BusState;
use crate::pool::redact_url;
use crate::pubsub::{all_channels, BusEnvelope};

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Pub/Sub stream ended")]
    StreamEnded,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Channel buffer size for broadcast
    pub broadcast_buffer: usize,
    /// Backoff settings shared with the publisher
    pub bus: BusConfig,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            bus: BusConfig::default(),
        }
    }
}

/// Running subscriber task and the channels it feeds
pub struct Subscriber {
    envelopes: broadcast::Sender<BusEnvelope>,
    state: watch::Receiver<BusState>,
    handle: JoinHandle<()>,
}

impl Subscriber {
    /// Start the background listener. Returns immediately in `Connecting`.
    pub fn spawn(config: SubscriberConfig) -> Self {
        let (envelopes, _) = broadcast::channel(config.broadcast_buffer);
        let (state_tx, state) = watch::channel(BusState::Connecting);

        let handle = tokio::spawn(listener_loop(config, envelopes.clone(), state_tx));

        Self {
            envelopes,
            state,
            handle,
        }
    }

    /// Get a receiver for decoded envelopes
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<BusEnvelope> {
        self.envelopes.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<BusState> {
        self.state.clone()
    }

    /// Stop the listener task
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Builder for subscriber
pub struct SubscriberBuilder {
    config: SubscriberConfig,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SubscriberConfig::default(),
        }
    }

    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    #[must_use]
    pub fn bus_config(mut self, bus: BusConfig) -> Self {
        self.config.bus = bus;
        self
    }

    /// Build and start the subscriber
    pub fn spawn(self) -> Subscriber {
        Subscriber::spawn(self.config)
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn set_state(state_tx: &watch::Sender<BusState>, next: BusState) {
    let previous = state_tx.send_replace(next);
    if previous == next {
        return;
    }
    match next {
        BusState::Live => tracing::info!(previous = ?previous, "Bus subscriber live"),
        BusState::Degraded { attempts } => {
            tracing::warn!(previous = ?previous, attempts, "Bus subscriber degraded, reconnecting");
        }
        BusState::Connecting => tracing::debug!("Bus subscriber connecting"),
    }
}

async fn listener_loop(
    config: SubscriberConfig,
    envelopes: broadcast::Sender<BusEnvelope>,
    state_tx: watch::Sender<BusState>,
) {
    let mut attempts: u32 = 0;

    loop {
        let result = run_listener(&config, &envelopes, &state_tx, &mut attempts).await;

        attempts = attempts.saturating_add(1);
        match result {
            Err(SubscriberError::StreamEnded) => {
                tracing::warn!(url = %redact_url(&config.redis_url), "Pub/Sub stream ended");
            }
            Err(SubscriberError::Redis(e)) => {
                tracing::error!(url = %redact_url(&config.redis_url), error = %e, attempts, "Subscriber connection failed");
            }
            Ok(()) => {}
        }
        set_state(&state_tx, BusState::Degraded { attempts });

        tokio::time::sleep(config.bus.backoff(attempts)).await;
    }
}

/// Connect, subscribe to every fanout channel and pump messages until the
/// connection drops.
async fn run_listener(
    config: &SubscriberConfig,
    envelopes: &broadcast::Sender<BusEnvelope>,
    state_tx: &watch::Sender<BusState>,
    attempts: &mut u32,
) -> SubscriberResult<()> {
    let client = Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;

    for channel in all_channels() {
        pubsub.subscribe(&channel).await?;
    }

    *attempts = 0;
    set_state(state_tx, BusState::Live);

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(channel = %msg.get_channel_name(), error = %e, "Unreadable Pub/Sub payload");
                continue;
            }
        };

        match BusEnvelope::from_json(&payload) {
            // No receivers just means no dispatch loop is running yet
            Ok(envelope) => {
                let _ = envelopes.send(envelope);
            }
            Err(e) => {
                tracing::warn!(channel = %msg.get_channel_name(), error = %e, "Discarding malformed envelope");
            }
        }
    }

    Err(SubscriberError::StreamEnded)
}
