//! Ordered Redis publisher.
//!
//! Every publish of an instance goes through one mpsc queue drained by one
//! task, so envelopes leave the process in the order they were enqueued.
//! A failed PUBLISH is retried with exponential backoff; once retries are
//! exhausted the envelope is logged and dropped and the task moves on.

use std::future::Future;
use std::time::Duration;

use chat_common::BusConfig;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bus::BusError;
use crate::pool::{RedisPool, RedisPoolError};
use crate::pubsub::{channel_name, BusEnvelope};

/// Capacity of the outbound queue before `enqueue` applies backpressure
pub const PUBLISH_QUEUE_CAPACITY: usize = 4096;

/// Handle to the publisher task
#[derive(Clone, Debug)]
pub struct Publisher {
    tx: mpsc::Sender<BusEnvelope>,
}

impl Publisher {
    /// Start the publisher task
    pub fn spawn(pool: RedisPool, config: BusConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(PUBLISH_QUEUE_CAPACITY);
        let handle = tokio::spawn(run(pool, rx, config));
        (Self { tx }, handle)
    }

    /// Queue an envelope behind every envelope queued before it
    pub async fn enqueue(&self, envelope: BusEnvelope) -> Result<(), BusError> {
        self.tx.send(envelope).await.map_err(|_| BusError::Closed)
    }
}

async fn run(pool: RedisPool, mut rx: mpsc::Receiver<BusEnvelope>, config: BusConfig) {
    while let Some(envelope) = rx.recv().await {
        let payload = match envelope.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(event = %envelope.event, error = %e, "Dropping unserializable envelope");
                continue;
            }
        };
        let channel = channel_name(envelope.namespace());

        let result = with_retries(
            config.publish_retries,
            |attempt| config.backoff(attempt),
            || publish_once(&pool, &channel, &payload),
        )
        .await;

        match result {
            Ok(receivers) => tracing::trace!(
                channel = %channel,
                room = %envelope.room,
                event = %envelope.event,
                seq = envelope.seq,
                receivers,
                "Published envelope"
            ),
            Err(e) => tracing::error!(
                channel = %channel,
                room = %envelope.room,
                event = %envelope.event,
                seq = envelope.seq,
                error = %e,
                "Publish failed after retries, dropping envelope"
            ),
        }
    }

    tracing::debug!("Publisher queue closed");
}

async fn publish_once(pool: &RedisPool, channel: &str, payload: &str) -> Result<u32, RedisPoolError> {
    let mut conn = pool.get().await?;
    let receivers: u32 = conn.publish(channel, payload).await?;
    Ok(receivers)
}

/// Run `op` once plus up to `retries` more times, sleeping `backoff(n)` before
/// retry `n`.
pub(crate) async fn with_retries<T, E, F, Fut>(
    retries: u32,
    backoff: impl Fn(u32) -> Duration,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::warn!(attempt, error = %e, "Publish failed, retrying");
                tokio::time::sleep(backoff(attempt)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn no_wait(_: u32) -> Duration {
        Duration::from_millis(1)
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, String> = with_retries(3, no_wait, || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err("connection reset".to_string())
            } else {
                Ok(1)
            }
        })
        .await;

        assert_eq!(result, Ok(1));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), String> = with_retries(3, no_wait, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("down".to_string())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_zero_retries_tries_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let _: Result<(), String> = with_retries(0, no_wait, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("down".to_string())
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
