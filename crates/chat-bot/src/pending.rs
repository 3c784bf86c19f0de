//! Pending request table
//!
//! Acks carry no request id, so each kind keeps a FIFO of waiting callers
//! and an ack always settles the oldest one. A caller that times out is
//! removed from its queue so a late ack goes to the next caller instead.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::BotError;
use crate::protocol::events;

type PendingTx = oneshot::Sender<Result<Value, BotError>>;

/// Request kinds that expect an ack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckKind {
    CommandValidated,
    MessageSent,
    MessageUpdate,
    MessageRemoved,
}

impl AckKind {
    /// Event name the request is sent under
    pub const fn request_event(self) -> &'static str {
        match self {
            Self::CommandValidated => events::VALIDATE_COMMAND,
            Self::MessageSent => events::SEND_MESSAGE,
            Self::MessageUpdate => events::UPDATE_MESSAGE,
            Self::MessageRemoved => events::REMOVE_MESSAGE,
        }
    }

    /// Event name of the ack
    pub const fn ack_event(self) -> &'static str {
        match self {
            Self::CommandValidated => events::COMMAND_VALIDATED,
            Self::MessageSent => events::MESSAGE_SENT,
            Self::MessageUpdate => events::MESSAGE_UPDATE,
            Self::MessageRemoved => events::MESSAGE_REMOVED,
        }
    }

    pub fn from_ack_event(event: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.ack_event() == event)
    }

    pub fn from_request_event(event: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.request_event() == event)
    }

    const ALL: [Self; 4] = [
        Self::CommandValidated,
        Self::MessageSent,
        Self::MessageUpdate,
        Self::MessageRemoved,
    ];
}

struct Pending {
    id: u64,
    tx: PendingTx,
}

#[derive(Default)]
pub struct PendingAcks {
    queues: Mutex<HashMap<AckKind, VecDeque<Pending>>>,
    next_id: AtomicU64,
}

impl PendingAcks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a caller; returns its id and the receiving end
    pub fn register(&self, kind: AckKind) -> (u64, oneshot::Receiver<Result<Value, BotError>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.queues
            .lock()
            .entry(kind)
            .or_default()
            .push_back(Pending { id, tx });
        (id, rx)
    }

    /// Settle the oldest live caller of `kind`; false if nobody was waiting
    pub fn resolve(&self, kind: AckKind, data: Value) -> bool {
        self.settle(kind, Ok(data))
    }

    pub fn reject(&self, kind: AckKind, error: BotError) -> bool {
        self.settle(kind, Err(error))
    }

    fn settle(&self, kind: AckKind, mut result: Result<Value, BotError>) -> bool {
        let mut queues = self.queues.lock();
        let Some(queue) = queues.get_mut(&kind) else {
            return false;
        };

        while let Some(pending) = queue.pop_front() {
            match pending.tx.send(result) {
                Ok(()) => return true,
                // Receiver dropped; hand the result to the next caller
                Err(returned) => result = returned,
            }
        }

        false
    }

    /// Remove a caller; false if it was already settled
    pub fn cancel(&self, kind: AckKind, id: u64) -> bool {
        let mut queues = self.queues.lock();
        let Some(queue) = queues.get_mut(&kind) else {
            return false;
        };

        match queue.iter().position(|pending| pending.id == id) {
            Some(index) => {
                queue.remove(index);
                true
            }
            None => false,
        }
    }

    /// Wait for a caller's ack, at most `timeout`.
    ///
    /// Whichever of ack and timeout happens first wins; the other has no
    /// effect.
    pub async fn wait(
        &self,
        kind: AckKind,
        id: u64,
        mut rx: oneshot::Receiver<Result<Value, BotError>>,
        timeout: Duration,
    ) -> Result<Value, BotError> {
        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BotError::Disconnected),
            Err(_) => {
                if !self.cancel(kind, id) {
                    // Settled between the deadline and the cancel
                    if let Ok(result) = rx.try_recv() {
                        return result;
                    }
                }

                tracing::warn!(event = kind.request_event(), ?timeout, "Ack timed out");
                Err(BotError::AckTimeout {
                    event: kind.request_event(),
                    timeout,
                })
            }
        }
    }

    /// Fail every waiting caller, e.g. when the socket drops
    pub fn fail_all(&self) {
        let drained: Vec<Pending> = self
            .queues
            .lock()
            .drain()
            .flat_map(|(_, queue)| queue)
            .collect();

        for pending in drained {
            let _ = pending.tx.send(Err(BotError::Disconnected));
        }
    }

    pub fn len(&self, kind: AckKind) -> usize {
        self.queues.lock().get(&kind).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.lock().values().all(VecDeque::is_empty)
    }
}

impl std::fmt::Debug for PendingAcks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queues = self.queues.lock();
        f.debug_struct("PendingAcks")
            .field("waiting", &queues.values().map(VecDeque::len).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_name_mapping() {
        assert_eq!(AckKind::from_ack_event("messageSent"), Some(AckKind::MessageSent));
        assert_eq!(AckKind::from_request_event("removeMessage"), Some(AckKind::MessageRemoved));
        assert_eq!(AckKind::from_ack_event("newMessage"), None);
    }

    #[tokio::test]
    async fn test_ack_resolves_oldest_first() {
        let pending = PendingAcks::new();
        let (_, mut first) = pending.register(AckKind::MessageSent);
        let (_, mut second) = pending.register(AckKind::MessageSent);

        assert!(pending.resolve(AckKind::MessageSent, json!({"id": "1"})));

        assert_eq!(first.try_recv().unwrap().unwrap()["id"], "1");
        assert!(second.try_recv().is_err());
        assert_eq!(pending.len(AckKind::MessageSent), 1);
    }

    #[tokio::test]
    async fn test_kinds_do_not_interfere() {
        let pending = PendingAcks::new();
        let (_, mut sent) = pending.register(AckKind::MessageSent);

        assert!(!pending.resolve(AckKind::MessageRemoved, json!({})));
        assert!(sent.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_timeout_removes_listener() {
        let pending = PendingAcks::new();
        let (id, rx) = pending.register(AckKind::MessageUpdate);

        let err = pending
            .wait(AckKind::MessageUpdate, id, rx, Duration::from_millis(20))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(pending.is_empty());
        assert!(!pending.resolve(AckKind::MessageUpdate, json!({})), "late ack finds nobody");
    }

    #[tokio::test]
    async fn test_late_ack_goes_to_next_caller() {
        let pending = PendingAcks::new();
        let (first_id, first_rx) = pending.register(AckKind::MessageSent);
        let _ = pending
            .wait(AckKind::MessageSent, first_id, first_rx, Duration::from_millis(20))
            .await;

        let (second_id, second_rx) = pending.register(AckKind::MessageSent);
        pending.resolve(AckKind::MessageSent, json!({"id": "2"}));

        let value = pending
            .wait(AckKind::MessageSent, second_id, second_rx, Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(value["id"], "2");
    }

    #[tokio::test]
    async fn test_reject_and_fail_all() {
        let pending = PendingAcks::new();
        let (_, mut a) = pending.register(AckKind::CommandValidated);
        let (_, mut b) = pending.register(AckKind::MessageSent);

        pending.reject(
            AckKind::CommandValidated,
            BotError::Rejected {
                reason: "Invalid Sender".into(),
                code: "INVALID_SENDER".into(),
            },
        );
        assert_eq!(a.try_recv().unwrap().unwrap_err().reason(), Some("Invalid Sender"));

        pending.fail_all();
        assert!(matches!(b.try_recv().unwrap(), Err(BotError::Disconnected)));
        assert!(pending.is_empty());
    }
}
