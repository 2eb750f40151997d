use crate::message::Event;
use log::*;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

pub use tokio::sync::mpsc::error::TryRecvError;

/// Identifier for a listener, unique within the bucket it is registered under.
/// Transports normally generate one per connection with `ListenerId::new()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(String);

impl ListenerId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ListenerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ListenerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hub-owned half of a listener: the write end of its mailbox and its cancel signal.
///
/// A `Listener` lives in the registry from subscribe until it is removed, at which
/// point `terminate` fires the cancel signal and releases the mailbox.
#[derive(Debug)]
pub struct Listener {
    id: ListenerId,
    sender: mpsc::Sender<Arc<Event>>,
    cancel: CancellationToken,
}

impl Listener {
    /// Create a listener with an empty mailbox of `capacity` slots and return it
    /// together with the consumer half handed to the transport.
    pub(crate) fn new(id: ListenerId, capacity: usize) -> (Listener, Subscription) {
        let (sender, mailbox) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();

        let subscription = Subscription {
            id: id.clone(),
            mailbox,
            cancel: cancel.clone(),
        };

        (
            Listener { id, sender, cancel },
            subscription,
        )
    }

    pub fn id(&self) -> &ListenerId {
        &self.id
    }

    /// Enqueue without waiting. Returns `false` when the event was dropped for
    /// this listener because its mailbox is full or its consumer went away.
    pub(crate) fn try_deliver(&self, event: &Arc<Event>) -> bool {
        match self.sender.try_send(Arc::clone(event)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!(
                    "Mailbox full for listener {}, dropping {} event",
                    self.id,
                    event.kind()
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                trace!(
                    "Consumer for listener {} is gone, dropping {} event",
                    self.id,
                    event.kind()
                );
                false
            }
        }
    }

    /// Fire the cancel signal, then release the mailbox. Must only be called
    /// after the listener has been removed from the registry.
    pub(crate) fn terminate(self) {
        self.cancel.cancel();
        drop(self.sender);
    }
}

/// Consumer half of a listener, owned by the transport handler.
///
/// Events arrive in the order they were enqueued. Once the hub cancels the
/// listener, `recv` returns `None` and any still-buffered events are abandoned.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    mailbox: mpsc::Receiver<Arc<Event>>,
    cancel: CancellationToken,
}

impl Subscription {
    pub fn id(&self) -> &ListenerId {
        &self.id
    }

    /// Wait for the next event. Returns `None` once the listener is cancelled or
    /// its mailbox has been released.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            event = self.mailbox.recv() => event,
        }
    }

    /// Take the next buffered event without waiting. Does not look at the cancel
    /// signal, so events buffered before teardown can still be inspected.
    pub fn try_recv(&mut self) -> Result<Arc<Event>, TryRecvError> {
        self.mailbox.try_recv()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the hub has cancelled this listener.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Kind;
    use serde_json::json;

    fn event(n: u64) -> Arc<Event> {
        Arc::new(Event::group(Kind::MemberUpdated, "g", json!({ "n": n })))
    }

    #[test]
    fn test_listener_ids_are_unique() {
        assert_ne!(ListenerId::new(), ListenerId::new());
    }

    #[test]
    fn test_try_deliver_drops_when_full() {
        let (listener, mut subscription) = Listener::new("L1".into(), 2);

        assert!(listener.try_deliver(&event(1)));
        assert!(listener.try_deliver(&event(2)));
        assert!(!listener.try_deliver(&event(3)));

        assert_eq!(subscription.try_recv().unwrap().payload()["n"], 1);
        assert_eq!(subscription.try_recv().unwrap().payload()["n"], 2);
        assert!(matches!(subscription.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let (listener, _subscription) = Listener::new("L1".into(), 0);
        assert!(listener.try_deliver(&event(1)));
        assert!(!listener.try_deliver(&event(2)));
    }

    #[test]
    fn test_try_deliver_after_consumer_dropped_is_a_drop() {
        let (listener, subscription) = Listener::new("L1".into(), 4);
        drop(subscription);
        assert!(!listener.try_deliver(&event(1)));
    }

    #[tokio::test]
    async fn test_terminate_cancels_and_releases_mailbox() {
        let (listener, mut subscription) = Listener::new("L1".into(), 4);
        assert!(listener.try_deliver(&event(1)));

        listener.terminate();

        assert!(subscription.is_cancelled());
        assert!(subscription.recv().await.is_none());
        // The buffered event is still there, but the write side is gone.
        assert!(subscription.try_recv().is_ok());
        assert!(matches!(
            subscription.try_recv(),
            Err(TryRecvError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_recv_returns_events_in_order() {
        let (listener, mut subscription) = Listener::new("L1".into(), 8);
        for n in 0..5 {
            assert!(listener.try_deliver(&event(n)));
        }
        for n in 0..5 {
            let received = subscription.recv().await.unwrap();
            assert_eq!(received.payload()["n"], n);
        }
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_terminate() {
        let (listener, subscription) = Listener::new("L1".into(), 4);

        let waiter = tokio::spawn(async move {
            subscription.cancelled().await;
            subscription.is_cancelled()
        });

        listener.terminate();
        assert!(waiter.await.unwrap());
    }
}
