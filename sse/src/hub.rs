use crate::config::HubConfig;
use crate::error::{Error, Result};
use crate::heartbeat;
use crate::listener::{Listener, ListenerId, Subscription};
use crate::message::Event;
use crate::registry::{Bucket, Registry, Scope};
use chrono::{DateTime, Utc};
use log::*;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Snapshot of how many listeners the hub is currently serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStats {
    pub groups: usize,
    pub users: usize,
    pub listeners: usize,
    pub closed: bool,
}

/// In-memory, best-effort event hub.
///
/// All listener bookkeeping sits behind one reader/writer lock: subscribe,
/// unsubscribe and close take it exclusively, while every fan-out (publish,
/// send, broadcast, heartbeat) and every count takes it shared. Fan-out never
/// waits on a consumer; a full mailbox means the event is dropped for that
/// listener alone.
///
/// Construct with `Hub::new` inside a tokio runtime (it spawns the heartbeat
/// task) and share the returned `Arc` with producers and transports.
pub struct Hub {
    registry: RwLock<Registry>,
    config: HubConfig,
    shutdown: CancellationToken,
    heartbeat: JoinHandle<()>,
}

impl Hub {
    pub fn new(config: HubConfig) -> Arc<Self> {
        info!(
            "Starting SSE hub: mailbox_capacity={}, heartbeat_interval={:?}, heartbeat_include_users={}",
            config.mailbox_capacity, config.heartbeat_interval, config.heartbeat_include_users
        );

        Arc::new_cyclic(|hub| {
            let shutdown = CancellationToken::new();
            let heartbeat =
                heartbeat::spawn(hub.clone(), config.heartbeat_interval, shutdown.clone());

            Self {
                registry: RwLock::new(Registry::new()),
                config,
                shutdown,
                heartbeat,
            }
        })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    // A panic while holding the lock cannot leave the registry half-updated:
    // every mutation is a single map insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener for every event published to `group_key`.
    ///
    /// Fails if `group_key` is empty (no event can be published to it), if the
    /// hub is closed, or if `listener_id` is already registered in that group;
    /// the existing registration is never replaced.
    pub fn subscribe(
        &self,
        group_key: &str,
        listener_id: impl Into<ListenerId>,
    ) -> Result<Subscription> {
        if group_key.is_empty() {
            warn!("Rejected group listener: empty group key");
            return Err(Error::empty_group_key());
        }
        self.subscribe_in(Scope::Group, group_key, listener_id.into())
    }

    /// Register a listener for events sent directly to `user_id`.
    pub fn subscribe_user(
        &self,
        user_id: &str,
        listener_id: impl Into<ListenerId>,
    ) -> Result<Subscription> {
        self.subscribe_in(Scope::User, user_id, listener_id.into())
    }

    fn subscribe_in(&self, scope: Scope, key: &str, id: ListenerId) -> Result<Subscription> {
        let (listener, subscription) = Listener::new(id, self.config.mailbox_capacity);

        let mut registry = self.write();

        if registry.is_closed() {
            drop(registry);
            warn!(
                "Rejected {} listener {} for {key}: hub is closed",
                scope.as_str(),
                listener.id()
            );
            listener.terminate();
            return Err(Error::closed());
        }

        if let Err(rejected) = registry.insert(scope, key, listener) {
            drop(registry);
            warn!(
                "Rejected {} listener {} for {key}: id already registered",
                scope.as_str(),
                rejected.id()
            );
            let err = Error::duplicate_listener(key, rejected.id().as_str());
            rejected.terminate();
            return Err(err);
        }

        let active = registry.listener_count(scope, key);
        drop(registry);

        info!(
            "Registered {} listener {} for {key} ({active} active)",
            scope.as_str(),
            subscription.id()
        );

        Ok(subscription)
    }

    /// Remove a group listener, cancel it and release its mailbox. Unknown ids are
    /// ignored, so calling this more than once is safe. Returns whether a listener
    /// was removed.
    pub fn unsubscribe(&self, group_key: &str, listener_id: &ListenerId) -> bool {
        self.unsubscribe_in(Scope::Group, group_key, listener_id)
    }

    /// Remove a user-directed listener. Same semantics as `unsubscribe`.
    pub fn unsubscribe_user(&self, user_id: &str, listener_id: &ListenerId) -> bool {
        self.unsubscribe_in(Scope::User, user_id, listener_id)
    }

    fn unsubscribe_in(&self, scope: Scope, key: &str, id: &ListenerId) -> bool {
        let mut registry = self.write();

        let Some(listener) = registry.remove(scope, key, id) else {
            drop(registry);
            debug!(
                "Ignoring unsubscribe of unknown {} listener {id} for {key}",
                scope.as_str()
            );
            return false;
        };

        // Already unreachable for fan-out; now signal and release.
        listener.terminate();
        let remaining = registry.listener_count(scope, key);
        drop(registry);

        info!(
            "Unregistered {} listener {id} for {key} ({remaining} remaining)",
            scope.as_str()
        );
        true
    }

    /// Deliver an event to every listener of its group. Events without a group
    /// key, or whose group has no listeners, are ignored. Returns how many
    /// listeners the event was enqueued for.
    pub fn publish(&self, event: Event) -> usize {
        let event = Arc::new(event);

        let Some(group_key) = event.group_key() else {
            debug!("Ignoring publish of {} event without a group key", event.kind());
            return 0;
        };

        self.fan_out_to(Scope::Group, group_key, &event)
    }

    /// Deliver an event to every listener registered for `user_id`.
    pub fn send_to_user(&self, user_id: &str, event: Event) -> usize {
        self.fan_out_to(Scope::User, user_id, &Arc::new(event))
    }

    /// Deliver an event to every listener in both indices.
    pub fn broadcast(&self, event: Event) -> usize {
        let event = Arc::new(event);
        let registry = self.read();

        let delivery = registry
            .buckets(Scope::Group)
            .chain(registry.buckets(Scope::User))
            .map(|(_, bucket)| fan_out(bucket, &event))
            .fold(Delivery::default(), Delivery::merge);
        drop(registry);

        debug!(
            "Broadcast {} event: delivered={}, dropped={}",
            event.kind(),
            delivery.delivered,
            delivery.dropped
        );
        delivery.delivered
    }

    fn fan_out_to(&self, scope: Scope, key: &str, event: &Arc<Event>) -> usize {
        let registry = self.read();

        let Some(bucket) = registry.bucket(scope, key) else {
            trace!(
                "No {} listeners for {key}, {} event not delivered",
                scope.as_str(),
                event.kind()
            );
            return 0;
        };

        let delivery = fan_out(bucket, event);
        drop(registry);

        debug!(
            "Sent {} event to {} {key}: delivered={}, dropped={}",
            event.kind(),
            scope.as_str(),
            delivery.delivered,
            delivery.dropped
        );
        delivery.delivered
    }

    /// One heartbeat pass: a keep-alive event per populated group, plus one
    /// shared event for user listeners when configured. Returns how many
    /// listeners were reached.
    pub(crate) fn sweep_heartbeat(&self, now: DateTime<Utc>) -> usize {
        let registry = self.read();

        let mut delivery = registry
            .buckets(Scope::Group)
            .map(|(key, bucket)| fan_out(bucket, &Arc::new(Event::heartbeat(Some(key), now))))
            .fold(Delivery::default(), Delivery::merge);

        if self.config.heartbeat_include_users {
            let event = Arc::new(Event::heartbeat(None, now));
            delivery = registry
                .buckets(Scope::User)
                .map(|(_, bucket)| fan_out(bucket, &event))
                .fold(delivery, Delivery::merge);
        }
        drop(registry);

        if delivery.dropped > 0 {
            debug!(
                "Heartbeat dropped for {} listener(s) with full mailboxes",
                delivery.dropped
            );
        }
        delivery.delivered
    }

    pub fn group_listener_count(&self, group_key: &str) -> usize {
        self.read().listener_count(Scope::Group, group_key)
    }

    pub fn user_listener_count(&self, user_id: &str) -> usize {
        self.read().listener_count(Scope::User, user_id)
    }

    pub fn has_group(&self, group_key: &str) -> bool {
        self.read().bucket(Scope::Group, group_key).is_some()
    }

    pub fn stats(&self) -> HubStats {
        let registry = self.read();
        HubStats {
            groups: registry.bucket_count(Scope::Group),
            users: registry.bucket_count(Scope::User),
            listeners: registry.total_listeners(),
            closed: registry.is_closed(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.read().is_closed()
    }

    /// Stop the heartbeat and terminate every listener. Afterwards publish and
    /// send deliver nothing and subscribe fails. Only the first call has any
    /// effect.
    pub fn close(&self) {
        self.shutdown.cancel();

        let mut registry = self.write();
        if registry.is_closed() {
            drop(registry);
            debug!("SSE hub already closed");
            return;
        }

        let listeners = registry.drain();
        let terminated = listeners.len();
        for listener in listeners {
            listener.terminate();
        }
        drop(registry);

        info!("Closed SSE hub, terminated {terminated} listener(s)");
    }
}

impl Drop for Hub {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Delivery {
    delivered: usize,
    dropped: usize,
}

impl Delivery {
    fn merge(self, other: Delivery) -> Delivery {
        Delivery {
            delivered: self.delivered + other.delivered,
            dropped: self.dropped + other.dropped,
        }
    }
}

fn fan_out(bucket: &Bucket, event: &Arc<Event>) -> Delivery {
    let mut delivery = Delivery::default();
    for listener in bucket.values() {
        if listener.try_deliver(event) {
            delivery.delivered += 1;
        } else {
            delivery.dropped += 1;
        }
    }
    delivery
}
