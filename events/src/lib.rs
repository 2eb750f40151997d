//! Event system infrastructure for the notification hub.
//!
//! This crate provides the event system that decouples producers (membership
//! changes, reminder scheduling, account administration) from the delivery
//! layer that pushes notifications to connected clients.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events that produce notifications
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on other internal crates, avoiding circular
//! dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias for the id of any circle, member or user.
pub type Id = Uuid;

/// Domain events that represent business-level changes in the system.
/// These events are emitted after the producing operation completes successfully.
///
/// Circle-scoped events are fanned out to everyone watching the circle.
/// Reminders and forced logouts are addressed to individual users, so those
/// variants carry the recipients explicitly.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A member joined a circle.
    MemberJoined {
        circle_id: Id,
        /// Serialized member record as the client renders it.
        member: Value,
    },
    /// A member left or was removed from a circle.
    MemberLeft { circle_id: Id, member_id: Id },
    /// A member's role or profile within a circle changed.
    MemberUpdated { circle_id: Id, member: Value },
    /// Circle-level details (name, schedule, settings) changed.
    CircleUpdated { circle_id: Id, circle: Value },
    /// A reminder fired. Each listed user gets a directed notification.
    ReminderDue {
        reminder: Value,
        notify_user_ids: Vec<Id>,
    },
    /// All of a user's sessions must end (password change, account disabled).
    ForceLogout { user_id: Id, reason: String },
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers, one after another.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            let label = match event {
                DomainEvent::MemberJoined { .. } => "member_joined",
                DomainEvent::ForceLogout { .. } => "force_logout",
                _ => "other",
            };
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{label}", self.name));
        }
    }

    #[tokio::test]
    async fn test_publish_calls_handlers_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(Recorder {
                name: "first",
                seen: seen.clone(),
            }))
            .with_handler(Arc::new(Recorder {
                name: "second",
                seen: seen.clone(),
            }));

        publisher
            .publish(DomainEvent::MemberJoined {
                circle_id: Id::new_v4(),
                member: serde_json::json!({"name": "Ada"}),
            })
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:member_joined", "second:member_joined"]
        );
    }

    #[tokio::test]
    async fn test_with_handler_does_not_mutate_clones() {
        let base = EventPublisher::new();
        let extended = base.clone().with_handler(Arc::new(Recorder {
            name: "only",
            seen: Arc::new(Mutex::new(Vec::new())),
        }));

        assert_eq!(base.handler_count(), 0);
        assert_eq!(extended.handler_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_noop() {
        EventPublisher::default()
            .publish(DomainEvent::ForceLogout {
                user_id: Id::new_v4(),
                reason: "test".to_string(),
            })
            .await;
    }
}
