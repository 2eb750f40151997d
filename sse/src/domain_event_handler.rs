use crate::message::{Event as SseEvent, Kind};
use crate::Hub;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use serde_json::json;
use std::sync::Arc;

/// Handles domain events by converting them to hub events and routing them.
///
/// Circle events are published to the circle's group (group key = circle id).
/// Reminders and forced logouts are sent to each affected user directly.
pub struct SseDomainEventHandler {
    hub: Arc<Hub>,
}

impl SseDomainEventHandler {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    /// Send the same event to every listed user.
    fn send_to_users(&self, sse_event: SseEvent, user_ids: &[events::Id]) {
        let mut delivered = 0;
        for user_id in user_ids {
            delivered += self
                .hub
                .send_to_user(&user_id.to_string(), sse_event.clone());
        }

        debug!(
            "Sent {} event to {} user(s), {} listener(s) reached",
            sse_event.kind(),
            user_ids.len(),
            delivered
        );
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::MemberJoined { circle_id, member } => {
                debug!("Handling MemberJoined event for circle {}", circle_id);

                self.hub.publish(SseEvent::group(
                    Kind::MemberJoined,
                    circle_id.to_string(),
                    json!({
                        "circle_id": circle_id.to_string(),
                        "member": member,
                    }),
                ));
            }

            DomainEvent::MemberLeft {
                circle_id,
                member_id,
            } => {
                debug!("Handling MemberLeft event for circle {}", circle_id);

                self.hub.publish(SseEvent::group(
                    Kind::MemberLeft,
                    circle_id.to_string(),
                    json!({
                        "circle_id": circle_id.to_string(),
                        "member_id": member_id.to_string(),
                    }),
                ));
            }

            DomainEvent::MemberUpdated { circle_id, member } => {
                debug!("Handling MemberUpdated event for circle {}", circle_id);

                self.hub.publish(SseEvent::group(
                    Kind::MemberUpdated,
                    circle_id.to_string(),
                    json!({
                        "circle_id": circle_id.to_string(),
                        "member": member,
                    }),
                ));
            }

            DomainEvent::CircleUpdated { circle_id, circle } => {
                debug!("Handling CircleUpdated event for circle {}", circle_id);

                self.hub.publish(SseEvent::group(
                    Kind::CircleUpdated,
                    circle_id.to_string(),
                    json!({
                        "circle_id": circle_id.to_string(),
                        "circle": circle,
                    }),
                ));
            }

            DomainEvent::ReminderDue {
                reminder,
                notify_user_ids,
            } => {
                debug!(
                    "Handling ReminderDue event for {} user(s)",
                    notify_user_ids.len()
                );

                let sse_event = SseEvent::direct(Kind::ReminderDue, json!({ "reminder": reminder }));
                self.send_to_users(sse_event, notify_user_ids);
            }

            DomainEvent::ForceLogout { user_id, reason } => {
                info!("Forcing logout of user {}: {}", user_id, reason);

                let sse_event = SseEvent::direct(Kind::ForceLogout, json!({ "reason": reason }));
                self.send_to_users(sse_event, std::slice::from_ref(user_id));
            }
        }
    }
}
