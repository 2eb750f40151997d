use config::Config;
use events::EventPublisher;
use sse::{Hub, SseDomainEventHandler};
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state shared by every request handler and producer.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub event_publisher: EventPublisher,
    pub config: Config,
}

impl AppState {
    /// Builds the hub from `app_config` and wires the SSE domain event handler
    /// into the publisher. Must be called from within a tokio runtime.
    pub fn new(app_config: Config) -> Self {
        let hub = Hub::new(app_config.hub_config());
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(SseDomainEventHandler::new(Arc::clone(&hub))));

        Self {
            hub,
            event_publisher,
            config: app_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use events::{DomainEvent, Id};
    use sse::Kind;

    #[tokio::test]
    async fn test_app_state_routes_domain_events_into_hub() {
        let config = Config::try_parse_from(["notification_hub", "--mailbox-capacity", "3"]).unwrap();
        let app_state = AppState::new(config);
        assert_eq!(app_state.hub.config().mailbox_capacity, 3);

        let circle_id = Id::new_v4();
        let mut subscription = app_state
            .hub
            .subscribe(&circle_id.to_string(), "L1")
            .unwrap();

        app_state
            .event_publisher
            .publish(DomainEvent::CircleUpdated {
                circle_id,
                circle: serde_json::json!({"name": "Book club"}),
            })
            .await;

        assert_eq!(subscription.try_recv().unwrap().kind(), Kind::CircleUpdated);
        app_state.hub.close();
    }
}
