use crate::error::Result;
use async_stream::stream;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use log::*;
use service::AppState;
use sse::registry::Scope;
use sse::{EventType, Hub, ListenerId, Subscription};
use std::convert::Infallible;
use std::sync::Arc;

/// Unregisters a listener from the hub when dropped.
///
/// The guard lives inside the response stream, so it runs whether the stream
/// ends because the hub cancelled the listener or because the client went away
/// and axum dropped the stream mid-read.
struct ListenerGuard {
    hub: Arc<Hub>,
    scope: Scope,
    key: String,
    listener_id: ListenerId,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        debug!(
            "SSE stream for {} {} closed, cleaning up listener {}",
            self.scope.as_str(),
            self.key,
            self.listener_id
        );
        match self.scope {
            Scope::Group => self.hub.unsubscribe(&self.key, &self.listener_id),
            Scope::User => self.hub.unsubscribe_user(&self.key, &self.listener_id),
        };
    }
}

/// GET a long-lived SSE stream of every event published to a group.
#[utoipa::path(
    get,
    path = "/events/groups/{group_key}",
    params(
        ("group_key" = String, Path, description = "Routing key of the group to listen to, e.g. a circle id")
    ),
    responses(
        (status = 200, description = "Event stream opened", content_type = "text/event-stream", body = String),
        (status = 503, description = "Hub is shutting down")
    )
)]
pub async fn group_stream(
    State(app_state): State<AppState>,
    Path(group_key): Path<String>,
) -> Result<Sse<impl Stream<Item = core::result::Result<Event, Infallible>>>> {
    debug!("Establishing SSE group stream for {group_key}");

    let listener_id = ListenerId::new();
    let subscription = app_state.hub.subscribe(&group_key, listener_id.clone())?;

    let guard = ListenerGuard {
        hub: Arc::clone(&app_state.hub),
        scope: Scope::Group,
        key: group_key,
        listener_id,
    };

    // Groups receive hub heartbeats, so no transport-level keep-alive is needed.
    Ok(Sse::new(event_stream(subscription, guard)))
}

/// GET a long-lived SSE stream of events sent directly to a user.
#[utoipa::path(
    get,
    path = "/events/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "Id of the user to receive directed events for")
    ),
    responses(
        (status = 200, description = "Event stream opened", content_type = "text/event-stream", body = String),
        (status = 503, description = "Hub is shutting down")
    )
)]
pub async fn user_stream(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response> {
    debug!("Establishing SSE user stream for {user_id}");

    let listener_id = ListenerId::new();
    let subscription = app_state.hub.subscribe_user(&user_id, listener_id.clone())?;

    let hub_config = app_state.hub.config().clone();
    let guard = ListenerGuard {
        hub: Arc::clone(&app_state.hub),
        scope: Scope::User,
        key: user_id,
        listener_id,
    };

    let sse = Sse::new(event_stream(subscription, guard));

    // The hub's heartbeat skips user-only listeners unless configured otherwise,
    // so keep those connections alive with SSE comments on the same period.
    if hub_config.heartbeat_include_users {
        Ok(sse.into_response())
    } else {
        Ok(sse
            .keep_alive(KeepAlive::new().interval(hub_config.heartbeat_interval))
            .into_response())
    }
}

fn event_stream(
    mut subscription: Subscription,
    guard: ListenerGuard,
) -> impl Stream<Item = core::result::Result<Event, Infallible>> {
    stream! {
        let _guard = guard;

        while let Some(event) = subscription.recv().await {
            yield Ok::<Event, Infallible>(
                Event::default()
                    .event(event.event_type())
                    .data(event.data()),
            );
        }
    }
}
