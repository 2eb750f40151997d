//! Real-time event distribution hub.
//!
//! This crate fans server-generated notifications out to long-lived client
//! listeners (typically SSE connections). It is purely in-memory and
//! best-effort: nothing is persisted, nothing is replayed.
//!
//! # Architecture
//!
//! - **Dual-index registry**: listeners are keyed either by a shared group key
//!   (e.g. a circle id, many listeners per key) or by an individual user id for
//!   directed delivery. Both indices sit behind one reader/writer lock owned by
//!   the `Hub`.
//! - **Bounded mailboxes**: each listener has a fixed-capacity queue. Fan-out
//!   uses a non-blocking enqueue; when a mailbox is full the event is dropped
//!   for that listener only. Publishers are never slowed by slow consumers.
//! - **Cooperative cancellation**: each listener carries a cancellation token.
//!   Unsubscribe and close remove the listener from the registry first, then
//!   cancel it, then release its mailbox.
//! - **Heartbeat**: a background task sends a `heartbeat` event to every
//!   populated group on a fixed interval so idle connections stay open.
//!
//! # Delivery model
//!
//! Events are ordered per listener (FIFO). There is no ordering across
//! listeners, and a dropped event is simply never received by that client;
//! there is no error frame and no retry.
//!
//! # Example
//!
//! ```rust,ignore
//! use sse::{Event, Hub, HubConfig, Kind};
//!
//! let hub = Hub::new(HubConfig::default());
//! let mut subscription = hub.subscribe("circle-42", "L1")?;
//!
//! hub.publish(Event::group(
//!     Kind::MemberJoined,
//!     "circle-42",
//!     serde_json::json!({ "userId": "U9" }),
//! ));
//!
//! while let Some(event) = subscription.recv().await {
//!     print!("{}", sse::frame::frame(&event));
//! }
//! hub.unsubscribe("circle-42", subscription.id());
//! ```
//!
//! # Modules
//!
//! - `config`: `HubConfig` (mailbox capacity, heartbeat interval)
//! - `domain_event_handler`: routes `events::DomainEvent`s into the hub
//! - `error`: error kinds for subscribe
//! - `frame`: text framing of delivered events
//! - `hub`: the `Hub` and its fan-out operations
//! - `listener`: `Listener`, `Subscription` and `ListenerId`
//! - `message`: `Event` and `Kind`
//! - `registry`: the dual-index listener registry

pub mod config;
pub mod domain_event_handler;
pub mod error;
pub mod frame;
mod heartbeat;
pub mod hub;
pub mod listener;
pub mod message;
pub mod registry;

pub use config::HubConfig;
pub use domain_event_handler::SseDomainEventHandler;
pub use hub::{Hub, HubStats};
pub use listener::{ListenerId, Subscription};
pub use message::{Event, EventType, Kind};
