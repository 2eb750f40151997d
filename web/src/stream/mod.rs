//! SSE HTTP handlers for the web layer.
//!
//! This module contains only the Axum handlers that turn a hub `Subscription`
//! into an SSE response. The hub itself (registry, fan-out, heartbeat) lives
//! in the `sse` crate.

pub mod handler;
