//! Periodic keep-alive sweep.
//!
//! The task holds only a weak reference to the hub so it never keeps a dropped
//! hub alive, and it exits as soon as the hub's shutdown token fires.

use crate::hub::Hub;
use chrono::Utc;
use log::*;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub(crate) fn spawn(hub: Weak<Hub>, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        // First sweep one full period after start, not immediately.
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Heartbeat task started with a {period:?} interval");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(hub) = hub.upgrade() else {
                        debug!("Heartbeat task found no live hub, exiting");
                        break;
                    };
                    let delivered = hub.sweep_heartbeat(Utc::now());
                    trace!("Heartbeat delivered to {delivered} listener(s)");
                }
            }
        }

        debug!("Heartbeat task stopped");
    })
}
