use std::time::Duration;

/// Default number of undelivered events a listener may hold before new ones are dropped.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 100;

/// Default time between heartbeat sweeps.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Tunables for a `Hub`. Tests use the builder methods to shrink capacities and
/// speed up the heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    /// Mailbox slots per listener. Values below 1 are treated as 1.
    pub mailbox_capacity: usize,
    /// Period of the heartbeat sweep. Must be non-zero.
    pub heartbeat_interval: Duration,
    /// Also send heartbeats to user-directed listeners. Off by default, so a
    /// listener that never joins a group receives no keep-alives.
    pub heartbeat_include_users: bool,
}

impl HubConfig {
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_heartbeat_include_users(mut self, include_users: bool) -> Self {
        self.heartbeat_include_users = include_users;
        self
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            heartbeat_include_users: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.mailbox_capacity, 100);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert!(!config.heartbeat_include_users);
    }

    #[test]
    fn test_builders_clamp_degenerate_values() {
        let config = HubConfig::default()
            .with_mailbox_capacity(0)
            .with_heartbeat_interval(Duration::ZERO);

        assert_eq!(config.mailbox_capacity, 1);
        assert_eq!(config.heartbeat_interval, Duration::from_millis(1));
    }
}
