use serde::Serialize;
use sse::HubStats;
use utoipa::ToSchema;

/// Listener counts across the whole hub.
#[derive(Debug, Serialize, ToSchema)]
pub struct HubStatsResponse {
    /// Groups with at least one listener.
    pub groups: usize,
    /// Users with at least one directed listener.
    pub users: usize,
    /// Total listeners across groups and users.
    pub listeners: usize,
    /// Whether the hub has been shut down.
    pub closed: bool,
}

impl From<HubStats> for HubStatsResponse {
    fn from(stats: HubStats) -> Self {
        Self {
            groups: stats.groups,
            users: stats.users,
            listeners: stats.listeners,
            closed: stats.closed,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupStatsResponse {
    pub group_key: String,
    pub listeners: usize,
}
