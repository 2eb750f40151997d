pub(crate) mod hub_stats;
