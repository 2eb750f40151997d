use crate::listener::{Listener, ListenerId};
use std::collections::HashMap;

/// Listeners registered under one routing key, keyed by listener id.
pub type Bucket = HashMap<ListenerId, Listener>;

/// Which of the two indices a listener lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Shared routing key, e.g. a circle id. Many listeners per key.
    Group,
    /// Individual recipient id, for directed delivery.
    User,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Group => "group",
            Scope::User => "user",
        }
    }
}

/// Dual-index listener registry.
///
/// This is plain data: the hub owns it behind a single reader/writer lock, so
/// every method here assumes the caller already holds the right guard. A listener
/// id lives in exactly one bucket of one index, and empty buckets are removed as
/// soon as their last listener leaves.
#[derive(Debug, Default)]
pub struct Registry {
    groups: HashMap<String, Bucket>,
    users: HashMap<String, Bucket>,
    closed: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, scope: Scope) -> &HashMap<String, Bucket> {
        match scope {
            Scope::Group => &self.groups,
            Scope::User => &self.users,
        }
    }

    fn index_mut(&mut self, scope: Scope) -> &mut HashMap<String, Bucket> {
        match scope {
            Scope::Group => &mut self.groups,
            Scope::User => &mut self.users,
        }
    }

    /// Register a listener under `key`. If the id is already taken in that bucket
    /// the registry is left unchanged and the listener is handed back.
    pub fn insert(&mut self, scope: Scope, key: &str, listener: Listener) -> Result<(), Listener> {
        let bucket = self.index_mut(scope).entry(key.to_string()).or_default();

        if bucket.contains_key(listener.id()) {
            return Err(listener);
        }

        bucket.insert(listener.id().clone(), listener);
        Ok(())
    }

    /// Remove a listener, pruning its bucket if it was the last one.
    pub fn remove(&mut self, scope: Scope, key: &str, id: &ListenerId) -> Option<Listener> {
        let index = self.index_mut(scope);
        let bucket = index.get_mut(key)?;
        let listener = bucket.remove(id);

        if bucket.is_empty() {
            index.remove(key);
        }

        listener
    }

    pub fn bucket(&self, scope: Scope, key: &str) -> Option<&Bucket> {
        self.index(scope).get(key)
    }

    /// Iterate every populated bucket of one index.
    pub fn buckets(&self, scope: Scope) -> impl Iterator<Item = (&str, &Bucket)> {
        self.index(scope)
            .iter()
            .map(|(key, bucket)| (key.as_str(), bucket))
    }

    /// Number of listeners registered under `key`.
    pub fn listener_count(&self, scope: Scope, key: &str) -> usize {
        self.bucket(scope, key).map_or(0, |bucket| bucket.len())
    }

    /// Number of populated buckets in one index.
    pub fn bucket_count(&self, scope: Scope) -> usize {
        self.index(scope).len()
    }

    pub fn total_listeners(&self) -> usize {
        self.groups
            .values()
            .chain(self.users.values())
            .map(|bucket| bucket.len())
            .sum()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Empty both indices, mark the registry closed and hand back every listener
    /// so the caller can tear them down.
    pub fn drain(&mut self) -> Vec<Listener> {
        self.closed = true;

        self.groups
            .drain()
            .chain(self.users.drain())
            .flat_map(|(_, bucket)| bucket.into_values())
            .collect()
    }
}
