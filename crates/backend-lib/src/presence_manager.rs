// ============================
// crates/backend-lib/src/presence_manager.rs
// ============================
//! Presence actor registry and coordination.
use crate::metrics::PRESENCE_TRACKED;
use crate::presence_actor::{spawn_presence_actor, PresenceHandle};
use crate::storage::PresenceStore;
use dashmap::DashMap;
use metrics::gauge;

pub type ResourceId = String;

/// Registry of live per-resource presence actors
pub struct PresenceManager {
    handles: DashMap<ResourceId, PresenceHandle>,
}

impl PresenceManager {
    /// Create a new presence manager
    pub fn new() -> Self {
        PresenceManager {
            handles: DashMap::new(),
        }
    }

    /// Get the handle for a resource, spawning its actor on first use.
    ///
    /// Spawning an actor does not create a presence record; records are
    /// created by the first successful join (or auto-creating heartbeat).
    pub fn handle<S>(
        &self,
        resource_id: &str,
        store: &S,
        auto_create: bool,
        threshold_ms: i64,
    ) -> PresenceHandle
    where
        S: PresenceStore + Clone + 'static,
    {
        let handle = self
            .handles
            .entry(resource_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(resource_id, "spawning presence actor");
                spawn_presence_actor(resource_id, store.clone(), auto_create, threshold_ms)
            })
            .clone();

        gauge!(PRESENCE_TRACKED).set(self.handles.len() as f64);

        handle
    }

    /// Get an existing handle by resource id
    pub fn get(&self, resource_id: &str) -> Option<PresenceHandle> {
        self.handles.get(resource_id).map(|entry| entry.value().clone())
    }

    /// Get all resource ids with a live actor
    pub fn tracked_resources(&self) -> Vec<String> {
        self.handles.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Default for PresenceManager {
    fn default() -> Self {
        Self::new()
    }
}
