// ================
// crates/common/src/lib.rs
// ================
//! Common types shared between the Glorycast viewer clients and the
//! presence server: HTTP request/response bodies and the persisted
//! presence document shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of every mutating presence call (join, heartbeat, leave).
///
/// Field names are camelCase on the wire; the viewer id is generated and
/// persisted client-side and opaque to the server.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRequest {
    /// Identifier of the tracked resource (a stream id, or a configured
    /// site-wide id)
    pub resource_id: String,
    /// Opaque identifier of one viewing session
    pub viewer_id: String,
}

/// Response to every presence call: the active-viewer count after the
/// operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub active_count: u64,
}

/// Presence document stored on the server, one per tracked resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    /// Identifier of the tracked resource
    pub resource_id: String,
    /// Viewer id -> last-seen timestamp
    pub viewers: HashMap<String, DateTime<Utc>>,
    /// Number of entries in `viewers` as of the last mutation. Cached, not
    /// re-filtered at read time.
    pub active_count: u64,
}

impl PresenceRecord {
    /// Fresh record with no viewers, created lazily on first join.
    pub fn empty(resource_id: impl Into<String>) -> Self {
        PresenceRecord {
            resource_id: resource_id.into(),
            viewers: HashMap::new(),
            active_count: 0,
        }
    }
}
