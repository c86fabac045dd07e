// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const PRESENCE_JOIN: &str = "presence.join";
pub const PRESENCE_HEARTBEAT: &str = "presence.heartbeat";
pub const PRESENCE_LEAVE: &str = "presence.leave";
pub const PRESENCE_COUNT_READ: &str = "presence.count_read";
pub const PRESENCE_ACTIVE: &str = "presence.active";
pub const PRESENCE_TRACKED: &str = "presence.tracked_resources";
