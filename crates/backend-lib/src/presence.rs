// ============================
// crates/backend-lib/src/presence.rs
// ============================
//! Presence record mutation: staleness filtering and viewer intents.
use chrono::{DateTime, Duration, Utc};
use glorycast_common::PresenceRecord;
use std::collections::HashMap;

/// Default staleness threshold in milliseconds. A viewer whose last
/// heartbeat is at least this old is no longer counted as active.
pub const DEFAULT_STALENESS_THRESHOLD_MS: i64 = 30_000;

/// One viewer intent against a resource's presence record.
///
/// Join and heartbeat are behaviorally identical; the distinction is caller
/// intent (join may create a record, heartbeat usually may not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceIntent {
    Join,
    Heartbeat,
    Leave,
}

/// Subset of `viewers` still considered active at `now`.
///
/// Survivor rule is strict less-than: an entry exactly `threshold_ms` old
/// is stale.
pub fn filter_active(
    viewers: &HashMap<String, DateTime<Utc>>,
    now: DateTime<Utc>,
    threshold_ms: i64,
) -> HashMap<String, DateTime<Utc>> {
    let threshold = Duration::milliseconds(threshold_ms);
    viewers
        .iter()
        .filter(|(_, last_seen)| now.signed_duration_since(**last_seen) < threshold)
        .map(|(viewer_id, last_seen)| (viewer_id.clone(), *last_seen))
        .collect()
}

/// Apply one intent to a record, producing the successor record.
///
/// Every intent re-applies the staleness filter before mutating, so any
/// call incidentally prunes everyone's stale entries and the record
/// self-heals without a background sweeper. Join and heartbeat
/// insert-or-refresh after filtering, which means a viewer's own stale
/// entry still survives its own heartbeat. Leave removes unconditionally;
/// removing an absent viewer is a no-op. `active_count` is recomputed from
/// the surviving set on every call.
pub fn apply_intent(
    record: &PresenceRecord,
    intent: PresenceIntent,
    viewer_id: &str,
    now: DateTime<Utc>,
    threshold_ms: i64,
) -> PresenceRecord {
    let mut viewers = filter_active(&record.viewers, now, threshold_ms);

    match intent {
        PresenceIntent::Join | PresenceIntent::Heartbeat => {
            viewers.insert(viewer_id.to_string(), now);
        },
        PresenceIntent::Leave => {
            viewers.remove(viewer_id);
        },
    }

    let active_count = viewers.len() as u64;
    PresenceRecord {
        resource_id: record.resource_id.clone(),
        viewers,
        active_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: i64 = DEFAULT_STALENESS_THRESHOLD_MS;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn empty() -> PresenceRecord {
        PresenceRecord::empty("s1")
    }

    #[test]
    fn filter_of_empty_map_is_empty() {
        let viewers = HashMap::new();
        assert!(filter_active(&viewers, at(0), THRESHOLD).is_empty());
    }

    #[test]
    fn join_counts_up_per_viewer() {
        let r1 = apply_intent(&empty(), PresenceIntent::Join, "v1", at(0), THRESHOLD);
        assert_eq!(r1.active_count, 1);

        let r2 = apply_intent(&r1, PresenceIntent::Join, "v2", at(1_000), THRESHOLD);
        assert_eq!(r2.active_count, 2);
        assert!(r2.viewers.contains_key("v1"));
        assert!(r2.viewers.contains_key("v2"));
    }

    #[test]
    fn repeated_join_does_not_duplicate() {
        // re-adding a viewer refreshes its timestamp, never duplicates
        let r1 = apply_intent(&empty(), PresenceIntent::Join, "v1", at(0), THRESHOLD);
        let r2 = apply_intent(&r1, PresenceIntent::Join, "v1", at(1), THRESHOLD);

        assert_eq!(r2.active_count, 1);
        assert_eq!(r2.viewers["v1"], at(1));
    }

    #[test]
    fn leave_of_absent_viewer_is_a_noop() {
        let r1 = apply_intent(&empty(), PresenceIntent::Join, "v1", at(0), THRESHOLD);
        let r2 = apply_intent(&r1, PresenceIntent::Leave, "ghost", at(10), THRESHOLD);

        assert_eq!(r2.active_count, 1);
        assert!(r2.viewers.contains_key("v1"));
    }

    #[test]
    fn stale_viewer_is_pruned_by_any_intent() {
        // an entry threshold + 1ms old is excluded from the survivor set
        let r1 = apply_intent(&empty(), PresenceIntent::Join, "v1", at(0), THRESHOLD);
        let now = at(THRESHOLD + 1);

        let after_join = apply_intent(&r1, PresenceIntent::Join, "v2", now, THRESHOLD);
        assert!(!after_join.viewers.contains_key("v1"));
        assert_eq!(after_join.active_count, 1);

        let after_leave = apply_intent(&r1, PresenceIntent::Leave, "v2", now, THRESHOLD);
        assert!(!after_leave.viewers.contains_key("v1"));
        assert_eq!(after_leave.active_count, 0);
    }

    #[test]
    fn exactly_at_threshold_is_stale() {
        // strict less-than boundary
        let mut viewers = HashMap::new();
        viewers.insert("v1".to_string(), at(0));

        let survivors = filter_active(&viewers, at(THRESHOLD), THRESHOLD);
        assert!(survivors.is_empty());

        let survivors = filter_active(&viewers, at(THRESHOLD - 1), THRESHOLD);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn active_count_tracks_viewer_set_size() {
        let mut record = empty();
        for (viewer, now) in [("v1", 0), ("v2", 5), ("v3", 10)] {
            record = apply_intent(&record, PresenceIntent::Join, viewer, at(now), THRESHOLD);
            assert_eq!(record.active_count, record.viewers.len() as u64);
        }
        record = apply_intent(&record, PresenceIntent::Leave, "v2", at(20), THRESHOLD);
        assert_eq!(record.active_count, record.viewers.len() as u64);
        assert_eq!(record.active_count, 2);
    }

    #[test]
    fn heartbeat_refreshes_own_entry_before_counting() {
        // filter-then-insert prevents self-eviction
        let r1 = apply_intent(&empty(), PresenceIntent::Join, "v1", at(0), THRESHOLD);

        let r2 = apply_intent(&r1, PresenceIntent::Heartbeat, "v1", at(29_000), THRESHOLD);
        assert_eq!(r2.active_count, 1);

        // Next heartbeat lands well past v1's own staleness window, but the
        // heartbeat itself refreshes v1 after filtering.
        let r3 = apply_intent(&r2, PresenceIntent::Heartbeat, "v1", at(61_000), THRESHOLD);
        assert_eq!(r3.active_count, 1);
        assert_eq!(r3.viewers["v1"], at(61_000));
    }

    #[test]
    fn join_then_leave_empties_the_record() {
        let r1 = apply_intent(&empty(), PresenceIntent::Join, "v1", at(0), THRESHOLD);
        let r2 = apply_intent(&r1, PresenceIntent::Leave, "v1", at(500), THRESHOLD);

        assert_eq!(r2.active_count, 0);
        assert!(r2.viewers.is_empty());
    }
}
