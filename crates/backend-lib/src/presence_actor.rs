// ============================
// crates/backend-lib/src/presence_actor.rs
// ============================
//! Per-resource single-writer task for presence mutations.
//!
//! Concurrent join/heartbeat/leave calls against one resource are a
//! read-modify-write race when applied directly against the store. Routing
//! every mutation for a resource through one actor serializes the cycle, so
//! concurrent calls compose instead of clobbering each other. Mutations of
//! different resources still run in parallel.
use crate::error::AppError;
use crate::metrics::PRESENCE_ACTIVE;
use crate::presence::{apply_intent, PresenceIntent};
use crate::storage::PresenceStore;
use chrono::{DateTime, Utc};
use glorycast_common::PresenceRecord;
use metrics::gauge;
use tokio::sync::mpsc;

/// Message sent *into* the actor
#[derive(Debug)]
pub enum ActorMsg {
    Apply {
        intent: PresenceIntent,
        viewer_id: String,
        now: DateTime<Utc>,
        resp_tx: mpsc::UnboundedSender<Result<u64, AppError>>,
    },
}

/// Handle that other components keep: command channel into the actor
#[derive(Clone)]
pub struct PresenceHandle {
    cmd_tx: mpsc::UnboundedSender<ActorMsg>,
}

impl PresenceHandle {
    /// Apply one viewer intent and return the resulting active count.
    pub async fn apply(
        &self,
        intent: PresenceIntent,
        viewer_id: String,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();

        self.cmd_tx.send(ActorMsg::Apply {
            intent,
            viewer_id,
            now,
            resp_tx,
        })?;

        resp_rx
            .recv()
            .await
            .ok_or_else(|| AppError::Internal("Presence actor dropped the reply".to_string()))?
    }
}

pub struct PresenceActor<S> {
    resource_id: String,
    store: S,
    auto_create: bool,
    threshold_ms: i64,
}

impl<S: PresenceStore> PresenceActor<S> {
    pub fn new(resource_id: String, store: S, auto_create: bool, threshold_ms: i64) -> Self {
        PresenceActor {
            resource_id,
            store,
            auto_create,
            threshold_ms,
        }
    }

    /// One full load → filter → mutate → persist cycle.
    ///
    /// Join always creates a missing record; heartbeat only does so for
    /// auto-creating resources; leave never does.
    async fn handle_apply(
        &self,
        intent: PresenceIntent,
        viewer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let record = match self.store.load_record(&self.resource_id).await? {
            Some(record) => record,
            None if intent == PresenceIntent::Join
                || (intent == PresenceIntent::Heartbeat && self.auto_create) =>
            {
                PresenceRecord::empty(&self.resource_id)
            },
            None => return Err(AppError::ResourceNotFound(self.resource_id.clone())),
        };

        let updated = apply_intent(&record, intent, viewer_id, now, self.threshold_ms);
        self.store.store_record(&updated).await?;

        gauge!(PRESENCE_ACTIVE, "resource" => self.resource_id.clone())
            .set(updated.active_count as f64);

        Ok(updated.active_count)
    }

    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<ActorMsg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                ActorMsg::Apply {
                    intent,
                    viewer_id,
                    now,
                    resp_tx,
                } => {
                    let result = self.handle_apply(intent, &viewer_id, now).await;
                    let _ = resp_tx.send(result);
                },
            }
        }
    }
}

/// Spawn the actor for one resource and return its handle
pub fn spawn_presence_actor<S>(
    resource_id: &str,
    store: S,
    auto_create: bool,
    threshold_ms: i64,
) -> PresenceHandle
where
    S: PresenceStore + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let actor = PresenceActor::new(resource_id.to_string(), store, auto_create, threshold_ms);

    tokio::spawn(actor.run(cmd_rx));

    PresenceHandle { cmd_tx }
}
