// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
use crate::error::AppError;
use async_trait::async_trait;
use glorycast_common::PresenceRecord;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::fs as tokio_fs;

/// Trait for presence document backends.
///
/// One document per tracked resource; load and store move the full document.
/// Failures propagate to the caller unmodified, no internal retries.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Load the presence document for a resource, `None` if it was never
    /// created
    async fn load_record(&self, resource_id: &str) -> Result<Option<PresenceRecord>, AppError>;

    /// Persist a presence document, replacing any previous version
    async fn store_record(&self, record: &PresenceRecord) -> Result<(), AppError>;
}

/// Flat-file implementation of the `PresenceStore` trait: one JSON document
/// per resource under `<root>/presence/`.
#[derive(Clone)]
pub struct FlatFileStore {
    root: PathBuf,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("presence"))?;
        Ok(Self { root })
    }

    fn record_path(&self, resource_id: &str) -> PathBuf {
        // resource ids are charset-validated before any storage call
        self.root.join("presence").join(format!("{resource_id}.json"))
    }
}

#[async_trait]
impl PresenceStore for FlatFileStore {
    async fn load_record(&self, resource_id: &str) -> Result<Option<PresenceRecord>, AppError> {
        let path = self.record_path(resource_id);

        if !path.exists() {
            return Ok(None);
        }

        let content = tokio_fs::read_to_string(&path).await?;
        let record: PresenceRecord = serde_json::from_str(&content)?;

        Ok(Some(record))
    }

    async fn store_record(&self, record: &PresenceRecord) -> Result<(), AppError> {
        let path = self.record_path(&record.resource_id);

        // ensure directory exists
        tokio_fs::create_dir_all(path.parent().unwrap()).await?;

        let json = serde_json::to_string_pretty(record)?;
        tokio_fs::write(path, json).await?;

        Ok(())
    }
}
