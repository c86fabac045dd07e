// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core library for the Glorycast viewer-presence server.

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod presence;
pub mod presence_actor;
pub mod presence_manager;
pub mod routes;
pub mod storage;
pub mod validation;

use crate::config::Settings;
use crate::middleware::rate_limit::RateLimitEntry;
use crate::presence_manager::PresenceManager;
use dashmap::DashMap;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Storage backend for presence documents
    pub store: S,
    /// Settings
    pub settings: Arc<Settings>,
    /// Registry of per-resource presence actors
    pub presence: Arc<PresenceManager>,
    /// Per-client rate limit windows
    pub rate_limits: Arc<DashMap<String, RateLimitEntry>>,
}

impl<S> AppState<S> {
    /// Create a new application state
    pub fn new(store: S, settings: Settings) -> Self {
        AppState {
            store,
            settings: Arc::new(settings),
            presence: Arc::new(PresenceManager::new()),
            rate_limits: Arc::new(DashMap::new()),
        }
    }
}
