// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use crate::presence::DEFAULT_STALENESS_THRESHOLD_MS;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Presence tracking settings
    pub presence: PresenceSettings,
    /// Rate limit settings
    pub rate_limit: RateLimitSettings,
}

/// Presence tracking settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresenceSettings {
    /// Staleness threshold in milliseconds; a viewer whose last heartbeat
    /// is at least this old is no longer counted
    pub staleness_threshold_ms: i64,
    /// Resource ids whose record may be auto-created by a heartbeat (the
    /// site-wide pseudo-resources); all other resources require a join first
    pub auto_create_resources: Vec<String>,
}

/// Rate limit settings for the mutation endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Maximum requests per window per client
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            presence: PresenceSettings::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            staleness_threshold_ms: DEFAULT_STALENESS_THRESHOLD_MS,
            auto_create_resources: vec!["site".to_string()],
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            // heartbeats arrive every 10s; leave plenty of headroom for
            // several concurrent tabs behind one ip
            max_requests: 120,
            window_secs: 60,
        }
    }
}

impl Settings {
    /// Load settings from config files and environment variables
    pub fn load() -> Result<Self> {
        let settings = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Yaml::file("config.yaml"))
            .merge(Json::file("config.json"))
            .merge(Env::prefixed("GLORYCAST_"))
            .extract()?;

        Ok(settings)
    }

    /// Load settings from an explicit TOML file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("GLORYCAST_"))
            .extract()?;

        Ok(settings)
    }
}
