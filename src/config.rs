//! Board configuration loaded from environment variables.
//!
//! - `HUB_ANNOUNCEMENTS_URL` - Hub base URL (default: `http://localhost:8000`)
//! - `JUPYTERHUB_API_TOKEN` - API token for the service (optional)
//! - `HUB_ANNOUNCEMENTS_INTERVAL_SECS` - Poll interval (default: 5 hours)
//! - `HUB_ANNOUNCEMENTS_STORE` - Path of the dismissal store file

use std::path::PathBuf;
use std::time::Duration;

use announcements_core::{FileStore, StoreError};

const DEFAULT_URL: &str = "http://localhost:8000";

/// Poll interval: 3600 * 5 * 1000 ms.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3600 * 5 * 1000);

#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Base URL of the hub, without the service prefix.
    pub hub_url: String,
    pub api_token: Option<String>,
    pub poll_interval: Duration,
    /// Dismissal store file. `None` uses the platform data directory.
    pub store_path: Option<PathBuf>,
    /// Maximum number of records to request per list call.
    pub limit: Option<u32>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_URL.to_string(),
            api_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            store_path: None,
            limit: None,
        }
    }
}

impl BoardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let hub_url = std::env::var("HUB_ANNOUNCEMENTS_URL").unwrap_or(defaults.hub_url);
        let api_token = std::env::var("JUPYTERHUB_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let poll_interval = std::env::var("HUB_ANNOUNCEMENTS_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);
        let store_path = std::env::var("HUB_ANNOUNCEMENTS_STORE").ok().map(PathBuf::from);

        Self {
            hub_url,
            api_token,
            poll_interval,
            store_path,
            limit: None,
        }
    }

    /// Open the configured dismissal store.
    pub fn open_store(&self) -> Result<FileStore, StoreError> {
        match &self.store_path {
            Some(path) => Ok(FileStore::open(path)),
            None => FileStore::open_default(),
        }
    }
}
