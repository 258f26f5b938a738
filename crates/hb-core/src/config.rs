//! Store tuning knobs, supplied at startup.

use serde::{Deserialize, Serialize};

/// Longest accepted retention (ten years).
pub const MAX_RETENTION_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Longest accepted sweep interval (one year).
pub const MAX_CLEANUP_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Retention and capacity limits for the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a post stays readable, in seconds (default: 7 days)
    #[serde(default = "default_retention_secs")]
    pub retention_secs: i64,

    /// Maximum number of stored posts; oldest are evicted first (default: 500)
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,

    /// Interval of the background expiry sweep, in seconds (default: hourly)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_retention_secs() -> i64 {
    7 * 24 * 60 * 60
}

fn default_max_posts() -> usize {
    500
}

fn default_cleanup_interval_secs() -> u64 {
    60 * 60
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            max_posts: default_max_posts(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl StoreConfig {
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.retention_secs.clamp(0, MAX_RETENTION_SECS))
    }

    pub fn cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cleanup_interval_secs.min(MAX_CLEANUP_INTERVAL_SECS))
    }
}
