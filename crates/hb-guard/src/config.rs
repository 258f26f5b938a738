//! Rate limit configuration.
//!
//! One fixed window per endpoint class. Defaults: 100 requests / 15 min
//! globally, 3 posts / 5 min, 5 comments / min, 10 likes / min.

use serde::{Deserialize, Serialize};

/// Longest accepted window (ten years); larger values are configuration errors.
pub const MAX_WINDOW_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// A request cap over a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimit {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl WindowLimit {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }

    /// Get the window length, capped at `MAX_WINDOW_SECS`
    pub fn window(&self) -> chrono::Duration {
        let secs = self.window_secs.min(MAX_WINDOW_SECS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
    }
}

/// Per-class limits, keyed by hashed requester identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Every request (default: 100 per 15 minutes)
    #[serde(default = "default_global")]
    pub global: WindowLimit,

    /// Post creation (default: 3 per 5 minutes)
    #[serde(default = "default_post")]
    pub post: WindowLimit,

    /// Comment creation (default: 5 per minute)
    #[serde(default = "default_comment")]
    pub comment: WindowLimit,

    /// Likes (default: 10 per minute)
    #[serde(default = "default_like")]
    pub like: WindowLimit,
}

fn default_global() -> WindowLimit {
    WindowLimit::new(100, 15 * 60)
}

fn default_post() -> WindowLimit {
    WindowLimit::new(3, 5 * 60)
}

fn default_comment() -> WindowLimit {
    WindowLimit::new(5, 60)
}

fn default_like() -> WindowLimit {
    WindowLimit::new(10, 60)
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global: default_global(),
            post: default_post(),
            comment: default_comment(),
            like: default_like(),
        }
    }
}
