//! Fixed-window rate limiter keyed by hashed requester identity.
//!
//! A window opens with the first request from an identity and stays put
//! until it has fully elapsed; the first request after that opens a fresh
//! window with a count of 1. Windows do not slide. Stale windows are
//! evicted inline at the start of every check.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use hb_core::{AppError, Clock};
use tracing::debug;

use crate::config::{RateLimitConfig, WindowLimit};

/// Endpoint classes with their own budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateClass {
    Global,
    Post,
    Comment,
    Like,
}

impl fmt::Display for RateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Post => write!(f, "post"),
            Self::Comment => write!(f, "comment"),
            Self::Like => write!(f, "like"),
        }
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        class: RateClass,
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }

    /// Remaining budget, or `RateLimited` with whole seconds to wait (at least 1).
    pub fn into_result(self) -> hb_core::Result<u32> {
        match self {
            RateLimitResult::Allowed { remaining, .. } => Ok(remaining),
            RateLimitResult::Limited { retry_after, .. } => Err(AppError::RateLimited {
                retry_after_secs: ceil_secs(retry_after),
            }),
        }
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    secs.max(1)
}

#[derive(Debug)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<(RateClass, String), Window>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn limit_for(&self, class: RateClass) -> WindowLimit {
        match class {
            RateClass::Global => self.config.global,
            RateClass::Post => self.config.post,
            RateClass::Comment => self.config.comment,
            RateClass::Like => self.config.like,
        }
    }

    /// Count a request from `identity` against `class`.
    pub fn check(&self, class: RateClass, identity: &str) -> RateLimitResult {
        let now = self.clock.now();
        self.evict_stale(now);

        let limit = self.limit_for(class);
        let window = limit.window();
        let mut entry = self
            .windows
            .entry((class, identity.to_string()))
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now - entry.started > window {
            entry.started = now;
            entry.count = 0;
        }

        let reset_in = (entry.started + window - now)
            .to_std()
            .unwrap_or(Duration::ZERO);

        if entry.count >= limit.max_requests {
            debug!(%class, identity, ?reset_in, "Rate limit exceeded");
            return RateLimitResult::Limited {
                class,
                retry_after: reset_in,
            };
        }

        entry.count += 1;
        RateLimitResult::Allowed {
            remaining: limit.max_requests - entry.count,
            reset_in,
        }
    }

    /// Drop windows that have fully elapsed; they would reset on next use anyway.
    fn evict_stale(&self, now: DateTime<Utc>) {
        self.windows.retain(|(class, _), w| {
            now - w.started <= self.limit_for(*class).window()
        });
    }

    /// Number of live windows across all classes.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_core::ManualClock;

    fn limiter() -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (RateLimiter::new(RateLimitConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn fourth_post_in_window_is_limited() {
        let (limiter, clock) = limiter();

        for expected_remaining in [2, 1, 0] {
            match limiter.check(RateClass::Post, "id-a") {
                RateLimitResult::Allowed { remaining, .. } => {
                    assert_eq!(remaining, expected_remaining)
                }
                RateLimitResult::Limited { .. } => panic!("Should not be limited"),
            }
            clock.advance(chrono::Duration::seconds(30));
        }

        match limiter.check(RateClass::Post, "id-a") {
            RateLimitResult::Limited { class, retry_after } => {
                assert_eq!(class, RateClass::Post);
                // window opened 90s ago, 5 minute window
                assert_eq!(retry_after, Duration::from_secs(210));
            }
            RateLimitResult::Allowed { .. } => panic!("Should be limited"),
        }
    }

    #[test]
    fn window_resets_only_after_full_elapse() {
        let (limiter, clock) = limiter();
        for _ in 0..3 {
            assert!(limiter.check(RateClass::Post, "id-a").is_allowed());
        }

        clock.advance(chrono::Duration::seconds(299));
        assert!(!limiter.check(RateClass::Post, "id-a").is_allowed());

        clock.advance(chrono::Duration::seconds(2));
        match limiter.check(RateClass::Post, "id-a") {
            RateLimitResult::Allowed { remaining, .. } => assert_eq!(remaining, 2),
            RateLimitResult::Limited { .. } => panic!("Window should have reset"),
        }
    }

    #[test]
    fn classes_and_identities_are_independent() {
        let (limiter, _) = limiter();
        for _ in 0..3 {
            assert!(limiter.check(RateClass::Post, "id-a").is_allowed());
        }
        assert!(!limiter.check(RateClass::Post, "id-a").is_allowed());
        assert!(limiter.check(RateClass::Post, "id-b").is_allowed());
        assert!(limiter.check(RateClass::Comment, "id-a").is_allowed());
        assert!(limiter.check(RateClass::Global, "id-a").is_allowed());
    }

    #[test]
    fn stale_windows_are_evicted_on_check() {
        let (limiter, clock) = limiter();
        limiter.check(RateClass::Like, "id-a");
        limiter.check(RateClass::Global, "id-a");
        assert_eq!(limiter.tracked(), 2);

        // like window is one minute, global is fifteen
        clock.advance(chrono::Duration::seconds(61));
        limiter.check(RateClass::Comment, "id-b");
        assert_eq!(limiter.tracked(), 2);
    }

    #[test]
    fn limited_maps_to_app_error_with_whole_seconds() {
        let result = RateLimitResult::Limited {
            class: RateClass::Like,
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(
            result.into_result(),
            Err(AppError::RateLimited {
                retry_after_secs: 2
            })
        );

        let result = RateLimitResult::Limited {
            class: RateClass::Like,
            retry_after: Duration::ZERO,
        };
        assert_eq!(
            result.into_result(),
            Err(AppError::RateLimited {
                retry_after_secs: 1
            })
        );
    }
}
