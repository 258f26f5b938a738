//! hushboard/crates/hb-guard/src/lib.rs
//!
//! Abuse mitigation that gates every write before it reaches the content
//! store: sanitizing, attack signatures, rate limiting, the honeypot,
//! structural validation and spam heuristics.

pub mod config;
pub mod guard;
pub mod limiter;
pub mod patterns;
pub mod sanitize;
pub mod spam;
pub mod submission;
pub mod validator;

pub use config::{RateLimitConfig, WindowLimit, MAX_WINDOW_SECS};
pub use guard::{AbuseGuard, RequestContext, Screened};
pub use limiter::{RateClass, RateLimitResult, RateLimiter};
pub use sanitize::{strip_dangerous, Scrub};
pub use spam::SpamSignal;
pub use submission::{CommentSubmission, Honeypot, PostSubmission};
