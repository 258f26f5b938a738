//! The write gate.
//!
//! Each write runs sanitize, suspicious-pattern check, rate limit, honeypot,
//! structural validation and spam heuristics, in that order, and stops at
//! the first rejection.

use std::sync::Arc;

use hb_core::{AppError, Clock, NewComment, NewPost, Result};
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::limiter::{RateClass, RateLimiter};
use crate::patterns::find_signature;
use crate::sanitize::Scrub;
use crate::spam::{detect_in, detect_spam};
use crate::submission::{CommentSubmission, Honeypot, PostSubmission};
use crate::validator::{validate_comment, validate_post};

const EXCERPT_CHARS: usize = 100;

/// Where a request came from, as far as the guard needs to know.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Raw network identity; only ever written to the internal log
    pub raw_identity: String,
    pub identity_hash: String,
    pub user_agent: Option<String>,
    pub path: String,
    pub method: String,
}

/// A submission that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct Screened<T> {
    pub accepted: T,
    /// Requests left in the class window
    pub remaining: u32,
}

pub struct AbuseGuard {
    limiter: RateLimiter,
}

impl AbuseGuard {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            limiter: RateLimiter::new(config, clock),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Count a request against `class`, returning the budget left.
    pub fn check_rate(&self, class: RateClass, ctx: &RequestContext) -> Result<u32> {
        self.limiter
            .check(class, &ctx.identity_hash)
            .into_result()
            .inspect_err(|_| {
                debug!(%class, path = %ctx.path, "Request rate limited");
            })
    }

    pub fn screen_post(
        &self,
        submission: PostSubmission,
        ctx: &RequestContext,
    ) -> Result<Screened<NewPost>> {
        let (submission, remaining) = self.prescreen(submission, RateClass::Post, ctx)?;
        let post = validate_post(&submission).map_err(AppError::ValidationFailed)?;

        if let Some(signal) = detect_spam(&post.title, &post.body) {
            self.log_rejection(ctx, &post.body, &signal.to_string(), "Spam content rejected");
            return Err(AppError::RejectedContent);
        }

        Ok(Screened {
            accepted: post,
            remaining,
        })
    }

    pub fn screen_comment(
        &self,
        submission: CommentSubmission,
        ctx: &RequestContext,
    ) -> Result<Screened<NewComment>> {
        let (submission, remaining) = self.prescreen(submission, RateClass::Comment, ctx)?;
        let comment = validate_comment(&submission).map_err(AppError::ValidationFailed)?;

        if let Some(signal) = detect_in(&comment.body) {
            self.log_rejection(ctx, &comment.body, &signal.to_string(), "Spam content rejected");
            return Err(AppError::RejectedContent);
        }

        Ok(Screened {
            accepted: comment,
            remaining,
        })
    }

    /// Stages shared by every write up to and including the honeypot.
    fn prescreen<S>(
        &self,
        mut submission: S,
        class: RateClass,
        ctx: &RequestContext,
    ) -> Result<(S, u32)>
    where
        S: Scrub + Honeypot,
    {
        // Taken before sanitizing so that a trap filled with markup still counts.
        let honeypot = submission.take_honeypot();
        submission.scrub();

        let mut signature = None;
        submission.visit_strs(&mut |field| {
            if signature.is_none() {
                signature = find_signature(field);
            }
        });
        if let Some(signature) = signature {
            self.log_rejection(
                ctx,
                submission.excerpt_source(),
                signature,
                "Suspicious request rejected",
            );
            return Err(AppError::RejectedContent);
        }

        let remaining = self.check_rate(class, ctx)?;

        if honeypot.is_some_and(|value| !value.is_empty()) {
            self.log_rejection(
                ctx,
                submission.excerpt_source(),
                "honeypot",
                "Suspicious request rejected",
            );
            return Err(AppError::RejectedContent);
        }

        Ok((submission, remaining))
    }

    fn log_rejection(&self, ctx: &RequestContext, text: &str, reason: &str, message: &str) {
        let excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
        warn!(
            identity = %ctx.raw_identity,
            user_agent = ctx.user_agent.as_deref().unwrap_or("-"),
            path = %ctx.path,
            method = %ctx.method,
            reason,
            %excerpt,
            "{message}"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use hb_core::ManualClock;

    use super::*;

    fn guard() -> AbuseGuard {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        AbuseGuard::new(RateLimitConfig::default(), clock)
    }

    fn ctx() -> RequestContext {
        RequestContext {
            raw_identity: "10.0.0.1".into(),
            identity_hash: "abc".into(),
            user_agent: Some("test".into()),
            path: "/api/posts".into(),
            method: "POST".into(),
        }
    }

    fn post(title: &str, body: &str) -> PostSubmission {
        PostSubmission {
            title: title.into(),
            body: body.into(),
            category: "general".into(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_sanitized_post() {
        let screened = guard()
            .screen_post(post("Hello <script>x</script>World", "0123456789"), &ctx())
            .unwrap();
        assert_eq!(screened.accepted.title, "Hello World");
        assert_eq!(screened.remaining, 2);
    }

    #[test]
    fn suspicious_input_is_rejected_without_consuming_budget() {
        let guard = guard();
        let err = guard
            .screen_post(post("Hello World", "1 UNION SELECT * FROM users"), &ctx())
            .unwrap_err();
        assert_eq!(err, AppError::RejectedContent);

        let ok = guard.screen_post(post("Hello World", "0123456789"), &ctx()).unwrap();
        assert_eq!(ok.remaining, 2);
    }

    #[test]
    fn honeypot_rejects_even_when_markup_only() {
        let mut sub = post("Hello World", "0123456789");
        sub.website = Some("<script></script>".into());
        assert_eq!(guard().screen_post(sub, &ctx()).unwrap_err(), AppError::RejectedContent);

        let mut sub = post("Hello World", "0123456789");
        sub.website = Some(String::new());
        assert!(guard().screen_post(sub, &ctx()).is_ok());
    }

    #[test]
    fn validation_errors_are_itemized() {
        let err = guard().screen_post(post("Hi", "short"), &ctx()).unwrap_err();
        assert_eq!(
            err,
            AppError::ValidationFailed(vec![
                "title must be at least 3 characters".into(),
                "body must be at least 10 characters".into(),
            ])
        );
    }

    #[test]
    fn spam_is_rejected_generically() {
        let err = guard()
            .screen_post(post("Deal of the day", "buy now while stocks last"), &ctx())
            .unwrap_err();
        assert_eq!(err, AppError::RejectedContent);

        let comment = CommentSubmission {
            body: "!!!!!!!!!!!!!!!!".into(),
            website: None,
        };
        assert_eq!(guard().screen_comment(comment, &ctx()).unwrap_err(), AppError::RejectedContent);
    }
}
