//! End-to-end checks of the write gate.
//!
//! Each test drives `AbuseGuard` the way the HTTP layer does, with a
//! manual clock so window arithmetic is exact.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use hb_core::{AppError, Category, ManualClock};
use hb_guard::{
    AbuseGuard, CommentSubmission, PostSubmission, RateClass, RateLimitConfig, RequestContext,
    WindowLimit,
};

fn setup(config: RateLimitConfig) -> (AbuseGuard, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
    (AbuseGuard::new(config, clock.clone()), clock)
}

fn ctx(identity: &str) -> RequestContext {
    RequestContext {
        raw_identity: format!("192.0.2.{}", identity.len()),
        identity_hash: identity.to_string(),
        user_agent: Some("pipeline-test/1.0".into()),
        path: "/api/posts".into(),
        method: "POST".into(),
    }
}

fn good_post() -> PostSubmission {
    PostSubmission {
        title: "Anyone else up late?".into(),
        body: "Can't sleep, thinking about the week ahead.".into(),
        category: "random".into(),
        tags: vec!["insomnia".into()],
        website: None,
    }
}

#[test]
fn test_clean_post_passes_every_stage() {
    let (guard, _) = setup(RateLimitConfig::default());
    let screened = guard.screen_post(good_post(), &ctx("alice")).unwrap();

    assert_eq!(screened.accepted.category, Category::Random);
    assert_eq!(screened.accepted.tags, vec!["insomnia"]);
    assert_eq!(screened.remaining, 2);
}

#[test]
fn test_single_identity_flood() {
    let (guard, clock) = setup(RateLimitConfig::default());
    let ctx = ctx("flooder");

    for _ in 0..3 {
        guard.screen_post(good_post(), &ctx).unwrap();
    }
    clock.advance(Duration::seconds(60));

    let err = guard.screen_post(good_post(), &ctx).unwrap_err();
    assert_eq!(err, AppError::RateLimited { retry_after_secs: 240 });

    // Other classes keep their own budget
    let comment = CommentSubmission {
        body: "still allowed to comment".into(),
        website: None,
    };
    assert!(guard.screen_comment(comment, &ctx).is_ok());
}

#[test]
fn test_distributed_identities_are_independent() {
    let (guard, _) = setup(RateLimitConfig::default());
    for i in 0..20 {
        let ctx = ctx(&format!("visitor-{i}"));
        assert!(guard.screen_post(good_post(), &ctx).is_ok());
    }
    assert_eq!(guard.limiter().tracked(), 20);
}

#[test]
fn test_window_reopens_after_elapsing() {
    let config = RateLimitConfig {
        like: WindowLimit::new(1, 60),
        ..RateLimitConfig::default()
    };
    let (guard, clock) = setup(config);
    let ctx = ctx("liker");

    assert_eq!(guard.check_rate(RateClass::Like, &ctx), Ok(0));
    clock.advance(Duration::seconds(60));
    // still inside the window at exactly its length
    assert_eq!(
        guard.check_rate(RateClass::Like, &ctx),
        Err(AppError::RateLimited { retry_after_secs: 1 })
    );
    clock.advance(Duration::seconds(1));
    assert_eq!(guard.check_rate(RateClass::Like, &ctx), Ok(0));
}

#[test]
fn test_rejections_before_rate_limit_do_not_spend_budget() {
    let (guard, _) = setup(RateLimitConfig::default());
    let ctx = ctx("scanner");

    for _ in 0..10 {
        let mut sub = good_post();
        sub.body = "'; DROP TABLE posts; --".into();
        assert_eq!(guard.screen_post(sub, &ctx).unwrap_err(), AppError::RejectedContent);
    }

    let screened = guard.screen_post(good_post(), &ctx).unwrap();
    assert_eq!(screened.remaining, 2);
}

#[test]
fn test_honeypot_is_stripped_and_trips_rejection() {
    let (guard, _) = setup(RateLimitConfig::default());

    let mut bot = good_post();
    bot.website = Some("http://spam.example".into());
    assert_eq!(
        guard.screen_post(bot, &ctx("bot")).unwrap_err(),
        AppError::RejectedContent
    );

    let mut human = good_post();
    human.website = Some(String::new());
    assert!(guard.screen_post(human, &ctx("human")).is_ok());
}

#[test]
fn test_markup_is_removed_before_validation() {
    let (guard, _) = setup(RateLimitConfig::default());
    let mut sub = good_post();
    sub.title = "<script>alert(1)</script>Hi".into();

    // only "Hi" remains, which is too short
    let err = guard.screen_post(sub, &ctx("alice")).unwrap_err();
    assert_eq!(
        err,
        AppError::ValidationFailed(vec!["title must be at least 3 characters".into()])
    );
}

#[test]
fn test_spam_comment_rejected() {
    let (guard, _) = setup(RateLimitConfig::default());
    let comment = CommentSubmission {
        body: "FREE MONEY FOR EVERYONE WHO REPLIES".into(),
        website: None,
    };
    assert_eq!(
        guard.screen_comment(comment, &ctx("alice")).unwrap_err(),
        AppError::RejectedContent
    );
}
