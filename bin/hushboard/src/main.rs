//! # Hushboard Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use hb_api::{configure_routes, json_config, middleware, AppState};
use hb_config::{AppConfig, LoggingConfig};
use hb_core::{Clock, ContentStore, IdentityHasher, SystemClock, ThreadRandom};
use hb_guard::AbuseGuard;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "auth-salted")]
use hb_auth_salted::SaltedIdentityHasher;

#[cfg(not(feature = "auth-salted"))]
compile_error!("hushboard needs an identity hasher plugin; enable the `auth-salted` feature");

/// Base name of the optional config file (`hushboard.toml`, `hushboard.json`, ...).
const CONFIG_FILE: &str = "hushboard";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(CONFIG_FILE).context("failed to load configuration")?;
    init_tracing(&config.logging);
    config.warn_insecure_defaults();

    info!(
        bind_addr = %config.server.bind_addr,
        max_posts = config.store.max_posts,
        retention_secs = config.store.retention_secs,
        "Starting hushboard"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Identity hashing plugin
    #[cfg(feature = "auth-salted")]
    let hasher: Box<dyn IdentityHasher> = Box::new(SaltedIdentityHasher::new(config.identity.salt));

    // 2. Store and guard share one clock
    let store =
        ContentStore::with_strategies(config.store.clone(), Box::new(ThreadRandom), clock.clone());
    let guard = AbuseGuard::new(config.rate_limit.clone(), clock);

    let state = web::Data::new(AppState::new(store, guard, hasher));

    spawn_cleanup(state.clone(), config.store.cleanup_interval());

    let server = config.server;
    let json_limit = server.json_limit_bytes;
    let allowed_origin = server.allowed_origin.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config(json_limit))
            .wrap(middleware::security_headers())
            .wrap(middleware::cors_policy(allowed_origin.as_deref()))
            .wrap(middleware::standard_middleware())
            .configure(configure_routes)
    })
    .bind(&server.bind_addr)
    .with_context(|| format!("failed to bind {}", server.bind_addr))?
    .run()
    .await?;

    info!("Hushboard stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

/// Sweeps expired posts on a fixed interval for the life of the server.
fn spawn_cleanup(state: web::Data<AppState>, period: std::time::Duration) {
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match state.write_store() {
                // logs its own outcome
                Ok(mut store) => {
                    store.cleanup();
                }
                Err(e) => warn!(error = %e, "Skipping cleanup cycle"),
            }
        }
    });
}
