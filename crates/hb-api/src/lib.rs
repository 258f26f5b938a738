//! # hb-api
//!
//! The web routing layer for hushboard. Everything is JSON under `/api`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod requester;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::web;
use hb_core::AppError;

pub use error::ApiError;
pub use handlers::AppState;
pub use requester::Requester;

/// Configures the routes for the board.
///
/// Mount with `App::configure`; the caller registers `AppState` and
/// `json_config` as app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(query_config())
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/posts", web::get().to(handlers::list_posts))
            .route("/posts", web::post().to(handlers::create_post))
            .route("/posts/{id}", web::get().to(handlers::get_post))
            .route("/posts/{id}/like", web::post().to(handlers::like_post))
            .route("/posts/{id}/comments", web::get().to(handlers::get_comments))
            .route("/posts/{id}/comments", web::post().to(handlers::create_comment))
            .route("/stats", web::get().to(handlers::stats))
            .route("/tags/trending", web::get().to(handlers::trending_tags))
            .route("/search", web::get().to(handlers::search)),
    );
}

/// Caps JSON bodies at `limit_bytes`; undecodable bodies become validation errors.
pub fn json_config(limit_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit_bytes)
        .error_handler(|err, _req| match err {
            JsonPayloadError::Deserialize(e) => {
                ApiError::from(AppError::ValidationFailed(vec![e.to_string()])).into()
            }
            other => other.into(),
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| match err {
        QueryPayloadError::Deserialize(e) => {
            ApiError::from(AppError::ValidationFailed(vec![e.to_string()])).into()
        }
        other => other.into(),
    })
}
