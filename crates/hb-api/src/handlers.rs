//! # hb-api Handlers
//!
//! This module coordinates the flow between HTTP requests, the abuse guard
//! and the content store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use actix_web::{web, HttpResponse};
use hb_core::{AppError, Category, ContentStore, IdentityHasher, SortKey};
use hb_guard::{AbuseGuard, CommentSubmission, PostSubmission, RateClass};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::requester::Requester;

pub const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";

const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_TRENDING: usize = 10;
const DEFAULT_SEARCH: usize = 20;
const MAX_RESULTS: usize = 50;

type ApiResult = Result<HttpResponse, ApiError>;

/// State shared across all Actix-web workers.
///
/// Reads take the store's read lock; every mutation, cleanup included,
/// takes the write lock so a like's check-then-increment cannot interleave.
pub struct AppState {
    pub store: RwLock<ContentStore>,
    pub guard: AbuseGuard,
    pub hasher: Box<dyn IdentityHasher>,
}

impl AppState {
    pub fn new(store: ContentStore, guard: AbuseGuard, hasher: Box<dyn IdentityHasher>) -> Self {
        Self {
            store: RwLock::new(store),
            guard,
            hasher,
        }
    }

    pub fn read_store(&self) -> Result<RwLockReadGuard<'_, ContentStore>, AppError> {
        self.store
            .read()
            .map_err(|_| AppError::Internal("content store lock poisoned".into()))
    }

    pub fn write_store(&self) -> Result<RwLockWriteGuard<'_, ContentStore>, AppError> {
        self.store
            .write()
            .map_err(|_| AppError::Internal("content store lock poisoned".into()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct LikeResponse {
    likes: u64,
}

/// Malformed ids cannot name a stored post, so they are reported as missing.
fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("post".into()))
}

pub async fn health(_requester: Requester) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "hushboard",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn categories(_requester: Requester) -> HttpResponse {
    HttpResponse::Ok().json(Category::ALL)
}

pub async fn list_posts(
    data: web::Data<AppState>,
    _requester: Requester,
    query: web::Query<ListQuery>,
) -> ApiResult {
    let query = query.into_inner();
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<Category>().map_err(|e| {
            AppError::ValidationFailed(vec![format!("unknown category '{}'", e.0)])
        })?),
    };
    let sort = query
        .sort
        .as_deref()
        .and_then(|s| s.parse::<SortKey>().ok())
        .unwrap_or_default();

    let page = data.read_store()?.list_posts(
        category,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        sort,
    );
    Ok(HttpResponse::Ok().json(page))
}

/// Screens the submission, then stores it.
pub async fn create_post(
    data: web::Data<AppState>,
    requester: Requester,
    payload: web::Json<PostSubmission>,
) -> ApiResult {
    let screened = data.guard.screen_post(payload.into_inner(), requester.context())?;
    let post = data
        .write_store()?
        .create_post(screened.accepted, requester.identity_hash());

    info!(post_id = %post.id, category = %post.category, "Post created");
    Ok(HttpResponse::Created()
        .insert_header((RATE_LIMIT_REMAINING, screened.remaining.to_string()))
        .json(post))
}

pub async fn get_post(
    data: web::Data<AppState>,
    _requester: Requester,
    path: web::Path<String>,
) -> ApiResult {
    let id = parse_post_id(&path)?;
    let post = data
        .read_store()?
        .get_post(id)
        .ok_or_else(|| AppError::NotFound("post".into()))?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn like_post(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult {
    let id = parse_post_id(&path)?;
    let remaining = data.guard.check_rate(RateClass::Like, requester.context())?;
    let likes = data.write_store()?.like_post(id, requester.identity_hash())?;

    debug!(post_id = %id, likes, "Post liked");
    Ok(HttpResponse::Ok()
        .insert_header((RATE_LIMIT_REMAINING, remaining.to_string()))
        .json(LikeResponse { likes }))
}

pub async fn get_comments(
    data: web::Data<AppState>,
    _requester: Requester,
    path: web::Path<String>,
) -> ApiResult {
    let id = parse_post_id(&path)?;
    Ok(HttpResponse::Ok().json(data.read_store()?.get_comments(id)))
}

pub async fn create_comment(
    data: web::Data<AppState>,
    requester: Requester,
    path: web::Path<String>,
    payload: web::Json<CommentSubmission>,
) -> ApiResult {
    let id = parse_post_id(&path)?;
    let screened = data
        .guard
        .screen_comment(payload.into_inner(), requester.context())?;
    let comment = data
        .write_store()?
        .create_comment(id, screened.accepted, requester.identity_hash())?;

    info!(post_id = %id, comment_id = %comment.id, "Comment created");
    Ok(HttpResponse::Created()
        .insert_header((RATE_LIMIT_REMAINING, screened.remaining.to_string()))
        .json(comment))
}

pub async fn stats(data: web::Data<AppState>, _requester: Requester) -> ApiResult {
    Ok(HttpResponse::Ok().json(data.read_store()?.stats()))
}

pub async fn trending_tags(
    data: web::Data<AppState>,
    _requester: Requester,
    query: web::Query<LimitQuery>,
) -> ApiResult {
    let limit = query.limit.unwrap_or(DEFAULT_TRENDING).min(MAX_RESULTS);
    Ok(HttpResponse::Ok().json(data.read_store()?.trending_tags(limit)))
}

pub async fn search(
    data: web::Data<AppState>,
    _requester: Requester,
    query: web::Query<SearchQuery>,
) -> ApiResult {
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH).min(MAX_RESULTS);
    Ok(HttpResponse::Ok().json(data.read_store()?.search(&query.q, limit)))
}
