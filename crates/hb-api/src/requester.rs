//! Caller identity extraction.
//!
//! Every handler takes a `Requester`, so every request is counted against
//! the global rate limit before the handler body runs.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use hb_core::AppError;
use hb_guard::{RateClass, RequestContext};

use crate::error::ApiError;
use crate::handlers::AppState;

/// Used when the peer address is unavailable (e.g. unix sockets, tests).
const UNKNOWN_PEER: &str = "unknown";

#[derive(Debug, Clone)]
pub struct Requester(pub RequestContext);

impl Requester {
    pub fn identity_hash(&self) -> &str {
        &self.0.identity_hash
    }

    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl FromRequest for Requester {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<Requester, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not registered".into()))?;

    let raw_identity = req
        .peer_addr()
        .map(|a| a.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_PEER.to_string());
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let ctx = RequestContext {
        identity_hash: state.hasher.hash_identity(&raw_identity),
        raw_identity,
        user_agent,
        path: req.path().to_string(),
        method: req.method().to_string(),
    };

    state.guard.check_rate(RateClass::Global, &ctx)?;
    Ok(Requester(ctx))
}
