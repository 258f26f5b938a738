//! Maps the domain error taxonomy onto HTTP responses.

use std::fmt;

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use hb_core::AppError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self.0 {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DuplicateAction(_) => "DUPLICATE_ACTION",
            AppError::ValidationFailed(_) => "VALIDATION_FAILED",
            AppError::RejectedContent => "REJECTED_CONTENT",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateAction(_)
            | AppError::ValidationFailed(_)
            | AppError::RejectedContent => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        let body = match &self.0 {
            AppError::ValidationFailed(details) => json!({
                "error": "validation failed",
                "code": self.code(),
                "details": details,
            }),
            AppError::RejectedContent => json!({
                "error": "submission rejected",
                "code": self.code(),
            }),
            AppError::RateLimited { retry_after_secs } => {
                builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
                json!({
                    "error": "too many requests, slow down",
                    "code": self.code(),
                    "retryAfter": retry_after_secs,
                })
            }
            AppError::Internal(detail) => {
                error!(%detail, "Internal error while handling request");
                json!({
                    "error": "internal server error",
                    "code": self.code(),
                })
            }
            other => json!({
                "error": other.to_string(),
                "code": self.code(),
            }),
        };
        builder.json(body)
    }
}
