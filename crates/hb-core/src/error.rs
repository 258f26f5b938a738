//! # AppError
//!
//! Centralized error handling for hushboard.
//! Every variant is recoverable at the boundary; none should end the process.

use thiserror::Error;

/// The primary error type for store and guard operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Referenced post is absent or expired
    #[error("{0} not found")]
    NotFound(String),

    /// The requester already performed this action (e.g. liked the post)
    #[error("{0}")]
    DuplicateAction(String),

    /// One or more field constraints were violated
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// Spam, attack signature or honeypot hit. Details go to the log only.
    #[error("content rejected")]
    RejectedContent,

    /// Rate limit exceeded
    #[error("too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Defect at the boundary (e.g. missing application state)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for hushboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
