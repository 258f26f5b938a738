//! hushboard/crates/hb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for hushboard:
//! models, the error taxonomy, pluggable ports and the content store.

pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod traits;

// Re-exporting for easier access in other crates
pub use config::{StoreConfig, MAX_CLEANUP_INTERVAL_SECS, MAX_RETENTION_SECS};
pub use error::*;
pub use models::*;
pub use store::ContentStore;
pub use traits::*;
