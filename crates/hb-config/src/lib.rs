//! hushboard/crates/hb-config/src/lib.rs
//!
//! Startup configuration. Values come from an optional config file, then
//! `HUSHBOARD__`-prefixed environment variables (a `.env` file is honored),
//! with `__` separating nested keys, e.g. `HUSHBOARD__STORE__MAX_POSTS=200`.

use config::{Config, Environment, File};
use hb_core::{StoreConfig, MAX_CLEANUP_INTERVAL_SECS, MAX_RETENTION_SECS};
use hb_guard::{RateLimitConfig, WindowLimit, MAX_WINDOW_SECS};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

/// Salt used when none is configured. Fine for local runs only.
pub const DEFAULT_SALT: &str = "hushboard-development-salt";

const ENV_PREFIX: &str = "HUSHBOARD";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Largest accepted JSON body (default: 10 KiB)
    #[serde(default = "default_json_limit")]
    pub json_limit_bytes: usize,

    /// Single CORS origin to allow; any origin when unset
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            json_limit_bytes: default_json_limit(),
            allowed_origin: None,
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_json_limit() -> usize {
    10 * 1024
}

#[derive(Debug, Deserialize)]
pub struct IdentityConfig {
    /// Secret mixed into every identity hash
    #[serde(default = "default_salt")]
    pub salt: SecretString,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            salt: default_salt(),
        }
    }
}

impl IdentityConfig {
    pub fn uses_default_salt(&self) -> bool {
        self.salt.expose_secret() == DEFAULT_SALT
    }
}

fn default_salt() -> SecretString {
    SecretString::from(DEFAULT_SALT.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Load from `path` (missing file is fine), `.env` and the environment.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_config(builder.build()?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Call once logging is up; loading happens before the subscriber exists.
    pub fn warn_insecure_defaults(&self) {
        if self.identity.uses_default_salt() {
            warn!("identity.salt is not set; using the development default");
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RETENTION_SECS).contains(&self.store.retention_secs) {
            return Err(ConfigError::Invalid(format!(
                "store.retention_secs must be between 1 and {MAX_RETENTION_SECS}"
            )));
        }
        if self.store.max_posts == 0 {
            return Err(ConfigError::Invalid("store.max_posts must be at least 1".into()));
        }
        if !(1..=MAX_CLEANUP_INTERVAL_SECS).contains(&self.store.cleanup_interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "store.cleanup_interval_secs must be between 1 and {MAX_CLEANUP_INTERVAL_SECS}"
            )));
        }
        let limits = [
            ("global", self.rate_limit.global),
            ("post", self.rate_limit.post),
            ("comment", self.rate_limit.comment),
            ("like", self.rate_limit.like),
        ];
        for (name, WindowLimit { max_requests, window_secs }) in limits {
            if max_requests == 0 || !(1..=MAX_WINDOW_SECS).contains(&window_secs) {
                return Err(ConfigError::Invalid(format!(
                    "rate_limit.{name} needs a positive max_requests and a window_secs \
                     between 1 and {MAX_WINDOW_SECS}"
                )));
            }
        }
        Ok(())
    }
}
