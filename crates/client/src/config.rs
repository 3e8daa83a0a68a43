//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (unless running offline)
//! - `FAIRWAY_BACKEND_URL` - Base URL of the backend RPC endpoint
//!
//! ## Optional
//! - `FAIRWAY_IDENTITY_TOKEN` - Bearer token identifying the caller (high entropy)
//! - `FAIRWAY_PRINCIPAL` - The caller's own principal, for chat and RSVP views
//! - `FAIRWAY_CACHE_CAPACITY` - Maximum cached reads (default: 1000)
//! - `FAIRWAY_CACHE_TTL_SECS` - Lifetime of a cached read (default: 300)
//! - `FAIRWAY_MESSAGE_POLL_SECS` - Message thread poll interval (default: 3)
//! - `FAIRWAY_RETRY_BASE_MS` - First retry delay after a failed read (default: 1000)
//! - `FAIRWAY_RETRY_MAX_SECS` - Retry delay cap (default: 60)
//! - `FAIRWAY_CONNECT_TIMEOUT_SECS` - HTTP connect timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use fairway_core::Principal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::cache::RetryPolicy;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Client configuration.
///
/// Implements `Debug` manually to redact the identity token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend base URL; `None` when only offline use is intended
    pub backend_url: Option<Url>,
    /// Bearer token sent with every backend call
    pub identity_token: Option<SecretString>,
    /// The caller's own principal
    pub principal: Option<Principal>,
    pub cache_capacity: u64,
    pub cache_ttl: Duration,
    pub message_poll_interval: Duration,
    pub retry: RetryPolicy,
    pub connect_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backend_url", &self.backend_url.as_ref().map(Url::as_str))
            .field(
                "identity_token",
                &self.identity_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("principal", &self.principal)
            .field("cache_capacity", &self.cache_capacity)
            .field("cache_ttl", &self.cache_ttl)
            .field("message_poll_interval", &self.message_poll_interval)
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            identity_token: None,
            principal: None,
            cache_capacity: 1000,
            cache_ttl: Duration::from_secs(300),
            message_poll_interval: Duration::from_secs(3),
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            sentry_dsn: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or the identity
    /// token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let backend_url = env
            .optional("FAIRWAY_BACKEND_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("FAIRWAY_BACKEND_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let identity_token = env
            .optional("FAIRWAY_IDENTITY_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "FAIRWAY_IDENTITY_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        let principal = env
            .optional("FAIRWAY_PRINCIPAL")
            .map(|raw| {
                Principal::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("FAIRWAY_PRINCIPAL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let retry = RetryPolicy {
            base: Duration::from_millis(env.parsed_or("FAIRWAY_RETRY_BASE_MS", 1000)?),
            max: Duration::from_secs(env.parsed_or("FAIRWAY_RETRY_MAX_SECS", 60)?),
            jitter: true,
        };

        Ok(Self {
            backend_url,
            identity_token,
            principal,
            cache_capacity: env.parsed_or("FAIRWAY_CACHE_CAPACITY", 1000)?,
            cache_ttl: Duration::from_secs(env.parsed_or("FAIRWAY_CACHE_TTL_SECS", 300)?),
            message_poll_interval: Duration::from_secs(
                env.positive_or("FAIRWAY_MESSAGE_POLL_SECS", 3)?,
            ),
            retry,
            connect_timeout: Duration::from_secs(
                env.parsed_or("FAIRWAY_CONNECT_TIMEOUT_SECS", 10)?,
            ),
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }

    /// The backend URL, required for online use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no URL was configured.
    pub fn require_backend_url(&self) -> Result<&Url, ConfigError> {
        self.backend_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FAIRWAY_BACKEND_URL".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating empty as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Like [`parsed_or`](Self::parsed_or), rejecting zero.
    fn positive_or(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.parsed_or(key, default)? {
            0 => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be greater than zero".to_string(),
            )),
            value => Ok(value),
        }
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by your identity provider."
            ),
        ));
    }

    Ok(())
}
