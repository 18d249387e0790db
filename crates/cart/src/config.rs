//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `CART_COOKIE_NAME` - Name of the cart GUID cookie (default: `cartwright_cart`)
//! - `CART_COOKIE_MAX_AGE_DAYS` - Cookie lifetime in days (default: 30)
//! - `CART_COOKIE_SECURE` - Only send the cookie over HTTPS (default: false)
//! - `CART_CACHE_TTL_SECONDS` - Idle time before a cached cart is dropped (default: 1200)
//! - `CART_CACHE_MAX_CAPACITY` - Maximum number of cached carts (default: 10000)

use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_COOKIE_NAME: &str = "cartwright_cart";
const DEFAULT_COOKIE_MAX_AGE_DAYS: &str = "30";
const DEFAULT_CACHE_TTL_SECONDS: &str = "1200";
const DEFAULT_CACHE_MAX_CAPACITY: &str = "10000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart resolution configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Client cookie settings
    pub cookie: CookieConfig,
    /// Visitor cart cache settings
    pub cache: CacheConfig,
}

/// Settings for the cart GUID cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie name
    pub name: String,
    /// Lifetime in days
    pub max_age_days: i64,
    /// Whether the cookie carries the `Secure` attribute
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_owned(),
            max_age_days: 30,
            secure: false,
        }
    }
}

/// Settings for the shared visitor cart cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Seconds a cart stays cached without being read
    pub ttl_seconds: u64,
    /// Maximum number of cached carts
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 1200,
            max_capacity: 10_000,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("CART_DATABASE_URL")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("CART_DATABASE_URL".to_string()))?;

        let cookie = CookieConfig {
            name: get("CART_COOKIE_NAME").unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_owned()),
            max_age_days: parse_var(
                "CART_COOKIE_MAX_AGE_DAYS",
                get("CART_COOKIE_MAX_AGE_DAYS"),
                DEFAULT_COOKIE_MAX_AGE_DAYS,
            )?,
            secure: parse_bool("CART_COOKIE_SECURE", get("CART_COOKIE_SECURE"))?,
        };
        if cookie.max_age_days <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_COOKIE_MAX_AGE_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let cache = CacheConfig {
            ttl_seconds: parse_var(
                "CART_CACHE_TTL_SECONDS",
                get("CART_CACHE_TTL_SECONDS"),
                DEFAULT_CACHE_TTL_SECONDS,
            )?,
            max_capacity: parse_var(
                "CART_CACHE_MAX_CAPACITY",
                get("CART_CACHE_MAX_CAPACITY"),
                DEFAULT_CACHE_MAX_CAPACITY,
            )?,
        };

        Ok(Self {
            database_url,
            cookie,
            cache,
        })
    }
}

fn parse_var<T>(key: &str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got {other:?}"),
            )),
        },
    }
}
