//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory for the file store (default: platform data dir)
//! - `CART_STORAGE_NAMESPACE` - Storage key namespace (default: `@GoMarketPlace`)
//! - `CART_CURRENCY` - ISO 4217 code used to format totals (default: BRL)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use go_marketplace_core::CurrencyCode;
use thiserror::Error;

/// Default storage key namespace.
pub const DEFAULT_NAMESPACE: &str = "@GoMarketPlace";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory holding the file-backed store
    pub storage_dir: PathBuf,
    /// Namespace prefix for storage keys
    pub namespace: String,
    /// Currency used to format totals
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            currency: CurrencyCode::default(),
            sentry_dsn: None,
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
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = lookup("CART_STORAGE_DIR").map_or_else(default_storage_dir, PathBuf::from);

        let namespace = lookup("CART_STORAGE_NAMESPACE")
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        if namespace.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_NAMESPACE".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let currency = match lookup("CART_CURRENCY") {
            Some(value) => value.parse::<CurrencyCode>().map_err(|e| {
                ConfigError::InvalidEnvVar("CART_CURRENCY".to_string(), e.to_string())
            })?,
            None => CurrencyCode::default(),
        };

        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(Self {
            storage_dir,
            namespace,
            currency,
            sentry_dsn,
        })
    }

    /// The storage key holding the serialized cart, e.g. `@GoMarketPlace:products`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}:products", self.namespace)
    }
}

/// Returns the default storage directory.
///
/// - macOS: `~/Library/Application Support/go-marketplace`
/// - Linux: `~/.local/share/go-marketplace`
/// - Windows: `%LOCALAPPDATA%\go-marketplace`
#[must_use]
pub fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .map_or_else(|| PathBuf::from("."), |dir| dir.join("go-marketplace"))
}
