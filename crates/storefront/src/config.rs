//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CURRENCY` - Currency of catalog prices (default: EUR)
//! - `STOREFRONT_CATALOG_CACHE_SECONDS` - Product cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use boutique_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Longest accepted catalog cache TTL (one day).
const MAX_CATALOG_CACHE_SECONDS: u64 = 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Currency every catalog price is expressed in
    pub currency: CurrencyCode,
    /// How long catalog lookups stay cached
    pub catalog_cache_ttl: Duration,
    /// Error tracking
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// DSN; Sentry is disabled when unset
    pub dsn: Option<SecretString>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
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

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&get);

        let database_url = vars
            .optional("STOREFRONT_DATABASE_URL")
            .or_else(|| vars.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;
        let host = vars.parse_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = vars.parse_or("STOREFRONT_PORT", "3000")?;
        let base_url = vars.required("STOREFRONT_BASE_URL")?;
        let base_url = parse_base_url(&base_url)?;
        let currency = vars.parse_or("STOREFRONT_CURRENCY", "EUR")?;
        let catalog_cache_ttl = parse_cache_ttl(&vars)?;

        let sentry = SentryConfig {
            dsn: vars.optional("SENTRY_DSN").map(SecretString::from),
            environment: vars.optional("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate(&vars, "SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_rate(&vars, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            currency,
            catalog_cache_ttl,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.optional(key).unwrap_or_else(|| default.to_string());
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_cache_ttl<F: Fn(&str) -> Option<String>>(
    vars: &Vars<'_, F>,
) -> Result<Duration, ConfigError> {
    const KEY: &str = "STOREFRONT_CATALOG_CACHE_SECONDS";
    let seconds: u64 = vars.parse_or(KEY, "300")?;
    if seconds > MAX_CATALOG_CACHE_SECONDS {
        return Err(ConfigError::InvalidEnvVar(
            KEY.to_string(),
            format!("must be at most {MAX_CATALOG_CACHE_SECONDS} (got {seconds})"),
        ));
    }
    Ok(Duration::from_secs(seconds))
}

fn parse_rate<F: Fn(&str) -> Option<String>>(
    vars: &Vars<'_, F>,
    key: &str,
    default: &str,
) -> Result<f32, ConfigError> {
    let rate: f32 = vars.parse_or(key, default)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_source(|key| vars.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("STOREFRONT_DATABASE_URL", "postgres://localhost/boutique"),
        ("STOREFRONT_BASE_URL", "http://localhost:3000"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.currency, CurrencyCode::EUR);
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert!(config.sentry.dsn.is_none());
        assert!((config.sentry.sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fly/boutique"),
            ("STOREFRONT_BASE_URL", "https://boutique.fr"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/boutique");
        assert!(config.is_secure());
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[("STOREFRONT_BASE_URL", "http://localhost:3000")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "STOREFRONT_DATABASE_URL"));
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[("STOREFRONT_DATABASE_URL", "postgres://localhost/b")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("STOREFRONT_PORT", "http"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_PORT"
        ));
    }

    #[test]
    fn test_invalid_base_url_scheme() {
        let err = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://localhost/b"),
            ("STOREFRONT_BASE_URL", "ftp://boutique.fr"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_currency_and_cache_overrides() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("STOREFRONT_CURRENCY", "usd"));
        pairs.push(("STOREFRONT_CATALOG_CACHE_SECONDS", "30"));
        let config = load(&pairs).unwrap();
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_cache_ttl_out_of_range() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("STOREFRONT_CATALOG_CACHE_SECONDS", "18446744073709551615"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_CATALOG_CACHE_SECONDS"
        ));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("STOREFRONT_CATALOG_CACHE_SECONDS", "86400"));
        assert_eq!(
            load(&pairs).unwrap().catalog_cache_ttl,
            Duration::from_secs(86_400)
        );
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("SENTRY_SAMPLE_RATE", "1.5"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "SENTRY_SAMPLE_RATE"
        ));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let mut pairs = MINIMAL.to_vec();
        pairs[0] = ("STOREFRONT_DATABASE_URL", "postgres://user:hunter2@db/boutique");
        let config = load(&pairs).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
