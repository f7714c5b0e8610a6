//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `REFACCIONARIA_API_URL` - Backend REST API origin (falls back to
//!   `NEXT_PUBLIC_BASE_URL_API`)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the back office (default: `http://localhost:3001`)
//! - `STOREFRONT_BASE_URL` - Where staff sign in (default: `http://localhost:3000`)
//! - `APP_ENV` - `development` or `production` (default: production)
//! - `API_TIMEOUT_SECS` - Backend request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.1)
//!
//! The admin holds no secrets of its own: staff authenticate on the
//! storefront and the backend's JWT travels in the shared `access_cookie`.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

const API_URL_VAR: &str = "REFACCIONARIA_API_URL";
const LEGACY_API_URL_VAR: &str = "NEXT_PUBLIC_BASE_URL_API";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    Development,
    #[default]
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected 'development' or 'production', got '{other}'")),
        }
    }

    /// The theme cookie carries `Secure` everywhere except local development.
    #[must_use]
    pub const fn secure_cookies(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back office
    pub base_url: String,
    /// Storefront origin, for the sign-in link on the unauthorized page
    pub storefront_url: String,
    /// Backend REST API configuration
    pub api: ApiConfig,
    pub app_env: AppEnv,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Backend REST API configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Origin every backend path is appended to, without a trailing slash.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Build a config for a backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an http(s) URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = parse_api_url(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar(API_URL_VAR.to_string(), e))?;
        Ok(Self { base_url, timeout })
    }
}

impl AdminConfig {
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

        let host = parse_env_or_default::<IpAddr>("ADMIN_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("ADMIN_PORT", "3001")?;
        let base_url = get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001");
        let storefront_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_owned();

        let api = ApiConfig {
            base_url: get_api_url()?,
            timeout: Duration::from_secs(parse_env_or_default::<u64>("API_TIMEOUT_SECS", "30")?),
        };
        let app_env = AppEnv::parse(&get_env_or_default("APP_ENV", "production"))
            .map_err(|e| ConfigError::InvalidEnvVar("APP_ENV".to_string(), e))?;

        Ok(Self {
            host,
            port,
            base_url,
            storefront_url,
            api,
            app_env,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default::<f32>(
                "SENTRY_TRACES_SAMPLE_RATE",
                "0.1",
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Storefront sign-in page that comes back to `next` afterwards.
    #[must_use]
    pub fn login_url(&self, next: &str) -> String {
        let back = format!("{}{next}", self.base_url.trim_end_matches('/'));
        format!(
            "{}/cuenta/login?next={}",
            self.storefront_url,
            urlencoding::encode(&back)
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the backend origin, preferring `REFACCIONARIA_API_URL` over the
/// `NEXT_PUBLIC_BASE_URL_API` name older deployments still set.
fn get_api_url() -> Result<Url, ConfigError> {
    let (key, raw) = std::env::var(API_URL_VAR)
        .map(|v| (API_URL_VAR, v))
        .or_else(|_| std::env::var(LEGACY_API_URL_VAR).map(|v| (LEGACY_API_URL_VAR, v)))
        .map_err(|_| ConfigError::MissingEnvVar(API_URL_VAR.to_string()))?;
    parse_api_url(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim().trim_end_matches('/')).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(url)
}

/// Parse an environment variable with a default value.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an optional environment variable, treating blank as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
