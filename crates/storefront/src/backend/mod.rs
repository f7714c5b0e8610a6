//! Client for the Refaccionaria REST backend.
//!
//! # Architecture
//!
//! - The backend owns users, catalog, orders and stock; this crate only
//!   calls it over HTTP with `reqwest`
//! - Signed-in calls send `Authorization: Bearer <access>` taken from the
//!   request's [`AccessToken`], never from shared state
//! - Categories and featured parts are cached for 5 minutes and blog posts
//!   for 60 seconds using `moka`
//! - Nothing is retried; every failure surfaces as a [`BackendError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use refaccionaria_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.api);
//! let categorias = client.categorias().await?;
//! let direcciones = client.direcciones(&token).await?;
//! ```

mod cache;
mod catalogo;
mod contenido;
mod cuenta;
mod pedidos;

pub use catalogo::RefaccionesQuery;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use refaccionaria_core::{ActionError, FieldErrors, SERVICE_UNAVAILABLE, drf_message};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// Errors returned by backend calls.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection refused, DNS failure or timeout.
    #[error("Backend unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),

    /// Any other transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 400 with per-field messages and/or a general message.
    #[error("Validation failed: {}", .message.as_deref().unwrap_or("field errors"))]
    Validation {
        fields: FieldErrors,
        message: Option<String>,
    },

    /// 401: missing, expired or wrong credentials.
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("no detail"))]
    Unauthorized(Option<String>),

    /// 404.
    #[error("Not found")]
    NotFound,

    /// Any other non-success status.
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// The body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// Translate into what the form shows, falling back to `default` when the
    /// backend gave no usable message.
    #[must_use]
    pub fn to_action_error(&self, default: &str) -> ActionError {
        match self {
            Self::Unavailable(_) => ActionError::from(SERVICE_UNAVAILABLE),
            Self::Validation { fields, message } => {
                if fields.is_empty() {
                    ActionError::from(message.as_deref().unwrap_or(default))
                } else {
                    ActionError::Fields(fields.clone())
                }
            }
            Self::Unauthorized(message) | Self::Api { message, .. } => {
                ActionError::from(message.as_deref().unwrap_or(default))
            }
            Self::NotFound | Self::Http(_) | Self::Parse(_) => ActionError::from(default),
        }
    }

    /// A single message for banners that cannot show field errors.
    #[must_use]
    pub fn user_message(&self, default: &str) -> String {
        match self.to_action_error(default) {
            ActionError::Message(message) => message,
            ActionError::Fields(fields) => fields
                .iter()
                .find_map(|(_, messages)| messages.first().cloned())
                .unwrap_or_else(|| default.to_owned()),
        }
    }

    /// Whether the failure is on our side of the wire rather than the user's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Http(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Validation { .. } | Self::Unauthorized(_) | Self::NotFound => false,
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::Unavailable(error)
        } else {
            Self::Http(error)
        }
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        let json = serde_json::from_str::<serde_json::Value>(body).unwrap_or_default();
        let message = drf_message(&json);
        match status {
            StatusCode::BAD_REQUEST => Self::Validation {
                fields: FieldErrors::from_drf(&json).unwrap_or_default(),
                message,
            },
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound,
            _ => Self::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// The `access_cookie` JWT of the current request.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }

    /// Raw token, for handlers that decode its claims.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    catalog_cache: Cache<CacheKey, CacheValue>,
    blog_cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let catalog_cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        let blog_cache = Cache::builder()
            .max_capacity(200)
            .time_to_live(Duration::from_secs(60))
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });

        Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
                catalog_cache,
                blog_cache,
            }),
        }
    }

    /// Absolute URL for a backend path such as `/user/login/`.
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn request(&self, method: Method, path: &str, token: Option<&AccessToken>) -> RequestBuilder {
        let builder = self.inner.client.request(method, self.url(path));
        match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.bearer()),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await.map_err(BackendError::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(BackendError::from_transport)?;

        if !status.is_success() {
            let error = BackendError::from_status(status, &body);
            if error.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned non-success status"
                );
            } else {
                tracing::debug!(status = %status, "Backend rejected request");
            }
            return Err(error);
        }

        Ok(body)
    }

    /// Send a request and parse the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Send a request whose body is ignored (204, or an acknowledgement).
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), BackendError> {
        self.execute(request).await.map(drop)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_prefers_fields() {
        let error = BackendError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"postal_code":["Código inválido"],"non_field_errors":["Revisa el formulario"]}"#,
        );
        let ActionError::Fields(fields) = error.to_action_error("Error al crear la dirección")
        else {
            panic!("expected field errors");
        };
        assert_eq!(fields.first("postal_code"), Some("Código inválido"));
        assert_eq!(error.user_message("x"), "Código inválido");
    }

    #[test]
    fn test_validation_without_fields_uses_message() {
        let error = BackendError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"non_field_errors":["Stock insuficiente"]}"#,
        );
        assert_eq!(
            error.to_action_error("Error"),
            ActionError::from("Stock insuficiente")
        );
    }

    #[test]
    fn test_unauthorized_uses_detail_or_default() {
        let error = BackendError::from_status(StatusCode::UNAUTHORIZED, "not json");
        assert_eq!(
            error.to_action_error("Correo o contraseña incorrectos"),
            ActionError::from("Correo o contraseña incorrectos")
        );
        let error = BackendError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Token expirado"}"#,
        );
        assert_eq!(error.user_message("x"), "Token expirado");
    }

    #[test]
    fn test_server_errors() {
        let error = BackendError::from_status(StatusCode::BAD_GATEWAY, "");
        assert!(error.is_server_error());
        assert_eq!(
            error.to_action_error("Error al crear el pedido"),
            ActionError::from("Error al crear el pedido")
        );
        assert!(!BackendError::from_status(StatusCode::NOT_FOUND, "").is_server_error());
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = ApiConfig::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();
        let client = BackendClient::new(&config);
        assert_eq!(client.url("/user/login/"), "http://localhost:8000/api/user/login/");
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOi.secreto.firma");
        assert!(!format!("{token:?}").contains("secreto"));
        assert_eq!(token.bearer(), "Bearer eyJhbGciOi.secreto.firma");
    }
}
