//! Client for the Refaccionaria REST backend, staff endpoints.
//!
//! Every call carries the staff member's [`AccessToken`]; the backend
//! enforces permissions again on its side. Nothing is cached and nothing is
//! retried.

mod inventario;
mod pedidos;
mod servicios;
mod ventas;

pub use inventario::MovimientosQuery;
pub use servicios::ServicioPatch;
pub use ventas::VentasQuery;

use std::sync::Arc;

use refaccionaria_core::{ActionError, FieldErrors, SERVICE_UNAVAILABLE, drf_message};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

/// Page size the back office tables request.
pub const PAGE_SIZE: u64 = 10;

/// Errors returned by backend calls.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection refused, DNS failure or timeout.
    #[error("Backend unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 400 with per-field messages and/or a general message.
    #[error("Validation failed: {}", .message.as_deref().unwrap_or("field errors"))]
    Validation {
        fields: FieldErrors,
        message: Option<String>,
    },

    /// 401, or 403 for a token without staff permissions.
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("no detail"))]
    Unauthorized(Option<String>),

    #[error("Not found")]
    NotFound,

    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        message: Option<String>,
    },

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

    /// A single message for toasts, which cannot show field errors.
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
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
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

    /// Raw token, for decoding its claims.
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

/// Client for the backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
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
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn request(&self, method: Method, path: &str, token: &AccessToken) -> RequestBuilder {
        self.inner
            .client
            .request(method, self.url(path))
            .header(reqwest::header::AUTHORIZATION, token.bearer())
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
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_forbidden_counts_as_unauthorized() {
        let error = BackendError::from_status(
            StatusCode::FORBIDDEN,
            r#"{"detail":"No tiene permiso para realizar esta acción."}"#,
        );
        assert!(matches!(error, BackendError::Unauthorized(_)));
        assert_eq!(
            error.user_message("x"),
            "No tiene permiso para realizar esta acción."
        );
        assert!(!error.is_server_error());
    }

    #[test]
    fn test_validation_error_prefers_fields() {
        let error = BackendError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"telefono":["Teléfono inválido"]}"#,
        );
        let ActionError::Fields(fields) = error.to_action_error("Error al crear el servicio")
        else {
            panic!("expected field errors");
        };
        assert_eq!(fields.first("telefono"), Some("Teléfono inválido"));
        assert_eq!(error.user_message("x"), "Teléfono inválido");
    }

    #[test]
    fn test_stock_message_is_shown_verbatim() {
        let error = BackendError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"non_field_errors":["Stock insuficiente"]}"#,
        );
        assert_eq!(
            error.to_action_error("Error al registrar la salida"),
            ActionError::from("Stock insuficiente")
        );
    }

    #[test]
    fn test_server_error_uses_default() {
        let error = BackendError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert!(error.is_server_error());
        assert_eq!(
            error.user_message("Error al actualizar el estado"),
            "Error al actualizar el estado"
        );
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = ApiConfig::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();
        let client = BackendClient::new(&config);
        assert_eq!(
            client.url("/servicios/estadisticas/"),
            "http://localhost:8000/api/servicios/estadisticas/"
        );
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOi.staff.firma");
        assert!(!format!("{token:?}").contains("staff"));
        assert_eq!(token.bearer(), "Bearer eyJhbGciOi.staff.firma");
    }
}
