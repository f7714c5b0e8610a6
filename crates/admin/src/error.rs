//! Unified error handling for admin.
//!
//! Page handlers return `Result<T, AppError>`; row and form actions turn
//! backend failures into toasts or `ActionState` instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use refaccionaria_core::SERVICE_UNAVAILABLE;
use thiserror::Error;

use crate::backend::BackendError;
use crate::middleware::auth::UNAUTHORIZED_PATH;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Backend(err) => err.is_server_error(),
            Self::Internal(_) => true,
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // The cookie decoded as staff but the backend disagrees.
        if matches!(self, Self::Backend(BackendError::Unauthorized(_))) {
            return Redirect::to(UNAUTHORIZED_PATH).into_response();
        }

        let (status, message) = match &self {
            Self::Backend(err) => match err {
                BackendError::NotFound => (StatusCode::NOT_FOUND, "No encontrado".to_string()),
                BackendError::Unavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    SERVICE_UNAVAILABLE.to_string(),
                ),
                BackendError::Validation { .. } => (
                    StatusCode::BAD_REQUEST,
                    err.user_message("Solicitud inválida"),
                ),
                BackendError::Unauthorized(_) => {
                    (StatusCode::UNAUTHORIZED, "No autorizado".to_string())
                }
                BackendError::Http(_) | BackendError::Api { .. } | BackendError::Parse(_) => (
                    StatusCode::BAD_GATEWAY,
                    "Error del servicio externo".to_string(),
                ),
            },
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("No encontrado: {what}")),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Don't expose internal error details to staff either
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error interno del servidor".to_string(),
            ),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status(AppError::NotFound("servicio 9".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AppError::Backend(BackendError::Api {
                status: 502,
                message: None
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(AppError::Backend(BackendError::Unauthorized(None))),
            StatusCode::SEE_OTHER
        );
    }
}
