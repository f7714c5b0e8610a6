//! Newsletter subscription route handler.
//!
//! The footer form posts here via HTMX and is replaced by the returned
//! fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use refaccionaria_core::ActionState;
use refaccionaria_core::validation::PasswordResetRequestForm;
use serde::Deserialize;
use tracing::instrument;

use crate::backend::BackendError;
use crate::respond::{backend_failure, negotiate};
use crate::state::AppState;

/// Newsletter subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    #[serde(default)]
    pub email: String,
}

/// Result fragment (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/newsletter.html")]
pub struct NewsletterTemplate {
    pub state: ActionState<()>,
    pub email: String,
}

/// Subscribe to the newsletter.
///
/// An address that is already subscribed is reported as success.
#[instrument(skip(state, headers, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SubscribeForm>,
) -> Response {
    // Same email rules as the reset request: trimmed and lower-cased.
    let check = PasswordResetRequestForm {
        email: form.email.clone(),
    };
    let outcome = match check.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(email) => match state.backend().suscribir_newsletter(&email).await {
            Ok(()) => {
                tracing::info!("Newsletter subscription successful");
                ActionState::done()
            }
            Err(e) if already_subscribed(&e) => ActionState::done(),
            Err(e) => backend_failure(&e, "Error al suscribirse. Intente de nuevo."),
        },
    };

    negotiate(&headers, outcome, |state| {
        NewsletterTemplate {
            email: if state.success { String::new() } else { form.email.clone() },
            state,
        }
        .into_response()
    })
}

/// The backend rejects duplicates with a field error on `email`.
fn already_subscribed(error: &BackendError) -> bool {
    match error {
        BackendError::Validation { fields, .. } => fields
            .get("email")
            .iter()
            .any(|m| m.contains("existe") || m.contains("already")),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use refaccionaria_core::FieldErrors;

    use super::*;

    #[test]
    fn test_duplicate_counts_as_subscribed() {
        let duplicate = BackendError::Validation {
            fields: FieldErrors::new().with("email", "newsletter with this email already exists."),
            message: None,
        };
        assert!(already_subscribed(&duplicate));

        let other = BackendError::Validation {
            fields: FieldErrors::new().with("email", "Introduzca un correo válido."),
            message: None,
        };
        assert!(!already_subscribed(&other));
        assert!(!already_subscribed(&BackendError::NotFound));
    }
}
