//! Contact page.
//!
//! Messages are validated and written to the log for the shop staff; there
//! is no backend endpoint for them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use refaccionaria_core::ActionState;
use refaccionaria_core::validation::{ContactoForm, Prioridad};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::respond::negotiate;
use crate::views::Layout;

/// Option in the priority select.
#[derive(Clone)]
pub struct PrioridadOption {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn prioridades(selected: Option<&str>) -> Vec<PrioridadOption> {
    let selected = selected.unwrap_or(Prioridad::default().code());
    Prioridad::ALL
        .iter()
        .map(|p| PrioridadOption {
            code: p.code(),
            label: p.label(),
            selected: p.code() == selected,
        })
        .collect()
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contacto.html")]
pub struct ContactoTemplate {
    pub layout: Layout,
    pub form: ContactoForm,
    pub prioridades: Vec<PrioridadOption>,
    pub state: ActionState<()>,
}

/// Display the contact form.
#[instrument(skip(session, auth))]
pub async fn show(session: Session, OptionalAuth(auth): OptionalAuth) -> impl IntoResponse {
    ContactoTemplate {
        layout: Layout::load(&session, &auth).await,
        form: ContactoForm::default(),
        prioridades: prioridades(None),
        state: ActionState::idle(),
    }
}

/// Send a message.
///
/// On success the page shows the confirmation instead of the form.
#[instrument(skip(session, auth, headers, form))]
pub async fn send(
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<ContactoForm>,
) -> Response {
    let outcome = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(mensaje) => {
            tracing::info!(
                email = %mensaje.email,
                prioridad = mensaje.prioridad.code(),
                asunto = %mensaje.asunto,
                mensaje = %mensaje.mensaje,
                "Contact message received"
            );
            add_breadcrumb(
                "contacto",
                "Contact message sent",
                Some(&[("prioridad", mensaje.prioridad.code())]),
            );
            ActionState::done()
        }
    };

    let layout = Layout::load(&session, &auth).await;
    negotiate(&headers, outcome, |state| {
        let form = if state.success { ContactoForm::default() } else { form };
        ContactoTemplate {
            layout,
            prioridades: prioridades(form.priority.as_deref()),
            form,
            state,
        }
        .into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prioridades_default_to_normal() {
        let opciones = prioridades(None);
        let seleccionadas: Vec<_> = opciones.iter().filter(|o| o.selected).map(|o| o.code).collect();
        assert_eq!(seleccionadas, ["normal"]);

        let opciones = prioridades(Some("urgent"));
        assert!(opciones.iter().any(|o| o.code == "urgent" && o.selected));
        assert_eq!(opciones.iter().filter(|o| o.selected).count(), 1);
    }
}
