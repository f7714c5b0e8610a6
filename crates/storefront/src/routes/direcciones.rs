//! Address book handlers (`/cuenta/perfil/direcciones`).
//!
//! Create and edit are plain form posts that re-render the page. Delete and
//! "set primary" are HTMX buttons answered with the list fragment; setting the
//! primary address is applied optimistically and rolled back if the backend
//! refuses it.

use std::borrow::Borrow;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use refaccionaria_core::models::Direccion;
use refaccionaria_core::optimistic::OptimisticState;
use refaccionaria_core::validation::{DireccionForm, DireccionUpdate};
use refaccionaria_core::{ActionState, DireccionId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{AuthContext, CurrentUser, RequireAuth};
use crate::respond::{action_json, backend_failure, is_htmx, negotiate, redirect_after, toast_error, wants_json};
use crate::state::AppState;
use crate::views::{DireccionView, Layout};

const DIRECCIONES_PATH: &str = "/cuenta/perfil/direcciones";

// =============================================================================
// Templates
// =============================================================================

/// Address book page.
#[derive(Template, WebTemplate)]
#[template(path = "cuenta/direcciones.html")]
pub struct DireccionesTemplate {
    pub layout: Layout,
    pub direcciones: Vec<DireccionView>,
    pub form: DireccionForm,
    pub state: ActionState<()>,
    /// Row whose edit form failed validation and stays open.
    pub editing: Option<i32>,
}

impl DireccionesTemplate {
    /// Whether the edit form for address `id` should render open.
    #[must_use]
    pub fn is_editing(&self, id: impl Borrow<i32>) -> bool {
        self.editing == Some(*id.borrow())
    }
}

/// The address list alone, swapped in by HTMX.
#[derive(Template, WebTemplate)]
#[template(path = "partials/direcciones.html")]
pub struct DireccionesFragment {
    pub direcciones: Vec<DireccionView>,
}

fn rows(direcciones: &[Direccion]) -> Vec<DireccionView> {
    direcciones.iter().map(|d| DireccionView::new(d, false)).collect()
}

async fn page(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    outcome: ActionState<()>,
    form: DireccionForm,
    editing: Option<i32>,
) -> Response {
    let direcciones = match state.backend().direcciones(&user.token).await {
        Ok(direcciones) => direcciones,
        Err(e) => return AppError::from(e).into_response(),
    };
    let auth = AuthContext::signed_in(user);
    DireccionesTemplate {
        layout: Layout::load(session, &auth).await,
        direcciones: rows(&direcciones),
        form,
        state: outcome,
        editing,
    }
    .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the address book.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    page(&state, &session, &user, ActionState::idle(), DireccionForm::default(), None).await
}

/// Add an address.
///
/// JSON clients receive the created address as `data`.
#[instrument(skip(state, session, user, headers, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<DireccionForm>,
) -> Response {
    let outcome: ActionState<Direccion> = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(nueva) => match state.backend().crear_direccion(&user.token, &nueva).await {
            Ok(direccion) => ActionState::ok(direccion),
            Err(e) => backend_failure(&e, "Error al crear la dirección"),
        },
    };

    if wants_json(&headers) {
        return action_json(outcome);
    }
    if outcome.success {
        return redirect_after(&headers, DIRECCIONES_PATH);
    }
    page(&state, &session, &user, outcome.map(|_| ()), form, None).await
}

/// Edit an address; blank fields are left unchanged.
#[instrument(skip(state, session, user, headers, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Path(id): Path<DireccionId>,
    Form(form): Form<DireccionForm>,
) -> Response {
    let outcome: ActionState<Direccion> = match form.validate_partial() {
        Err(errors) => ActionState::failed(errors),
        Ok(update) => match state
            .backend()
            .actualizar_direccion(&user.token, id, &update)
            .await
        {
            Ok(direccion) => ActionState::ok(direccion),
            Err(e) => backend_failure(&e, "Error al actualizar la dirección"),
        },
    };

    if wants_json(&headers) {
        return action_json(outcome);
    }
    if outcome.success {
        return redirect_after(&headers, DIRECCIONES_PATH);
    }
    page(
        &state,
        &session,
        &user,
        outcome.map(|_| ()),
        DireccionForm::default(),
        Some(id.as_i32()),
    )
    .await
}

/// Delete an address.
#[instrument(skip(state, session, user, headers))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Path(id): Path<DireccionId>,
) -> Response {
    let outcome = match state.backend().eliminar_direccion(&user.token, id).await {
        Ok(()) => ActionState::done(),
        Err(e) => backend_failure(&e, "Error al eliminar la dirección"),
    };

    if wants_json(&headers) {
        return action_json(outcome);
    }
    if !is_htmx(&headers) {
        if outcome.success {
            return redirect_after(&headers, DIRECCIONES_PATH);
        }
        return page(&state, &session, &user, outcome, DireccionForm::default(), None).await;
    }

    let direcciones = match state.backend().direcciones(&user.token).await {
        Ok(direcciones) => direcciones,
        Err(e) => return AppError::from(e).into_response(),
    };
    let fragment = DireccionesFragment {
        direcciones: rows(&direcciones),
    };
    match outcome.message() {
        Some(message) => (toast_error(message), fragment).into_response(),
        None => fragment.into_response(),
    }
}

/// Make an address the primary one.
///
/// The primary flags are moved before the backend is called and restored from
/// the snapshot if the call fails, so the list never shows two primaries.
#[instrument(skip(state, session, user, headers))]
pub async fn set_primary(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Path(id): Path<DireccionId>,
) -> Result<Response> {
    let direcciones = state.backend().direcciones(&user.token).await?;
    if !direcciones.iter().any(|d| d.id == id) {
        return Err(AppError::NotFound(format!("dirección {id}")));
    }

    let primarias: OptimisticState<DireccionId, bool> =
        direcciones.iter().map(|d| (d.id, d.is_primary)).collect();
    let (primarias, snapshot) =
        primarias.apply_many(direcciones.iter().map(|d| (d.id, d.id == id)));

    let commit = state
        .backend()
        .actualizar_direccion(&user.token, id, &DireccionUpdate::primary())
        .await
        .map(|_| ());

    let (primarias, outcome) = match primarias.settle(snapshot, commit) {
        Ok(primarias) => (primarias, ActionState::<()>::done()),
        Err((primarias, e)) => (
            primarias,
            backend_failure(&e, "Error al actualizar la dirección"),
        ),
    };

    let direcciones: Vec<DireccionView> = direcciones
        .iter()
        .map(|d| {
            let mut view = DireccionView::new(d, false);
            view.is_primary = primarias.get(&d.id).copied().unwrap_or(d.is_primary);
            view
        })
        .collect();

    if !is_htmx(&headers) && !wants_json(&headers) {
        if outcome.success {
            return Ok(redirect_after(&headers, DIRECCIONES_PATH));
        }
        let auth = AuthContext::signed_in(&user);
        return Ok(DireccionesTemplate {
            layout: Layout::load(&session, &auth).await,
            direcciones,
            form: DireccionForm::default(),
            state: outcome,
            editing: None,
        }
        .into_response());
    }

    Ok(negotiate(&headers, outcome, |outcome| {
        let fragment = DireccionesFragment { direcciones };
        match outcome.message() {
            Some(message) => (toast_error(message), fragment).into_response(),
            None => fragment.into_response(),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_failed_row_stays_open() {
        let template = DireccionesTemplate {
            layout: Layout::default(),
            direcciones: Vec::new(),
            form: DireccionForm::default(),
            state: ActionState::idle(),
            editing: Some(7),
        };
        assert!(template.is_editing(7));
        assert!(template.is_editing(&7));
        assert!(!template.is_editing(8));
    }
}
