//! Profile, password change and order history.
//!
//! All routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use refaccionaria_core::ActionState;
use refaccionaria_core::models::UserProfile;
use refaccionaria_core::validation::{ChangePasswordForm, ProfileForm};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{AuthContext, RequireAuth};
use crate::respond::{action_json, backend_failure, negotiate, wants_json};
use crate::state::AppState;
use crate::views::{Layout, Pager, PedidoView};

const PEDIDOS_PAGE_SIZE: u64 = 10;

// =============================================================================
// Templates
// =============================================================================

/// Profile page: personal data form plus the password change form.
#[derive(Template, WebTemplate)]
#[template(path = "cuenta/perfil.html")]
pub struct PerfilTemplate {
    pub layout: Layout,
    pub display_name: String,
    pub form: ProfileForm,
    pub state: ActionState<()>,
    pub password_state: ActionState<()>,
}

/// Order history page.
#[derive(Template, WebTemplate)]
#[template(path = "cuenta/pedidos.html")]
pub struct PedidosTemplate {
    pub layout: Layout,
    pub pedidos: Vec<PedidoView>,
    pub total: u64,
    pub pager: Pager,
}

/// Fill the edit form with the stored profile.
fn form_from_profile(p: &UserProfile) -> ProfileForm {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    ProfileForm {
        first_name: p.first_name.clone(),
        last_name: p.last_name.clone(),
        email: p.email.clone(),
        phone: text(&p.phone),
        bio: text(&p.bio),
        address_street: text(&p.address_street),
        address_colony: text(&p.address_colony),
        address_city: text(&p.address_city),
        address_state: text(&p.address_state),
        address_postal_code: text(&p.address_postal_code),
        address_references: text(&p.address_references),
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Display the profile page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let perfil = state.backend().perfil(&user.token).await?;
    let auth = AuthContext::signed_in(&user);
    Ok(PerfilTemplate {
        layout: Layout::load(&session, &auth).await,
        display_name: perfil.display_name(),
        form: form_from_profile(&perfil),
        state: ActionState::idle(),
        password_state: ActionState::idle(),
    })
}

/// Save the profile form.
#[instrument(skip(state, session, user, headers, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Response {
    let (outcome, shown) = match form.validate() {
        Err(errors) => (ActionState::failed(errors), form),
        Ok(update) => match state.backend().actualizar_perfil(&user.token, &update).await {
            Ok(perfil) => (ActionState::done(), form_from_profile(&perfil)),
            Err(e) => (backend_failure(&e, "Error al actualizar el perfil"), form),
        },
    };

    let auth = AuthContext::signed_in(&user);
    let layout = Layout::load(&session, &auth).await;
    negotiate(&headers, outcome, |state| {
        PerfilTemplate {
            layout,
            display_name: format!("{} {}", shown.first_name, shown.last_name)
                .trim()
                .to_owned(),
            form: shown,
            state,
            password_state: ActionState::idle(),
        }
        .into_response()
    })
}

/// Change the password of the signed-in user.
#[instrument(skip(state, session, user, headers, form))]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let outcome = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(change) => match state.backend().cambiar_password(&user.token, &change).await {
            Ok(()) => ActionState::done(),
            Err(e) => backend_failure(&e, "Error al cambiar la contraseña"),
        },
    };

    if wants_json(&headers) {
        return action_json(outcome);
    }

    let perfil = match state.backend().perfil(&user.token).await {
        Ok(perfil) => perfil,
        Err(e) => return AppError::from(e).into_response(),
    };
    let auth = AuthContext::signed_in(&user);
    PerfilTemplate {
        layout: Layout::load(&session, &auth).await,
        display_name: perfil.display_name(),
        form: form_from_profile(&perfil),
        state: ActionState::idle(),
        password_state: outcome,
    }
    .into_response()
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Display the order history.
#[instrument(skip(state, session, user))]
pub async fn pedidos(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let listado = state.backend().mis_pedidos(&user.token, page).await?;
    let pager = Pager::new(
        "/cuenta/perfil/pedidos",
        page,
        listado.has_previous(),
        listado.has_next(),
        listado.total_pages(PEDIDOS_PAGE_SIZE),
    );
    let auth = AuthContext::signed_in(&user);
    Ok(PedidosTemplate {
        layout: Layout::load(&session, &auth).await,
        pedidos: listado.results.iter().map(PedidoView::from).collect(),
        total: listado.count,
        pager,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_from_profile_blanks_missing_fields() {
        let perfil = UserProfile {
            username: "ana".into(),
            email: "ana@example.com".into(),
            first_name: "Ana".into(),
            phone: Some("5512345678".into()),
            ..UserProfile::default()
        };
        let form = form_from_profile(&perfil);
        assert_eq!(form.email, "ana@example.com");
        assert_eq!(form.phone, "5512345678");
        assert!(form.address_postal_code.is_empty());
        assert!(form.validate().is_ok());
    }
}
