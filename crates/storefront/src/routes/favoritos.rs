//! Favorite parts: the list page and the heart toggle.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use refaccionaria_core::optimistic::OptimisticState;
use refaccionaria_core::{ActionState, RefaccionId};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{AuthContext, OptionalAuth, RequireAuth};
use crate::respond::{
    backend_failure, is_htmx, negotiate, redirect_after, toast_error, toast_success, wants_json,
};
use crate::state::AppState;
use crate::views::{FavoritoBoton, Layout, RefaccionCard};

const LOGIN_REQUIRED: &str = "Debes iniciar sesión para agregar productos a favoritos";

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "cuenta/favoritos.html")]
pub struct FavoritosTemplate {
    pub layout: Layout,
    pub refacciones: Vec<RefaccionCard>,
    pub total: u64,
}

/// The toggle button after a click.
#[derive(Template, WebTemplate)]
#[template(path = "partials/favorito_button.html")]
pub struct FavoritoFragment {
    pub boton: FavoritoBoton,
}

/// `data` of the toggle's JSON response.
#[derive(Debug, Clone, Serialize)]
pub struct FavoritoToggle {
    pub favorito: bool,
    pub message: &'static str,
}

/// Display the favorites list.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let favoritos = state.backend().favoritos(&user.token).await?;
    let auth = AuthContext::signed_in(&user);
    Ok(FavoritosTemplate {
        layout: Layout::load(&session, &auth).await,
        total: favoritos.total.max(favoritos.favoritos.len() as u64),
        refacciones: favoritos.favoritos.iter().map(RefaccionCard::from).collect(),
    })
}

/// Toggle a part in the favorites.
///
/// The button flips immediately; if the backend refuses the change the flag
/// is rolled back and the original button is returned with an error toast.
/// Guests get a 401 with a message instead of a login redirect.
#[instrument(skip(state, auth, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    headers: HeaderMap,
    Path(id): Path<RefaccionId>,
) -> Response {
    let Some(user) = auth.user() else {
        let failed = ActionState::<FavoritoToggle>::failed(LOGIN_REQUIRED);
        return negotiate(&headers, failed, |_| {
            (StatusCode::UNAUTHORIZED, toast_error(LOGIN_REQUIRED)).into_response()
        });
    };

    let actual = match state.backend().favoritos(&user.token).await {
        Ok(favoritos) => favoritos.ids().contains(&id),
        Err(e) => {
            let failed = backend_failure::<FavoritoToggle>(&e, "Error al actualizar favoritos");
            return negotiate(&headers, failed, |failed| {
                let message = failed.message().unwrap_or_default().to_owned();
                (StatusCode::BAD_GATEWAY, toast_error(&message)).into_response()
            });
        }
    };

    let favoritos: OptimisticState<RefaccionId, bool> = [(id, actual)].into_iter().collect();
    let (favoritos, snapshot) = favoritos.apply(id, !actual);

    let commit = if actual {
        state.backend().quitar_favorito(&user.token, id).await
    } else {
        state.backend().agregar_favorito(&user.token, id).await
    };

    let outcome = match favoritos.settle(snapshot, commit) {
        Ok(favoritos) => {
            let favorito = favoritos.get(&id).copied().unwrap_or(!actual);
            ActionState::ok(FavoritoToggle {
                favorito,
                message: if favorito {
                    "Producto agregado a favoritos"
                } else {
                    "Producto eliminado de favoritos"
                },
            })
        }
        Err((favoritos, e)) => {
            tracing::debug!(restored = ?favoritos.get(&id), "Favorite toggle rolled back");
            backend_failure(&e, "Error al actualizar favoritos")
        }
    };

    if !is_htmx(&headers) && !wants_json(&headers) {
        return redirect_after(&headers, "/cuenta/perfil/favoritos");
    }

    negotiate(&headers, outcome, |outcome| {
        let favorito = outcome.data.as_ref().map_or(actual, |d| d.favorito);
        let fragment = FavoritoFragment {
            boton: FavoritoBoton {
                id: id.as_i32(),
                favorito,
            },
        };
        match (&outcome.data, outcome.message()) {
            (Some(data), _) => (toast_success(data.message), fragment).into_response(),
            (None, Some(message)) => (toast_error(message), fragment).into_response(),
            (None, None) => fragment.into_response(),
        }
    })
}
