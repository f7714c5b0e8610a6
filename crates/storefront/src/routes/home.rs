//! Home page and health check.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;
use crate::views::{CategoriaView, Layout, RefaccionCard};

/// Number of parts shown in the featured grid.
const DESTACADOS: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub destacados: Vec<RefaccionCard>,
    pub categorias: Vec<CategoriaView>,
}

/// Display the home page.
///
/// A failed backend call leaves its section empty instead of failing the page.
#[instrument(skip(state, session, auth))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> impl IntoResponse {
    let backend = state.backend();
    let (destacados, categorias) = tokio::join!(backend.destacados(DESTACADOS), backend.categorias());

    let destacados = destacados.map_or_else(
        |e| {
            tracing::error!("Failed to fetch featured parts: {e}");
            Vec::new()
        },
        |refacciones| refacciones.iter().map(RefaccionCard::from).collect(),
    );
    let categorias = categorias.map_or_else(
        |e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        },
        |categorias| categorias.iter().map(CategoriaView::from).collect(),
    );

    HomeTemplate {
        layout: Layout::load(&session, &auth).await,
        destacados,
        categorias,
    }
}

/// Liveness check.
pub async fn health() -> &'static str {
    "ok"
}
