//! Catalog browsing: categories, parts by category, part detail.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use refaccionaria_core::models::Refaccion;
use refaccionaria_core::{CategoriaId, RefaccionEstado, RefaccionId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, RefaccionesQuery};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{AuthContext, OptionalAuth};
use crate::state::AppState;
use crate::views::{CategoriaView, FavoritoBoton, Layout, RefaccionCard};

/// Filters on a category page.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriaFilters {
    #[serde(default)]
    pub marca: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
}

/// Option in the condition filter.
#[derive(Clone)]
pub struct EstadoOption {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// A part card with its favorite flag.
#[derive(Clone)]
pub struct CatalogoItem {
    pub card: RefaccionCard,
    pub favorito: bool,
}

impl CatalogoItem {
    #[must_use]
    pub const fn boton(&self) -> FavoritoBoton {
        FavoritoBoton {
            id: self.card.id,
            favorito: self.favorito,
        }
    }
}

/// Category index template.
#[derive(Template, WebTemplate)]
#[template(path = "catalogo/index.html")]
pub struct CategoriasTemplate {
    pub layout: Layout,
    pub categorias: Vec<CategoriaView>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalogo/categoria.html")]
pub struct CategoriaTemplate {
    pub layout: Layout,
    pub categoria: CategoriaView,
    pub refacciones: Vec<CatalogoItem>,
    pub total: u64,
    pub marcas: Vec<String>,
    pub marca: String,
    pub estados: Vec<EstadoOption>,
}

/// Part detail template.
#[derive(Template, WebTemplate)]
#[template(path = "catalogo/refaccion.html")]
pub struct RefaccionTemplate {
    pub layout: Layout,
    pub item: CatalogoItem,
    pub descripcion: String,
    pub compatibilidad: String,
    pub categoria_id: i32,
}

/// Ids of the user's favorites; empty for guests or on failure.
async fn favorito_ids(state: &AppState, auth: &AuthContext) -> BTreeSet<i32> {
    let Some(token) = &auth.access else {
        return BTreeSet::new();
    };
    match state.backend().favoritos(token).await {
        Ok(favoritos) => favoritos.ids().into_iter().map(|id| id.as_i32()).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch favorites: {e}");
            BTreeSet::new()
        }
    }
}

fn items(refacciones: &[Refaccion], favoritos: &BTreeSet<i32>) -> Vec<CatalogoItem> {
    refacciones
        .iter()
        .map(|r| CatalogoItem {
            card: RefaccionCard::from(r),
            favorito: favoritos.contains(&r.id.as_i32()),
        })
        .collect()
}

/// List all categories.
#[instrument(skip(state, session, auth))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let categorias = state.backend().categorias().await?;
    Ok(CategoriasTemplate {
        layout: Layout::load(&session, &auth).await,
        categorias: categorias.iter().map(CategoriaView::from).collect(),
    })
}

/// Parts of a category, filtered by brand and condition.
#[instrument(skip(state, session, auth))]
pub async fn categoria(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(id): Path<i32>,
    Query(filters): Query<CategoriaFilters>,
) -> Result<impl IntoResponse> {
    let marca = filters.marca.filter(|m| !m.trim().is_empty());
    let estado = filters.estado.as_deref().and_then(RefaccionEstado::from_code);

    let (listado, favoritos) = tokio::join!(
        state
            .backend()
            .categoria_refacciones(CategoriaId::new(id), marca.as_deref(), estado),
        favorito_ids(&state, &auth),
    );
    let listado = listado.map_err(|e| match e {
        BackendError::NotFound => AppError::NotFound(format!("categoría {id}")),
        other => AppError::Backend(other),
    })?;

    let marcas: BTreeSet<String> = listado
        .refacciones
        .iter()
        .filter_map(|r| r.marca_nombre.clone())
        .filter(|m| !m.is_empty())
        .collect();

    Ok(CategoriaTemplate {
        layout: Layout::load(&session, &auth).await,
        categoria: CategoriaView::from(&listado.categoria),
        refacciones: items(&listado.refacciones, &favoritos),
        total: listado.total,
        marcas: marcas.into_iter().collect(),
        marca: marca.unwrap_or_default(),
        estados: RefaccionEstado::ALL
            .into_iter()
            .map(|e| EstadoOption {
                code: e.code(),
                label: e.label(),
                selected: Some(e) == estado,
            })
            .collect(),
    })
}

/// Part detail, addressed by part number (or id when it has none).
#[instrument(skip(state, session, auth))]
pub async fn refaccion(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path((categoria_id, codigo)): Path<(i32, String)>,
) -> Result<impl IntoResponse> {
    let backend = state.backend();
    let refaccion = match backend.refaccion_por_codigo(&codigo).await {
        Ok(refaccion) => refaccion,
        Err(BackendError::NotFound) => match codigo.parse::<RefaccionId>() {
            Ok(id) => backend.refaccion(id).await?,
            Err(_) => return Err(AppError::NotFound(format!("refacción {codigo}"))),
        },
        Err(e) => return Err(e.into()),
    };
    let favoritos = favorito_ids(&state, &auth).await;

    Ok(RefaccionTemplate {
        layout: Layout::load(&session, &auth).await,
        descripcion: refaccion.descripcion.clone().unwrap_or_default(),
        compatibilidad: refaccion.compatibilidad.clone(),
        categoria_id: refaccion.categoria.map_or(categoria_id, |c| c.as_i32()),
        item: CatalogoItem {
            favorito: favoritos.contains(&refaccion.id.as_i32()),
            card: RefaccionCard::from(&refaccion),
        },
    })
}

/// Query of the search box.
#[derive(Debug, Default, Deserialize)]
pub struct BuscarQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "catalogo/buscar.html")]
pub struct BuscarTemplate {
    pub layout: Layout,
    pub q: String,
    pub refacciones: Vec<CatalogoItem>,
    pub total: u64,
}

/// Free-text search over the catalog.
#[instrument(skip(state, session, auth))]
pub async fn buscar(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<BuscarQuery>,
) -> Result<impl IntoResponse> {
    let q = query.q.trim().to_owned();
    let (page, favoritos) = if q.is_empty() {
        (None, BTreeSet::new())
    } else {
        let search = RefaccionesQuery {
            search: Some(q.clone()),
            page: query.page,
            ..RefaccionesQuery::default()
        };
        let (page, favoritos) =
            tokio::join!(state.backend().refacciones(&search), favorito_ids(&state, &auth));
        (Some(page?), favoritos)
    };

    let (refacciones, total) = page.map_or((Vec::new(), 0), |p| (items(&p.results, &favoritos), p.count));
    Ok(BuscarTemplate {
        layout: Layout::load(&session, &auth).await,
        q,
        refacciones,
        total,
    })
}
