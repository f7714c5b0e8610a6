//! Inventory handlers: the movements ledger and the entrada, salida and
//! devolución forms.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use refaccionaria_core::models::{MovimientoInventario, Refaccion};
use refaccionaria_core::validation::{MovimientoForm, MovimientoKind, blank_as_none};
use refaccionaria_core::{ActionState, TipoMovimiento};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::MovimientosQuery;
use crate::components::{DataTableConfig, InventarioFiltros, data_table::inventario_table_config};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireStaff, StaffUser, Theme};
use crate::respond::{action_json, backend_failure, redirect_after, wants_json};
use crate::state::AppState;
use crate::views::{AdminLayout, Pager};

const INVENTARIO_PATH: &str = "/admin/inventario";
const ORDERINGS: [&str; 4] = ["fecha", "-fecha", "cantidad", "-cantidad"];

#[derive(Debug, Default, Deserialize)]
pub struct InventarioParams {
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tipo_movimiento: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub ordering: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub fecha_desde: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub fecha_hasta: Option<String>,
    /// Part picker search for the movement forms.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub refaccion_q: Option<String>,
}

/// Query params after dropping values the backend would reject.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Filtros {
    page: u32,
    search: Option<String>,
    tipo_movimiento: Option<TipoMovimiento>,
    ordering: Option<String>,
    fecha_desde: Option<NaiveDate>,
    fecha_hasta: Option<NaiveDate>,
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
}

impl Filtros {
    fn from_params(params: &InventarioParams) -> Self {
        Self {
            page: params.page.unwrap_or(1).max(1),
            search: params.search.clone(),
            tipo_movimiento: params
                .tipo_movimiento
                .as_deref()
                .and_then(TipoMovimiento::from_code),
            ordering: params
                .ordering
                .clone()
                .filter(|o| ORDERINGS.contains(&o.as_str())),
            fecha_desde: parse_date(params.fecha_desde.as_deref()),
            fecha_hasta: parse_date(params.fecha_hasta.as_deref()),
        }
    }

    fn query(&self) -> MovimientosQuery {
        MovimientosQuery {
            page: self.page,
            search: self.search.clone(),
            tipo_movimiento: self.tipo_movimiento,
            ordering: Some(self.ordering.clone().unwrap_or_else(|| "-fecha".to_owned())),
            refaccion: None,
            fecha_desde: self.fecha_desde,
            fecha_hasta: self.fecha_hasta,
        }
    }

    fn table(&self) -> DataTableConfig {
        let desde = self.fecha_desde.map(|d| d.format("%Y-%m-%d").to_string());
        let hasta = self.fecha_hasta.map(|d| d.format("%Y-%m-%d").to_string());
        inventario_table_config(InventarioFiltros {
            search: self.search.as_deref(),
            tipo_movimiento: self.tipo_movimiento,
            ordering: self.ordering.as_deref(),
            fecha_desde: desde.as_deref(),
            fecha_hasta: hasta.as_deref(),
        })
    }
}

/// Inventory page.
#[derive(Template, WebTemplate)]
#[template(path = "inventario.html")]
pub struct InventarioTemplate {
    pub layout: AdminLayout,
    pub table: DataTableConfig,
    pub movimientos: Vec<MovimientoInventario>,
    pub pager: Pager,
    pub total: u64,
    /// Part picker results; empty until something is searched.
    pub refacciones: Vec<Refaccion>,
    pub refaccion_q: String,
    /// Which form the last submit came from, to reopen it with its errors.
    pub kind: Option<&'static str>,
    pub form: MovimientoForm,
    pub state: ActionState<()>,
}

impl InventarioTemplate {
    /// Whether the form for `kind` should render open.
    #[must_use]
    pub fn is_open(&self, kind: &str) -> bool {
        self.kind == Some(kind)
    }
}

async fn page(
    state: &AppState,
    user: &StaffUser,
    theme: Theme,
    params: &InventarioParams,
    submitted: Option<(MovimientoKind, MovimientoForm)>,
    outcome: ActionState<()>,
) -> Result<InventarioTemplate> {
    let filtros = Filtros::from_params(params);
    let backend = state.backend();
    let refaccion_q = params.refaccion_q.clone().unwrap_or_default();
    let query = filtros.query();

    let (movimientos, refacciones) = tokio::join!(
        backend.movimientos(&user.token, &query),
        async {
            if refaccion_q.is_empty() {
                return Vec::new();
            }
            backend
                .buscar_refacciones(&user.token, &refaccion_q)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Part search failed: {e}");
                    Vec::new()
                })
        },
    );
    let movimientos = movimientos?;

    let table = filtros.table();
    let pager = Pager::new(&table.base_url(), filtros.page, &movimientos);
    let (kind, form) = submitted.map_or((None, MovimientoForm::default()), |(kind, form)| {
        (Some(kind.path()), form)
    });
    Ok(InventarioTemplate {
        layout: AdminLayout::new(user, theme, INVENTARIO_PATH),
        table,
        pager,
        total: movimientos.count,
        movimientos: movimientos.results,
        refacciones,
        refaccion_q,
        kind,
        form,
        state: outcome,
    })
}

/// List stock movements, newest first unless another order is chosen.
#[instrument(skip(state, user, theme))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    Query(params): Query<InventarioParams>,
) -> Result<InventarioTemplate> {
    page(&state, &user, theme, &params, None, ActionState::idle()).await
}

/// Register an entrada, salida or devolución.
#[instrument(skip(state, user, theme, headers, form))]
pub async fn registrar(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    headers: HeaderMap,
    Path(kind): Path<String>,
    Form(form): Form<MovimientoForm>,
) -> Result<Response> {
    let kind = MovimientoKind::from_path(&kind)
        .ok_or_else(|| AppError::NotFound(format!("movimiento {kind}")))?;

    let outcome: ActionState<()> = match form.validate(kind) {
        Err(errors) => ActionState::failed(errors),
        Ok(payload) => match state
            .backend()
            .registrar_movimiento(&user.token, kind, &payload)
            .await
        {
            Ok(()) => ActionState::done(),
            Err(e) => backend_failure(&e, kind.default_error()),
        },
    };

    if wants_json(&headers) {
        return Ok(action_json(outcome));
    }
    if outcome.success {
        tracing::info!(kind = kind.path(), "{}", kind.success_message());
        return Ok(redirect_after(&headers, INVENTARIO_PATH));
    }
    let template = page(
        &state,
        &user,
        theme,
        &InventarioParams::default(),
        Some((kind, form)),
        outcome,
    )
    .await?;
    Ok(template.into_response())
}
