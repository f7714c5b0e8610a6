//! Order management handlers.
//!
//! The status column is a self-submitting `<select>`. A change is applied to
//! the cell first and rolled back to the posted `actual` value when the
//! backend refuses it, so the cell always shows what the backend holds.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use refaccionaria_core::models::Pedido;
use refaccionaria_core::optimistic::OptimisticState;
use refaccionaria_core::validation::blank_as_none;
use refaccionaria_core::{ActionState, PedidoEstado, PedidoId};
use serde::Deserialize;
use tracing::instrument;

use crate::components::{DataTableConfig, data_table::pedidos_table_config};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireStaff, Theme};
use crate::respond::backend_failure;
use crate::state::AppState;
use crate::views::{AdminLayout, EstadoSelect, Pager, PedidoRow};

use super::cell_response;

const PEDIDOS_PATH: &str = "/admin/pedidos";
const UPDATE_ERROR: &str = "Error al actualizar el pedido";

#[derive(Debug, Deserialize)]
pub struct PedidosQuery {
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub estado: Option<String>,
}

/// Body posted by the status cell.
#[derive(Debug, Deserialize)]
pub struct EstadoForm {
    #[serde(default)]
    pub estado: String,
    /// Status the cell showed before the change.
    #[serde(default)]
    pub actual: String,
}

/// Orders page.
#[derive(Template, WebTemplate)]
#[template(path = "pedidos.html")]
pub struct PedidosTemplate {
    pub layout: AdminLayout,
    pub table: DataTableConfig,
    pub rows: Vec<PedidoRow>,
    pub pager: Pager,
    pub total: u64,
}

/// List every order, optionally filtered by status.
#[instrument(skip(state, user, theme))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    Query(query): Query<PedidosQuery>,
) -> Result<PedidosTemplate> {
    let page = query.page.unwrap_or(1).max(1);
    let estado = query.estado.as_deref().and_then(PedidoEstado::from_code);
    let pedidos = state.backend().pedidos(&user.token, page, estado).await?;

    let table = pedidos_table_config(estado);
    let pager = Pager::new(&table.base_url(), page, &pedidos);
    Ok(PedidosTemplate {
        layout: AdminLayout::new(&user, theme, PEDIDOS_PATH),
        pager,
        total: pedidos.count,
        rows: pedidos.results.into_iter().map(PedidoRow::from).collect(),
        table,
    })
}

/// The backend's own status when it returned the order, else `local`.
fn shown_estado(outcome: &ActionState<Pedido>, local: PedidoEstado) -> PedidoEstado {
    outcome.data.as_ref().map_or(local, |pedido| pedido.estado)
}

fn parse_estado(raw: &str) -> Result<PedidoEstado> {
    PedidoEstado::from_code(raw.trim()).ok_or_else(|| AppError::BadRequest("Estado inválido".into()))
}

/// Change an order's status.
///
/// JSON clients get the updated order as `data`.
#[instrument(skip(state, user, headers, form), fields(pedido = %id))]
pub async fn update_estado(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    headers: HeaderMap,
    Path(id): Path<PedidoId>,
    Form(form): Form<EstadoForm>,
) -> Result<Response> {
    let nuevo = parse_estado(&form.estado)?;
    let actual = parse_estado(&form.actual)?;

    let estados = OptimisticState::from_iter([(id, actual)]);
    let (estados, snapshot) = estados.apply(id, nuevo);

    let (pedido, commit) = match state
        .backend()
        .update_pedido_estado(&user.token, id, nuevo)
        .await
    {
        Ok(pedido) => (Some(pedido), Ok(())),
        Err(e) => (None, Err(e)),
    };

    let (estados, outcome): (_, ActionState<Pedido>) = match estados.settle(snapshot, commit) {
        Ok(estados) => (
            estados,
            pedido.map_or_else(ActionState::done, ActionState::ok),
        ),
        Err((estados, e)) => (estados, backend_failure(&e, UPDATE_ERROR)),
    };
    let shown = shown_estado(&outcome, estados.get(&id).copied().unwrap_or(actual));

    Ok(cell_response(
        &headers,
        outcome,
        EstadoSelect::pedido_estado(&id.to_string(), shown),
        PEDIDOS_PATH,
        "Estado del pedido actualizado",
        UPDATE_ERROR,
    ))
}
