//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                           - Health check
//! GET  /admin                            - Redirect to the dashboard
//! GET  /admin/unauthorized               - Shown to non-staff visitors (?next=)
//! POST /admin/tema                       - Toggle light/dark theme
//!
//! GET  /admin/dashboard                  - KPIs from ventas, pedidos, servicios
//! GET  /admin/ventas                     - Sales ledger + KPIs (?page=&tipo=&search=&periodo=)
//!
//! GET  /admin/pedidos                    - Orders (?page=&estado=)
//! POST /admin/pedidos/{id}/estado        - Change order status (cell fragment)
//!
//! GET  /admin/servicios                  - Service tickets (?page=&search=)
//! POST /admin/servicios                  - Open a ticket
//! GET  /admin/servicios/{id}             - Ticket detail with edit and note forms
//! POST /admin/servicios/{id}             - Save the edited ticket
//! POST /admin/servicios/{id}/nota        - Save the ticket's cost note
//! POST /admin/servicios/{id}/estado      - Change ticket status (cell fragment)
//! POST /admin/servicios/{id}/pago        - Change payment status (cell fragment)
//! POST /admin/servicios/{id}/eliminar    - Delete a ticket
//! POST /admin/servicios/{id}/venta       - Register the ticket's sale
//!
//! GET  /admin/inventario                 - Stock movements (?page=&search=&tipo_movimiento=&ordering=&fecha_desde=&fecha_hasta=)
//! POST /admin/inventario/{kind}          - Register an entrada, salida or devolucion
//! ```

pub mod dashboard;
pub mod inventario;
pub mod pedidos;
pub mod preferences;
pub mod servicios;
pub mod unauthorized;
pub mod ventas;

use axum::{
    Router,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use refaccionaria_core::ActionState;
use serde::Serialize;

use crate::error::AppError;
use crate::respond::{is_htmx, negotiate, outcome_toast, redirect_after, wants_json};
use crate::state::AppState;
use crate::views::{EstadoCell, EstadoSelect};

/// Answer a status cell change.
///
/// HTMX gets `cell` with a toast, JSON clients the `ActionState`, and plain
/// form posts go back to `list_path` (or a 400 carrying the error).
pub(crate) fn cell_response<T: Serialize>(
    headers: &HeaderMap,
    outcome: ActionState<T>,
    cell: EstadoSelect,
    list_path: &str,
    ok: &str,
    default_error: &str,
) -> Response {
    if !is_htmx(headers) && !wants_json(headers) {
        if outcome.success {
            return redirect_after(headers, list_path);
        }
        return AppError::BadRequest(outcome.message().unwrap_or(default_error).to_owned())
            .into_response();
    }
    negotiate(headers, outcome, |outcome| {
        (outcome_toast(&outcome, ok, default_error), EstadoCell { cell }).into_response()
    })
}

/// Create the orders routes router.
pub fn pedidos_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pedidos::index))
        .route("/{id}/estado", post(pedidos::update_estado))
}

/// Create the service tickets routes router.
pub fn servicios_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(servicios::index).post(servicios::create))
        .route("/{id}", get(servicios::show).post(servicios::update))
        .route("/{id}/nota", post(servicios::update_nota))
        .route("/{id}/estado", post(servicios::update_estado))
        .route("/{id}/pago", post(servicios::update_pago))
        .route("/{id}/eliminar", post(servicios::delete))
        .route("/{id}/venta", post(servicios::registrar_venta))
}

/// Create the inventory routes router.
pub fn inventario_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventario::index))
        .route("/{kind}", post(inventario::registrar))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(|| async { Redirect::to("/admin/dashboard") }))
        .route("/admin", get(|| async { Redirect::to("/admin/dashboard") }))
        .route("/admin/unauthorized", get(unauthorized::show))
        .route("/admin/tema", post(preferences::toggle_theme))
        .route("/admin/dashboard", get(dashboard::dashboard))
        .route("/admin/ventas", get(ventas::index))
        .nest("/admin/pedidos", pedidos_routes())
        .nest("/admin/servicios", servicios_routes())
        .nest("/admin/inventario", inventario_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
