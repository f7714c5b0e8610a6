//! Repair ticket handlers.
//!
//! Opening a ticket is a plain form post that re-renders the page with
//! field errors. Status and payment cells save themselves like the orders
//! table; deleting a row and registering its sale are HTMX buttons answered
//! with a toast.
//!
//! Each ticket also has a detail page with two forms: the ticket itself
//! (replaced with `PUT`) and its cost note (patched as `{"nota": ...}`).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use refaccionaria_core::models::{NotaServicio, Servicio, VentaServicioInput};
use refaccionaria_core::optimistic::OptimisticState;
use refaccionaria_core::validation::{
    GARANTIA_DIAS, ServicioForm, VentaServicioForm, blank_as_none,
};
use refaccionaria_core::{ActionState, EstadoPago, Price, ServicioEstado, ServicioId};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::ServicioPatch;
use crate::components::{DataTableConfig, data_table::servicios_table_config};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireStaff, StaffUser, Theme};
use crate::respond::{action_json, backend_failure, is_htmx, outcome_toast, redirect_after, wants_json};
use crate::state::AppState;
use crate::views::{AdminLayout, EstadoSelect, Pager, ServicioRow};

use super::cell_response;

const SERVICIOS_PATH: &str = "/admin/servicios";

#[derive(Debug, Default, Deserialize)]
pub struct ServiciosQuery {
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
}

/// Body posted by the status cell.
#[derive(Debug, Deserialize)]
pub struct EstadoForm {
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub actual: String,
}

/// Body posted by the payment cell.
#[derive(Debug, Deserialize)]
pub struct PagoForm {
    #[serde(default)]
    pub estado_pago: String,
    #[serde(default)]
    pub actual: String,
}

/// Service tickets page.
#[derive(Template, WebTemplate)]
#[template(path = "servicios.html")]
pub struct ServiciosTemplate {
    pub layout: AdminLayout,
    pub table: DataTableConfig,
    pub rows: Vec<ServicioRow>,
    pub pager: Pager,
    pub total: u64,
    /// New ticket form, refilled after a failed submit.
    pub form: ServicioForm,
    pub state: ActionState<()>,
    pub estados: Vec<&'static str>,
    pub pagos: Vec<&'static str>,
    /// Default date for the new ticket form.
    pub hoy: String,
}

impl ServiciosTemplate {
    /// Whether `estado` is preselected in the new ticket form.
    #[must_use]
    pub fn estado_selected(&self, estado: &str) -> bool {
        let current = self.form.estado.trim();
        current == estado || (current.is_empty() && estado == ServicioEstado::default().label())
    }
}

async fn page(
    state: &AppState,
    user: &StaffUser,
    theme: Theme,
    query: &ServiciosQuery,
    form: ServicioForm,
    outcome: ActionState<()>,
) -> Result<ServiciosTemplate> {
    let page = query.page.unwrap_or(1).max(1);
    let search = query.search.as_deref();
    let servicios = state
        .backend()
        .servicios(&user.token, page, search)
        .await?;

    let table = servicios_table_config(search);
    let pager = Pager::new(&table.base_url(), page, &servicios);
    Ok(ServiciosTemplate {
        layout: AdminLayout::new(user, theme, SERVICIOS_PATH),
        pager,
        total: servicios.count,
        rows: servicios.results.into_iter().map(ServicioRow::from).collect(),
        table,
        form,
        state: outcome,
        estados: ServicioEstado::ALL.iter().map(|e| e.label()).collect(),
        pagos: EstadoPago::ALL.iter().map(|p| p.label()).collect(),
        hoy: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
    })
}

/// List tickets, optionally filtered by a free-text search.
#[instrument(skip(state, user, theme))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    Query(query): Query<ServiciosQuery>,
) -> Result<ServiciosTemplate> {
    page(
        &state,
        &user,
        theme,
        &query,
        ServicioForm::default(),
        ActionState::idle(),
    )
    .await
}

/// Open a ticket.
///
/// JSON clients receive the created ticket as `data`.
#[instrument(skip(state, user, theme, headers, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    headers: HeaderMap,
    Form(form): Form<ServicioForm>,
) -> Result<Response> {
    let outcome: ActionState<Servicio> = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(servicio) => match state.backend().crear_servicio(&user.token, &servicio).await {
            Ok(creado) => ActionState::ok(creado),
            Err(e) => backend_failure(&e, "Error al crear el servicio"),
        },
    };

    if wants_json(&headers) {
        return Ok(action_json(outcome));
    }
    if outcome.success {
        return Ok(redirect_after(&headers, SERVICIOS_PATH));
    }
    let template = page(
        &state,
        &user,
        theme,
        &ServiciosQuery::default(),
        form,
        outcome.map(|_| ()),
    )
    .await?;
    Ok(template.into_response())
}

/// One ticket with its edit and cost note forms.
#[derive(Template, WebTemplate)]
#[template(path = "servicio_detalle.html")]
pub struct ServicioDetalleTemplate {
    pub layout: AdminLayout,
    pub numero: String,
    pub servicio: Servicio,
    pub form: ServicioForm,
    pub state: ActionState<()>,
    pub nota: VentaServicioForm,
    pub nota_state: ActionState<()>,
    pub estados: Vec<&'static str>,
    pub pagos: Vec<&'static str>,
}

impl ServicioDetalleTemplate {
    #[must_use]
    pub fn estado_selected(&self, estado: &str) -> bool {
        self.form.estado.trim() == estado
    }

    #[must_use]
    pub fn pago_selected(&self, pago: &str) -> bool {
        self.nota.estado_pago.as_deref() == Some(pago)
    }
}

fn servicio_form(servicio: &Servicio) -> ServicioForm {
    ServicioForm {
        no_de_servicio: servicio.no_de_servicio.map(|id| id.to_string()),
        fecha: servicio
            .fecha
            .map(|f| f.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        aparato: servicio.aparato.clone(),
        telefono: servicio.telefono.clone().unwrap_or_default(),
        cliente: servicio.cliente.clone(),
        observaciones: servicio.observaciones.clone(),
        estado: servicio.estado.label().to_owned(),
        marca: servicio.marca.clone(),
    }
}

/// Cost note form, falling back to the ticket's own fields where the note
/// has nothing yet.
fn nota_form(id: ServicioId, servicio: &Servicio) -> VentaServicioForm {
    let nota = servicio.nota.clone().unwrap_or_default();
    let monto = |price: Option<Price>| price.map(|p| p.amount().to_string());
    VentaServicioForm {
        servicio: id.to_string(),
        mano_obra: monto(nota.labor_cost),
        refacciones_total: monto(nota.parts_cost),
        total: monto(nota.total_cost),
        observaciones: nota.notes.or_else(|| servicio.observaciones.clone()),
        tecnico: nota.technician,
        garantia_dias: Some(nota.warranty.unwrap_or(GARANTIA_DIAS).to_string()),
        estado_pago: Some(
            nota.payment_status
                .or(servicio.estado_pago)
                .unwrap_or(EstadoPago::Pendiente)
                .label()
                .to_owned(),
        ),
    }
}

fn detalle_path(id: ServicioId) -> String {
    format!("{SERVICIOS_PATH}/{id}")
}

/// Forms to show on the detail page; `None` refills from the ticket.
#[derive(Default)]
struct DetalleForms {
    form: Option<ServicioForm>,
    state: ActionState<()>,
    nota: Option<VentaServicioForm>,
    nota_state: ActionState<()>,
}

async fn detalle(
    state: &AppState,
    user: &StaffUser,
    theme: Theme,
    id: ServicioId,
    forms: DetalleForms,
) -> Result<ServicioDetalleTemplate> {
    let servicio = state.backend().servicio(&user.token, id).await?;
    Ok(ServicioDetalleTemplate {
        layout: AdminLayout::new(user, theme, SERVICIOS_PATH),
        numero: id.to_string(),
        form: forms.form.unwrap_or_else(|| servicio_form(&servicio)),
        state: forms.state,
        nota: forms.nota.unwrap_or_else(|| nota_form(id, &servicio)),
        nota_state: forms.nota_state,
        servicio,
        estados: ServicioEstado::ALL.iter().map(|e| e.label()).collect(),
        pagos: EstadoPago::ALL.iter().map(|p| p.label()).collect(),
    })
}

/// Ticket detail page.
#[instrument(skip(state, user, theme), fields(servicio = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    Path(id): Path<ServicioId>,
) -> Result<ServicioDetalleTemplate> {
    detalle(&state, &user, theme, id, DetalleForms::default()).await
}

/// Save the edited ticket.
///
/// JSON clients receive the saved ticket as `data`.
#[instrument(skip(state, user, theme, headers, form), fields(servicio = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    headers: HeaderMap,
    Path(id): Path<ServicioId>,
    Form(form): Form<ServicioForm>,
) -> Result<Response> {
    let outcome: ActionState<Servicio> = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(servicio) => match state
            .backend()
            .actualizar_servicio(&user.token, id, &servicio)
            .await
        {
            Ok(()) => ActionState::ok(Servicio {
                no_de_servicio: Some(id),
                ..servicio
            }),
            Err(e) => backend_failure(&e, "Error al actualizar el servicio"),
        },
    };

    if wants_json(&headers) {
        return Ok(action_json(outcome));
    }
    if outcome.success {
        return Ok(redirect_after(&headers, &detalle_path(id)));
    }
    let forms = DetalleForms {
        form: Some(form),
        state: outcome.map(|_| ()),
        ..DetalleForms::default()
    };
    Ok(detalle(&state, &user, theme, id, forms).await?.into_response())
}

/// Save the ticket's cost note.
///
/// Takes the same fields as the sale form; blank amounts default to zero
/// and the total to labor plus parts.
#[instrument(skip(state, user, theme, headers, form), fields(servicio = %id))]
pub async fn update_nota(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    headers: HeaderMap,
    Path(id): Path<ServicioId>,
    Form(mut form): Form<VentaServicioForm>,
) -> Result<Response> {
    const ERROR: &str = "Error al actualizar la nota del servicio";

    form.servicio = id.to_string();
    let outcome: ActionState<NotaServicio> = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(venta) => {
            let nota = NotaServicio::from(&venta);
            let patch = ServicioPatch {
                nota: Some(nota.clone()),
                ..ServicioPatch::default()
            };
            match state.backend().patch_servicio(&user.token, id, &patch).await {
                Ok(()) => ActionState::ok(nota),
                Err(e) => backend_failure(&e, ERROR),
            }
        }
    };

    if wants_json(&headers) {
        return Ok(action_json(outcome));
    }
    if outcome.success {
        return Ok(redirect_after(&headers, &detalle_path(id)));
    }
    let forms = DetalleForms {
        nota: Some(form),
        nota_state: outcome.map(|_| ()),
        ..DetalleForms::default()
    };
    Ok(detalle(&state, &user, theme, id, forms).await?.into_response())
}

/// Apply `patch` with the cell value moved ahead of the backend call.
///
/// Returns the value the cell should show and the outcome.
async fn patch_cell<V: Copy>(
    state: &AppState,
    user: &StaffUser,
    id: ServicioId,
    actual: V,
    nuevo: V,
    patch: ServicioPatch,
    default_error: &str,
) -> (V, ActionState<()>) {
    let valores = OptimisticState::from_iter([(id, actual)]);
    let (valores, snapshot) = valores.apply(id, nuevo);
    let commit = state.backend().patch_servicio(&user.token, id, &patch).await;
    match valores.settle(snapshot, commit) {
        Ok(valores) => (
            valores.get(&id).copied().unwrap_or(nuevo),
            ActionState::done(),
        ),
        Err((valores, e)) => (
            valores.get(&id).copied().unwrap_or(actual),
            backend_failure(&e, default_error),
        ),
    }
}

fn parse_estado(raw: &str) -> Result<ServicioEstado> {
    ServicioEstado::from_label(raw.trim()).ok_or_else(|| AppError::BadRequest("Estado inválido".into()))
}

fn parse_pago(raw: &str) -> Result<EstadoPago> {
    EstadoPago::from_label(raw.trim())
        .ok_or_else(|| AppError::BadRequest("Estado de pago inválido".into()))
}

/// Change a ticket's status.
#[instrument(skip(state, user, headers, form), fields(servicio = %id))]
pub async fn update_estado(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    headers: HeaderMap,
    Path(id): Path<ServicioId>,
    Form(form): Form<EstadoForm>,
) -> Result<Response> {
    const ERROR: &str = "Error al actualizar el estado del servicio";

    let nuevo = parse_estado(&form.estado)?;
    let actual = parse_estado(&form.actual)?;
    let patch = ServicioPatch {
        estado: Some(nuevo),
        ..ServicioPatch::default()
    };
    let (shown, outcome) = patch_cell(&state, &user, id, actual, nuevo, patch, ERROR).await;

    Ok(cell_response(
        &headers,
        outcome,
        EstadoSelect::servicio_estado(&id.to_string(), shown),
        SERVICIOS_PATH,
        "Estado del servicio actualizado",
        ERROR,
    ))
}

/// Change a ticket's payment status.
#[instrument(skip(state, user, headers, form), fields(servicio = %id))]
pub async fn update_pago(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    headers: HeaderMap,
    Path(id): Path<ServicioId>,
    Form(form): Form<PagoForm>,
) -> Result<Response> {
    const ERROR: &str = "Error al actualizar el estado de pago";

    let nuevo = parse_pago(&form.estado_pago)?;
    let actual = parse_pago(&form.actual)?;
    let patch = ServicioPatch {
        estado_pago: Some(nuevo),
        ..ServicioPatch::default()
    };
    let (shown, outcome) = patch_cell(&state, &user, id, actual, nuevo, patch, ERROR).await;

    Ok(cell_response(
        &headers,
        outcome,
        EstadoSelect::servicio_pago(&id.to_string(), shown),
        SERVICIOS_PATH,
        "Estado de pago actualizado",
        ERROR,
    ))
}

/// Keep the row in place when an HTMX action failed.
fn no_swap() -> [(HeaderName, HeaderValue); 1] {
    [(
        HeaderName::from_static("hx-reswap"),
        HeaderValue::from_static("none"),
    )]
}

/// Answer an HTMX row action that has no fragment of its own.
///
/// On success the (empty) body replaces the row only when `remove_row` is
/// set; failures never touch the row.
fn row_action(outcome: &ActionState<()>, ok: &str, default_error: &str, remove_row: bool) -> Response {
    let toast = outcome_toast(outcome, ok, default_error);
    if outcome.success && remove_row {
        (toast, "").into_response()
    } else {
        (toast, no_swap(), "").into_response()
    }
}

/// Delete a ticket.
#[instrument(skip(state, user, theme, headers), fields(servicio = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    headers: HeaderMap,
    Path(id): Path<ServicioId>,
) -> Result<Response> {
    const ERROR: &str = "Error al eliminar el servicio";

    let outcome = match state.backend().eliminar_servicio(&user.token, id).await {
        Ok(()) => ActionState::done(),
        Err(e) => backend_failure(&e, ERROR),
    };

    if wants_json(&headers) {
        return Ok(action_json(outcome));
    }
    if is_htmx(&headers) {
        return Ok(row_action(&outcome, "Servicio eliminado", ERROR, true));
    }
    if outcome.success {
        return Ok(redirect_after(&headers, SERVICIOS_PATH));
    }
    let template = page(
        &state,
        &user,
        theme,
        &ServiciosQuery::default(),
        ServicioForm::default(),
        outcome,
    )
    .await?;
    Ok(template.into_response())
}

/// Copy a registered sale onto the ticket's cost note. The sale stands even
/// when this fails.
async fn guardar_nota(state: &AppState, user: &StaffUser, id: ServicioId, venta: &VentaServicioInput) {
    let patch = ServicioPatch {
        nota: Some(NotaServicio::from(venta)),
        ..ServicioPatch::default()
    };
    if let Err(e) = state.backend().patch_servicio(&user.token, id, &patch).await {
        tracing::warn!(servicio = %id, error = %e, "Sale registered without updating the ticket note");
    }
}

/// Register the sale that closes a ticket.
///
/// The ticket comes from the path; amounts left blank default to zero and
/// the total to labor plus parts.
#[instrument(skip(state, user, theme, headers, form), fields(servicio = %id))]
pub async fn registrar_venta(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    headers: HeaderMap,
    Path(id): Path<ServicioId>,
    Form(mut form): Form<VentaServicioForm>,
) -> Result<Response> {
    const ERROR: &str = "Error al registrar la venta del servicio";

    form.servicio = id.to_string();
    let outcome: ActionState<()> = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(venta) => match state
            .backend()
            .registrar_venta_servicio(&user.token, &venta)
            .await
        {
            Ok(()) => {
                guardar_nota(&state, &user, id, &venta).await;
                ActionState::done()
            }
            Err(e) => backend_failure(&e, ERROR),
        },
    };

    if wants_json(&headers) {
        return Ok(action_json(outcome));
    }
    if is_htmx(&headers) {
        return Ok(row_action(&outcome, "Venta del servicio registrada", ERROR, false));
    }
    if outcome.success {
        return Ok(redirect_after(&headers, SERVICIOS_PATH));
    }
    let template = page(
        &state,
        &user,
        theme,
        &ServiciosQuery::default(),
        ServicioForm::default(),
        outcome,
    )
    .await?;
    Ok(template.into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_parse_estado_uses_wire_labels() {
        assert_eq!(parse_estado("En Proceso").unwrap(), ServicioEstado::EnProceso);
        assert!(parse_estado("EnProceso").is_err());
        assert_eq!(parse_pago(" Parcial ").unwrap(), EstadoPago::Parcial);
        assert!(parse_pago("pagado").is_err());
    }

    fn servicio() -> Servicio {
        serde_json::from_value(serde_json::json!({
            "noDeServicio": 12,
            "fecha": "2025-05-10",
            "aparato": "Refrigerador",
            "telefono": "2221234567",
            "cliente": "Luis Hernández",
            "observaciones": "No enfría",
            "estado": "En Proceso",
            "marca": "Whirlpool",
            "estado_pago": "Parcial"
        }))
        .unwrap()
    }

    #[test]
    fn test_servicio_form_round_trips_ticket() {
        let servicio = servicio();
        let form = servicio_form(&servicio);
        assert_eq!(form.fecha, "2025-05-10");
        assert_eq!(form.estado, "En Proceso");
        assert_eq!(
            form.validate().unwrap(),
            Servicio {
                estado_pago: None,
                ..servicio
            }
        );
    }

    #[test]
    fn test_nota_form_falls_back_to_ticket() {
        let id = ServicioId::new(12);
        let form = nota_form(id, &servicio());
        assert_eq!(form.servicio, "12");
        assert_eq!(form.mano_obra, None);
        assert_eq!(form.observaciones.as_deref(), Some("No enfría"));
        assert_eq!(form.garantia_dias.as_deref(), Some("30"));
        assert_eq!(form.estado_pago.as_deref(), Some("Parcial"));

        let con_nota = Servicio {
            nota: Some(NotaServicio {
                labor_cost: Some(Price::from_centavos(30_000)),
                notes: Some("Compresor nuevo".into()),
                warranty: Some(90),
                ..NotaServicio::default()
            }),
            ..servicio()
        };
        let form = nota_form(id, &con_nota);
        assert_eq!(form.mano_obra.as_deref(), Some("300.00"));
        assert_eq!(form.observaciones.as_deref(), Some("Compresor nuevo"));
        assert_eq!(form.garantia_dias.as_deref(), Some("90"));
    }

    #[test]
    fn test_row_action_keeps_row_on_failure() {
        let failed: ActionState<()> = ActionState::failed("Sin permiso");
        let response = row_action(&failed, "Servicio eliminado", "Error", true);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("hx-reswap").unwrap(), "none");

        let response = row_action(&ActionState::done(), "Servicio eliminado", "Error", true);
        assert!(response.headers().get("hx-reswap").is_none());
        assert!(response.headers().get("hx-trigger").is_some());

        let response = row_action(&ActionState::done(), "Venta registrada", "Error", false);
        assert_eq!(response.headers().get("hx-reswap").unwrap(), "none");
    }
}
