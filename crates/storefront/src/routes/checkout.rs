//! Checkout: address step, extra delivery info, order confirmation.
//!
//! ```text
//! GET  /checkout                        address list or creation form
//! POST /checkout/direcciones            create an address (auto-selected)
//! POST /checkout/nueva | cancelar       open / close the creation form
//! POST /checkout/seleccionar            select an address
//! POST /checkout/continuar              go to extra delivery info
//! GET  /addresses/extra-info-details    delivery details for the address
//! POST /addresses/extra-info-details    save them, go to confirmation
//! GET  /checkout/confirmar              order summary
//! POST /checkout/confirmar              place the order, clear the cart
//! ```
//!
//! The address step is a [`CheckoutFlow`] kept in the session and re-synced
//! with the backend's address list on every render.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use refaccionaria_core::cart::{Cart, CartAction};
use refaccionaria_core::checkout::{CheckoutEvent, CheckoutFlow};
use refaccionaria_core::models::{CheckoutResponse, Direccion, ExtraInfo};
use refaccionaria_core::validation::{DireccionForm, DireccionUpdate, ExtraInfoForm};
use refaccionaria_core::{ActionState, DireccionId, TipoLugar};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartView;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::session::{self, keys};
use crate::middleware::{AuthContext, CurrentUser, RequireAuth};
use crate::respond::{
    CART_UPDATED, action_json, backend_failure, negotiate, redirect_after, wants_json,
};
use crate::state::AppState;
use crate::views::{DireccionView, Layout};

// =============================================================================
// Templates
// =============================================================================

/// Address step.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/direcciones.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub direcciones: Vec<DireccionView>,
    pub showing_form: bool,
    pub can_cancel: bool,
    pub can_continue: bool,
    pub form: DireccionForm,
    pub state: ActionState<()>,
}

/// Option in the place type select.
#[derive(Clone)]
pub struct TipoLugarOption {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Extra delivery info step.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/extra_info.html")]
pub struct ExtraInfoTemplate {
    pub layout: Layout,
    pub direccion: DireccionView,
    pub tipos: Vec<TipoLugarOption>,
    pub form: ExtraInfoForm,
    pub state: ActionState<()>,
}

/// Order summary before placing it.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmar.html")]
pub struct ConfirmarTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub direccion: Option<DireccionView>,
    pub state: ActionState<()>,
}

/// Order placed.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/completado.html")]
pub struct CompletadoTemplate {
    pub layout: Layout,
    pub pedido_id: i32,
    pub total: String,
    pub estado: &'static str,
}

// =============================================================================
// Helpers
// =============================================================================

/// Load the flow from the session and sync it with the backend's addresses.
async fn load_flow(state: &AppState, session: &Session, user: &CurrentUser) -> Result<CheckoutFlow> {
    let direcciones = state.backend().direcciones(&user.token).await?;
    let stored: Option<CheckoutFlow> = session::load(session, keys::CHECKOUT).await;
    let flow = match stored {
        Some(flow) => flow.sync(direcciones),
        None => CheckoutFlow::from_addresses(direcciones),
    };
    session::store(session, keys::CHECKOUT, &Some(&flow)).await?;
    Ok(flow)
}

async fn save_flow(session: &Session, flow: &CheckoutFlow) -> Result<()> {
    session::store(session, keys::CHECKOUT, &Some(flow)).await?;
    Ok(())
}

async fn address_step(
    session: &Session,
    user: &CurrentUser,
    flow: &CheckoutFlow,
    form: DireccionForm,
    state: ActionState<()>,
) -> Response {
    let cart: Cart = session::load(session, keys::CART).await;
    let auth = AuthContext::signed_in(user);
    CheckoutTemplate {
        layout: Layout::load(session, &auth).await,
        cart: CartView::from(&cart),
        direcciones: flow
            .direcciones()
            .iter()
            .map(|d| DireccionView::new(d, flow.is_selected(&d.id)))
            .collect(),
        showing_form: flow.showing_form(),
        can_cancel: flow.can_cancel(),
        can_continue: flow.can_continue(),
        form,
        state,
    }
    .into_response()
}

fn tipos(selected: Option<&str>) -> Vec<TipoLugarOption> {
    TipoLugar::ALL
        .iter()
        .map(|t| TipoLugarOption {
            code: t.code(),
            label: t.label(),
            selected: selected == Some(t.code()),
        })
        .collect()
}

fn extra_form(extra: &ExtraInfo) -> ExtraInfoForm {
    ExtraInfoForm {
        tipo_lugar: extra.tipo_lugar.map(|t| t.code().to_owned()),
        barrio_privado: extra.barrio_privado,
        conserjeria: extra.conserjeria,
        nombre_lugar: extra.nombre_lugar.clone(),
        horario_apertura: extra.horario_apertura.clone(),
        horario_cierre: extra.horario_cierre.clone(),
        horario_24hs: extra.horario_24hs,
    }
}

// =============================================================================
// Address step
// =============================================================================

/// Display the address step. An empty cart goes back to the cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let cart: Cart = session::load(&session, keys::CART).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }
    let flow = load_flow(&state, &session, &user).await?;
    Ok(address_step(&session, &user, &flow, DireccionForm::default(), ActionState::idle()).await)
}

/// Create an address from the checkout form; it becomes the selection.
///
/// JSON clients get the created address as `data`.
#[instrument(skip(state, session, user, headers, form))]
pub async fn crear_direccion(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<DireccionForm>,
) -> Result<Response> {
    let mut flow = load_flow(&state, &session, &user).await?;

    let outcome: ActionState<Direccion> = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(nueva) => match state.backend().crear_direccion(&user.token, &nueva).await {
            Ok(direccion) => ActionState::ok(direccion),
            Err(e) => backend_failure(&e, "Error al crear la dirección"),
        },
    };

    if let Some(direccion) = &outcome.data {
        flow = match flow.apply(CheckoutEvent::Created(direccion.clone())) {
            Ok(flow) | Err((flow, _)) => flow,
        };
        save_flow(&session, &flow).await?;
    }

    if wants_json(&headers) {
        return Ok(action_json(outcome));
    }
    let (form, shown) = if outcome.success {
        (DireccionForm::default(), ActionState::done())
    } else {
        (form, outcome.map(|_| ()))
    };
    Ok(address_step(&session, &user, &flow, form, shown).await)
}

/// Open the creation form.
#[instrument(skip(state, session, user, headers))]
pub async fn nueva(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Response> {
    transition(&state, &session, &user, &headers, CheckoutEvent::ShowForm).await
}

/// Close the creation form when there is a list to go back to.
#[instrument(skip(state, session, user, headers))]
pub async fn cancelar(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Response> {
    transition(&state, &session, &user, &headers, CheckoutEvent::CancelForm).await
}

#[derive(Debug, Deserialize)]
pub struct SeleccionarForm {
    pub direccion_id: DireccionId,
}

/// Select an address.
#[instrument(skip(state, session, user, headers))]
pub async fn seleccionar(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<SeleccionarForm>,
) -> Result<Response> {
    transition(
        &state,
        &session,
        &user,
        &headers,
        CheckoutEvent::Select(form.direccion_id),
    )
    .await
}

async fn transition(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    headers: &HeaderMap,
    event: CheckoutEvent,
) -> Result<Response> {
    let flow = load_flow(state, session, user).await?;
    let (flow, outcome) = match flow.apply(event) {
        Ok(flow) => (flow, ActionState::<()>::done()),
        Err((flow, e)) => (flow, ActionState::failed(e.to_string())),
    };
    save_flow(session, &flow).await?;

    if wants_json(headers) {
        return Ok(action_json(outcome));
    }
    Ok(address_step(session, user, &flow, DireccionForm::default(), outcome).await)
}

/// Continue with the selected address.
#[instrument(skip(state, session, user, headers))]
pub async fn continuar(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Response> {
    let flow = load_flow(&state, &session, &user).await?;
    match flow.continue_url() {
        Ok(url) => Ok(redirect_after(&headers, &url)),
        Err(e) => {
            let failed = ActionState::failed(e.to_string());
            if wants_json(&headers) {
                return Ok(action_json(failed));
            }
            Ok(address_step(&session, &user, &flow, DireccionForm::default(), failed).await)
        }
    }
}

// =============================================================================
// Extra delivery info
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ExtraInfoQuery {
    pub direccion_id: DireccionId,
}

async fn find_direccion(
    state: &AppState,
    user: &CurrentUser,
    id: DireccionId,
) -> Result<Direccion> {
    state
        .backend()
        .direcciones(&user.token)
        .await?
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| AppError::NotFound(format!("dirección {id}")))
}

/// Display the extra delivery info form for an address.
#[instrument(skip(state, session, user))]
pub async fn extra_info_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ExtraInfoQuery>,
) -> Result<impl IntoResponse> {
    let direccion = find_direccion(&state, &user, query.direccion_id).await?;
    let form = extra_form(&direccion.extra);
    let auth = AuthContext::signed_in(&user);
    Ok(ExtraInfoTemplate {
        layout: Layout::load(&session, &auth).await,
        direccion: DireccionView::new(&direccion, true),
        tipos: tipos(form.tipo_lugar.as_deref()),
        form,
        state: ActionState::idle(),
    })
}

/// Save the extra delivery info and go to the order summary.
#[instrument(skip(state, session, user, headers, form))]
pub async fn extra_info(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Query(query): Query<ExtraInfoQuery>,
    Form(form): Form<ExtraInfoForm>,
) -> Result<Response> {
    let id = query.direccion_id;
    let outcome = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(extra) => match state
            .backend()
            .actualizar_direccion(&user.token, id, &DireccionUpdate::extra_info(extra))
            .await
        {
            Ok(_) => ActionState::<()>::done(),
            Err(e) => backend_failure(
                &e,
                "Error al actualizar la información extra de la dirección",
            ),
        },
    };

    if outcome.success {
        return Ok(redirect_after(&headers, "/checkout/confirmar"));
    }

    let direccion = find_direccion(&state, &user, id).await?;
    let auth = AuthContext::signed_in(&user);
    let layout = Layout::load(&session, &auth).await;
    Ok(negotiate(&headers, outcome, |state| {
        ExtraInfoTemplate {
            layout,
            direccion: DireccionView::new(&direccion, true),
            tipos: tipos(form.tipo_lugar.as_deref()),
            form,
            state,
        }
        .into_response()
    }))
}

// =============================================================================
// Confirmation
// =============================================================================

async fn summary(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    outcome: ActionState<()>,
) -> Result<Response> {
    let flow = load_flow(state, session, user).await?;
    let cart: Cart = session::load(session, keys::CART).await;
    let auth = AuthContext::signed_in(user);
    Ok(ConfirmarTemplate {
        layout: Layout::load(session, &auth).await,
        cart: CartView::from(&cart),
        direccion: flow.selected_direccion().map(|d| DireccionView::new(d, true)),
        state: outcome,
    }
    .into_response())
}

/// Display the order summary.
#[instrument(skip(state, session, user))]
pub async fn confirmar_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let cart: Cart = session::load(&session, keys::CART).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }
    summary(&state, &session, &user, ActionState::idle()).await
}

/// Place the order for the cart lines.
///
/// Only ids and quantities are sent; the backend prices the order. The cart
/// and the checkout flow are cleared once the order exists.
#[instrument(skip(state, session, user, headers))]
pub async fn confirmar(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Response> {
    let cart: Cart = session::load(&session, keys::CART).await;
    let items = cart.checkout_items();
    if items.is_empty() {
        let failed = ActionState::<CheckoutResponse>::failed("Tu carrito está vacío");
        if wants_json(&headers) {
            return Ok(action_json(failed));
        }
        return Ok(redirect_after(&headers, "/cart"));
    }

    let pedido = match state.backend().checkout(&user.token, &items).await {
        Ok(pedido) => pedido,
        Err(e) => {
            let failed: ActionState<()> = backend_failure(&e, "Error al crear el pedido");
            if wants_json(&headers) {
                return Ok(action_json(failed));
            }
            return summary(&state, &session, &user, failed).await;
        }
    };

    let cleared = cart.apply(CartAction::Clear);
    session::store(&session, keys::CART, &cleared).await?;
    session::store(&session, keys::CHECKOUT, &None::<CheckoutFlow>).await?;

    let pedido_id = pedido.pedido_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("pedido_id", pedido_id.as_str())]));
    tracing::info!(pedido_id = %pedido.pedido_id, total = %pedido.total, "Order placed");

    if wants_json(&headers) {
        return Ok(action_json(ActionState::ok(pedido)));
    }

    let auth = AuthContext::signed_in(&user);
    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED)]),
        CompletadoTemplate {
            layout: Layout::load(&session, &auth).await,
            pedido_id: pedido.pedido_id.as_i32(),
            total: pedido.total.display(),
            estado: pedido.estado.label(),
        },
    )
        .into_response())
}
