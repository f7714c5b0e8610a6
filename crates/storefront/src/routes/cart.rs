//! Cart route handlers.
//!
//! The cart lives in the visitor's session and every edit is a
//! [`CartAction`] applied to it; nothing here calls the backend. HTMX
//! requests get the updated fragment plus a `cart-updated` trigger, JSON
//! clients get an `ActionState` with the cart summary.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use refaccionaria_core::cart::{Cart, CartAction, CartItem, NewCartItem, is_valid_unit_price};
use refaccionaria_core::{ActionState, Price, RefaccionId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::middleware::session::{self, keys};
use crate::respond::{CART_UPDATED, action_json, is_htmx, wants_json};
use crate::views::Layout;

/// Cart line display data for templates.
#[derive(Clone, Serialize)]
pub struct CartItemView {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub category: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            image: item.image.clone(),
            category: item.category.clone().unwrap_or_default(),
            quantity: item.quantity,
            price: item.price.display(),
            line_price: item.subtotal().display(),
        }
    }
}

/// Cart display data for templates and JSON responses.
#[derive(Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.total_price().display(),
            item_count: cart.total_items(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data. The product snapshot travels with the form.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: RefaccionId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: Option<String>,
    pub quantity: Option<u32>,
}

/// Update cart form data. Zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: RefaccionId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: RefaccionId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Apply `action` to the session cart and persist it.
async fn mutate(session: &Session, action: CartAction) -> Result<Cart> {
    let cart: Cart = session::load(session, keys::CART).await;
    let cart = cart.apply(action);
    session::store(session, keys::CART, &cart).await?;
    Ok(cart)
}

/// Respond to a cart edit according to who asked.
fn edited(headers: &HeaderMap, cart: &Cart, fragment: CartFragment) -> Response {
    let view = CartView::from(cart);
    if wants_json(headers) {
        return action_json(ActionState::ok(view));
    }
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }
    let trigger = AppendHeaders([("HX-Trigger", CART_UPDATED)]);
    match fragment {
        CartFragment::Count => (
            trigger,
            CartCountTemplate {
                count: view.item_count,
            },
        )
            .into_response(),
        CartFragment::Items => (trigger, CartItemsTemplate { cart: view }).into_response(),
    }
}

enum CartFragment {
    Count,
    Items,
}

/// Display cart page.
#[instrument(skip(session, auth))]
pub async fn show(session: Session, OptionalAuth(auth): OptionalAuth) -> impl IntoResponse {
    let cart: Cart = session::load(&session, keys::CART).await;
    CartShowTemplate {
        layout: Layout::load(&session, &auth).await,
        cart: CartView::from(&cart),
    }
}

const INVALID_PRICE: &str = "Precio inválido";

/// Add item to cart.
///
/// The price comes from the client, so one outside the catalog's range is
/// refused before it reaches the session.
#[instrument(skip(session, headers))]
pub async fn add(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    if !is_valid_unit_price(form.price) {
        tracing::warn!(refaccion = %form.id, price = %form.price.amount(), "Rejected cart price");
        if wants_json(&headers) {
            return Ok(action_json(ActionState::<CartView>::failed(INVALID_PRICE)));
        }
        return Err(AppError::BadRequest(INVALID_PRICE.to_owned()));
    }
    let id = form.id.to_string();
    let cart = mutate(
        &session,
        CartAction::Add {
            item: NewCartItem {
                id: form.id,
                name: form.name,
                price: form.price,
                image: form.image,
                category: form.category,
            },
            quantity: form.quantity.unwrap_or(1),
        },
    )
    .await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("refaccion_id", &id)]));
    Ok(edited(&headers, &cart, CartFragment::Count))
}

/// Update cart item quantity.
#[instrument(skip(session, headers))]
pub async fn update(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let cart = mutate(
        &session,
        CartAction::UpdateQuantity {
            id: form.id,
            quantity: form.quantity,
        },
    )
    .await?;
    Ok(edited(&headers, &cart, CartFragment::Items))
}

/// Remove item from cart.
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let cart = mutate(&session, CartAction::Remove { id: form.id }).await?;
    Ok(edited(&headers, &cart, CartFragment::Items))
}

/// Empty the cart.
#[instrument(skip(session, headers))]
pub async fn clear(session: Session, headers: HeaderMap) -> Result<Response> {
    let cart = mutate(&session, CartAction::Clear).await?;
    Ok(edited(&headers, &cart, CartFragment::Items))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart: Cart = session::load(&session, keys::CART).await;
    CartCountTemplate {
        count: cart.total_items(),
    }
}
