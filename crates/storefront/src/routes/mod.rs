//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /categorias                     - Category listing
//! GET  /categorias/{id}                - Parts in a category (?marca=&estado=)
//! GET  /categorias/{id}/{codigo}       - Part detail
//! GET  /buscar                         - Search (?q=&page=)
//!
//! # Cart (session, HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout                       - Address step
//! POST /checkout/direcciones           - Create an address
//! POST /checkout/nueva                 - Open the creation form
//! POST /checkout/cancelar              - Close the creation form
//! POST /checkout/seleccionar           - Select an address
//! POST /checkout/continuar             - Go to extra delivery info
//! GET  /addresses/extra-info-details   - Extra delivery info form
//! POST /addresses/extra-info-details   - Save extra delivery info
//! GET  /checkout/confirmar             - Order summary
//! POST /checkout/confirmar             - Place the order
//!
//! # Account
//! GET  /cuenta/login                   - Login page
//! POST /cuenta/login                   - Login action (rate limited)
//! GET  /cuenta/registro                - Register page
//! POST /cuenta/registro                - Register action (rate limited)
//! POST /cuenta/logout                  - Logout action
//! GET  /cuenta/forgot-password         - Password reset request page
//! POST /cuenta/forgot-password         - Request a reset link (rate limited)
//! GET  /cuenta/reset-password/{uid}/{token}  - Reset form
//! POST /cuenta/reset-password/{uid}/{token}  - Set the new password
//!
//! # Profile (requires auth)
//! GET  /cuenta/perfil                          - Profile page
//! POST /cuenta/perfil                          - Save profile
//! POST /cuenta/perfil/password                 - Change password
//! GET  /cuenta/perfil/direcciones              - Address book
//! POST /cuenta/perfil/direcciones              - Add an address
//! POST /cuenta/perfil/direcciones/{id}         - Edit an address
//! POST /cuenta/perfil/direcciones/{id}/eliminar   - Delete an address
//! POST /cuenta/perfil/direcciones/{id}/principal  - Make it primary
//! GET  /cuenta/perfil/favoritos                - Favorite parts
//! GET  /cuenta/perfil/pedidos                  - Order history (?page=)
//! POST /favoritos/{id}                         - Toggle a favorite
//!
//! # Content
//! GET  /blog                   - Blog index
//! GET  /blog/{slug}            - Blog post
//! POST /newsletter             - Newsletter subscription
//! GET  /contacto               - Contact form
//! POST /contacto               - Send a message (rate limited)
//! ```

pub mod auth;
pub mod blog;
pub mod cart;
pub mod catalogo;
pub mod checkout;
pub mod contacto;
pub mod direcciones;
pub mod favoritos;
pub mod home;
pub mod newsletter;
pub mod perfil;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalogo_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalogo::index))
        .route("/{id}", get(catalogo::categoria))
        .route("/{id}/{codigo}", get(catalogo::refaccion))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/direcciones", post(checkout::crear_direccion))
        .route("/nueva", post(checkout::nueva))
        .route("/cancelar", post(checkout::cancelar))
        .route("/seleccionar", post(checkout::seleccionar))
        .route("/continuar", post(checkout::continuar))
        .route(
            "/confirmar",
            get(checkout::confirmar_page).post(checkout::confirmar),
        )
}

/// Create the auth routes router.
///
/// Form submissions that hit the backend's credential endpoints are rate
/// limited per client IP; the pages themselves are not.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/registro", post(auth::registro))
        .route("/forgot-password", post(auth::forgot_password))
        .route(
            "/reset-password/{uid}/{token}",
            post(auth::reset_password),
        )
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/registro", get(auth::registro_page))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route(
            "/reset-password/{uid}/{token}",
            get(auth::reset_password_page),
        )
        .merge(limited)
}

/// Create the profile routes router.
pub fn perfil_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(perfil::show).post(perfil::update))
        .route("/password", post(perfil::change_password))
        .route("/pedidos", get(perfil::pedidos))
        .route("/favoritos", get(favoritos::index))
        .route(
            "/direcciones",
            get(direcciones::index).post(direcciones::create),
        )
        .route("/direcciones/{id}", post(direcciones::update))
        .route("/direcciones/{id}/eliminar", post(direcciones::delete))
        .route("/direcciones/{id}/principal", post(direcciones::set_primary))
}

/// Create the contact page router. Sending is rate limited per client IP.
pub fn contacto_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/contacto", post(contacto::send))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/contacto", get(contacto::show))
        .merge(limited)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/health", get(home::health))
        // Catalog
        .nest("/categorias", catalogo_routes())
        .route("/buscar", get(catalogo::buscar))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        .route(
            "/addresses/extra-info-details",
            get(checkout::extra_info_page).post(checkout::extra_info),
        )
        // Account
        .nest("/cuenta", auth_routes())
        .nest("/cuenta/perfil", perfil_routes())
        .route("/favoritos/{id}", post(favoritos::toggle))
        // Content
        .route("/blog", get(blog::index))
        .route("/blog/{slug}", get(blog::show))
        .route("/newsletter", post(newsletter::subscribe))
        .merge(contacto_routes())
}
