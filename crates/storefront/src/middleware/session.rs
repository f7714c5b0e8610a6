//! Session middleware configuration.
//!
//! Sessions hold the visitor's cart and checkout flow. They live in process
//! memory and the cookie carrying the session id is signed with
//! `STOREFRONT_SESSION_SECRET`.

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "refaccionaria_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Keys stored in the session.
pub mod keys {
    pub const CART: &str = "cart";
    pub const CHECKOUT: &str = "checkout";
}

/// Create the session layer with the in-memory store.
///
/// # Errors
///
/// Returns an error if the session secret is too short to sign cookies.
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<MemoryStore, SignedCookie>, ConfigError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("STOREFRONT_SESSION_SECRET".to_string(), e.to_string())
    })?;

    Ok(SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.app_env.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

/// Read a value from the session, falling back to its default.
///
/// A value that no longer deserializes (e.g. after a deploy changed its
/// shape) is treated as absent.
pub async fn load<T: DeserializeOwned + Default>(session: &Session, key: &str) -> T {
    match session.get::<T>(key).await {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable session value");
            T::default()
        }
    }
}

/// Write a value to the session.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or the store fails.
pub async fn store<T: Serialize + Sync>(
    session: &Session,
    key: &str,
    value: &T,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(key, value).await
}
