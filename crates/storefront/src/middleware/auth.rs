//! Authentication extractors and the auth cookies.
//!
//! The backend issues a JWT pair at login. It is kept in three cookies:
//!
//! | Cookie | httpOnly | Lifetime | Lifetime with "recordarme" |
//! |---|---|---|---|
//! | `username` | no | 1 day | 7 days |
//! | `access_cookie` | yes | 15 min | 15 min |
//! | `refresh_cookie` | yes | 1 day | 7 days |
//!
//! Every request parses them into an [`AuthContext`]; handlers pass the
//! contained [`AccessToken`] to the backend client explicitly.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header, request::Parts},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use refaccionaria_core::models::LoginResponse;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

use crate::backend::AccessToken;
use crate::config::AppEnv;
use crate::respond::{is_htmx, wants_json};

pub const USERNAME_COOKIE: &str = "username";
pub const ACCESS_COOKIE: &str = "access_cookie";
pub const REFRESH_COOKIE: &str = "refresh_cookie";

/// Login page; protected pages redirect here with `?next=`.
pub const LOGIN_PATH: &str = "/cuenta/login";

/// Credentials found on the request.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub username: Option<String>,
    pub access: Option<AccessToken>,
}

impl AuthContext {
    /// Read the auth cookies from the `Cookie` headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut context = Self::default();
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok);

        for cookie in cookies {
            let value = cookie.value().trim();
            if value.is_empty() {
                continue;
            }
            match cookie.name() {
                USERNAME_COOKIE => context.username = Some(value.to_owned()),
                ACCESS_COOKIE => context.access = Some(AccessToken::new(value)),
                _ => {}
            }
        }
        context
    }

    /// Context for a request already known to be signed in.
    #[must_use]
    pub fn signed_in(user: &CurrentUser) -> Self {
        Self {
            username: Some(user.username.clone()),
            access: Some(user.token.clone()),
        }
    }

    /// The signed-in user, when an access token is present.
    #[must_use]
    pub fn user(self) -> Option<CurrentUser> {
        let token = self.access?;
        Some(CurrentUser {
            username: self.username.unwrap_or_default(),
            token,
        })
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }
}

/// A request carrying a usable access token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub token: AccessToken,
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor that requires a signed-in customer.
///
/// Page requests are redirected to the login page with the current path as
/// `next`; JSON and HTMX requests get 401, HTMX with an `HX-Redirect`.
///
/// # Example
///
/// ```rust,ignore
/// async fn perfil(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<..> {
///     let perfil = state.backend().perfil(&user.token).await?;
///     ...
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin(String),
    /// Unauthorized response (for JSON and HTMX requests).
    Unauthorized(String),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(location) => Redirect::to(&location).into_response(),
            Self::Unauthorized(location) => (
                StatusCode::UNAUTHORIZED,
                [(HeaderName::from_static("hx-redirect"), location)],
            )
                .into_response(),
        }
    }
}

/// Login URL that comes back to `parts`' path afterwards.
fn login_url(parts: &Parts) -> String {
    // Nested routers see the path with their prefix stripped.
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    let next = uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // An expired access token is not refreshed; the user signs in again.
        AuthContext::from_headers(&parts.headers)
            .user()
            .map(Self)
            .ok_or_else(|| {
                let location = login_url(parts);
                if wants_json(&parts.headers) || is_htmx(&parts.headers) {
                    AuthRejection::Unauthorized(location)
                } else {
                    AuthRejection::RedirectToLogin(location)
                }
            })
    }
}

/// Extractor that reads whatever auth cookies are present.
pub struct OptionalAuth(pub AuthContext);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(AuthContext::from_headers(&parts.headers)))
    }
}

// =============================================================================
// Cookies
// =============================================================================

const ACCESS_MAX_AGE: Duration = Duration::minutes(15);
const SESSION_MAX_AGE: Duration = Duration::days(1);
const REMEMBER_MAX_AGE: Duration = Duration::days(7);

fn auth_cookie(
    name: &'static str,
    value: String,
    http_only: bool,
    max_age: Duration,
    env: AppEnv,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .secure(env.secure_cookies())
        .path("/")
        .max_age(max_age)
        .build()
}

/// Cookies written after a successful login.
#[must_use]
pub fn login_cookies(login: &LoginResponse, remember: bool, env: AppEnv) -> Vec<Cookie<'static>> {
    let long = if remember {
        REMEMBER_MAX_AGE
    } else {
        SESSION_MAX_AGE
    };
    vec![
        auth_cookie(
            USERNAME_COOKIE,
            login.username().to_owned(),
            false,
            long,
            env,
        ),
        auth_cookie(ACCESS_COOKIE, login.access.clone(), true, ACCESS_MAX_AGE, env),
        auth_cookie(REFRESH_COOKIE, login.refresh.clone(), true, long, env),
    ]
}

/// Cookies that expire the three auth cookies.
#[must_use]
pub fn logout_cookies(env: AppEnv) -> Vec<Cookie<'static>> {
    [
        (USERNAME_COOKIE, false),
        (ACCESS_COOKIE, true),
        (REFRESH_COOKIE, true),
    ]
    .into_iter()
    .map(|(name, http_only)| auth_cookie(name, String::new(), http_only, Duration::ZERO, env))
    .collect()
}

/// `Set-Cookie` headers for a response.
#[must_use]
pub fn set_cookies(cookies: Vec<Cookie<'static>>) -> AppendHeaders<Vec<(HeaderName, HeaderValue)>> {
    AppendHeaders(
        cookies
            .into_iter()
            .filter_map(|cookie| {
                HeaderValue::from_str(&cookie.to_string())
                    .ok()
                    .map(|value| (header::SET_COOKIE, value))
            })
            .collect(),
    )
}
