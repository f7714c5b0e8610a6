//! Staff authentication extractor.
//!
//! Staff sign in on the storefront, which stores the backend's JWT in the
//! `access_cookie`. The back office only reads the token's payload to decide
//! whether to render; it does not verify the signature. Every backend call
//! forwards the token and the backend enforces permissions itself.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{HeaderMap, HeaderName, StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tower_sessions::cookie::Cookie;

use crate::backend::AccessToken;

pub const ACCESS_COOKIE: &str = "access_cookie";
pub const USERNAME_COOKIE: &str = "username";

/// Page shown to visitors without staff permissions.
pub const UNAUTHORIZED_PATH: &str = "/admin/unauthorized";

/// The payload fields that grant back office access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StaffClaims {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub role: Option<String>,
}

impl StaffClaims {
    /// Decode the payload segment of a JWT.
    ///
    /// Returns `None` for anything that is not three dot-separated segments
    /// with a base64url JSON object in the middle.
    #[must_use]
    pub fn decode(jwt: &str) -> Option<Self> {
        let mut segments = jwt.split('.');
        let (Some(_), Some(payload), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.is_staff || self.is_admin || self.is_superuser || self.role.as_deref() == Some("admin")
    }
}

/// A staff member on the current request.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub username: String,
    pub token: AccessToken,
}

impl StaffUser {
    /// Read the `access_cookie` and keep it only if it grants staff access.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let mut access = None;
        let mut username = None;
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
                ACCESS_COOKIE => access = Some(value.to_owned()),
                USERNAME_COOKIE => username = Some(value.to_owned()),
                _ => {}
            }
        }

        let access = access?;
        let claims = StaffClaims::decode(&access).filter(StaffClaims::is_staff)?;
        Some(Self {
            username: claims.username.or(username).unwrap_or_else(|| "staff".to_owned()),
            token: AccessToken::new(access),
        })
    }
}

/// Extractor that requires a staff member.
///
/// Browsers are redirected to the unauthorized page with the current path as
/// `next`; HTMX requests get 401 with an `HX-Redirect`, API clients a bare 401.
pub struct RequireStaff(pub StaffUser);

pub enum StaffRejection {
    RedirectToUnauthorized(String),
    HtmxUnauthorized(String),
    Unauthorized,
}

impl IntoResponse for StaffRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToUnauthorized(location) => Redirect::to(&location).into_response(),
            Self::HtmxUnauthorized(location) => (
                StatusCode::UNAUTHORIZED,
                [(HeaderName::from_static("hx-redirect"), location)],
            )
                .into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

fn unauthorized_url(parts: &Parts) -> String {
    // Nested routers see the path with their prefix stripped.
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    format!(
        "{UNAUTHORIZED_PATH}?next={}",
        urlencoding::encode(uri.path())
    )
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = StaffRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = StaffUser::from_headers(&parts.headers) {
            sentry::configure_scope(|scope| {
                scope.set_user(Some(sentry::User {
                    username: Some(user.username.clone()),
                    ..Default::default()
                }));
            });
            return Ok(Self(user));
        }

        tracing::debug!(path = %parts.uri.path(), "Rejected request without staff claims");
        let location = unauthorized_url(parts);
        if crate::respond::is_htmx(&parts.headers) {
            Err(StaffRejection::HtmxUnauthorized(location))
        } else if accepts_html(&parts.headers) {
            Err(StaffRejection::RedirectToUnauthorized(location))
        } else {
            Err(StaffRejection::Unauthorized)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn jwt(payload: &serde_json::Value) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.firma",
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_each_flag_grants_access() {
        for payload in [
            serde_json::json!({ "is_staff": true }),
            serde_json::json!({ "is_admin": true }),
            serde_json::json!({ "is_superuser": true }),
            serde_json::json!({ "role": "admin" }),
        ] {
            let claims = StaffClaims::decode(&jwt(&payload)).unwrap();
            assert!(claims.is_staff(), "{payload}");
        }
    }

    #[test]
    fn test_customer_token_is_not_staff() {
        let claims =
            StaffClaims::decode(&jwt(&serde_json::json!({ "user_id": 7, "role": "cliente" })))
                .unwrap();
        assert!(!claims.is_staff());
    }

    #[test]
    fn test_decode_tolerates_padding() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"is_staff":true}"#);
        let token = format!("h.{payload}==.s");
        assert!(StaffClaims::decode(&token).unwrap().is_staff());
    }

    #[test]
    fn test_garbage_tokens() {
        assert!(StaffClaims::decode("").is_none());
        assert!(StaffClaims::decode("a.b").is_none());
        assert!(StaffClaims::decode("a.!!!.c").is_none());
        assert!(StaffClaims::decode("a.b.c.d").is_none());
    }

    #[test]
    fn test_staff_user_from_cookies() {
        let token = jwt(&serde_json::json!({ "is_staff": true, "username": "ana" }));
        let user = StaffUser::from_headers(&headers_with(&format!(
            "username=otra; access_cookie={token}"
        )))
        .unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(user.token.expose(), token);

        let token = jwt(&serde_json::json!({ "is_staff": false }));
        assert!(StaffUser::from_headers(&headers_with(&format!("access_cookie={token}"))).is_none());
        assert!(StaffUser::from_headers(&headers_with("username=ana")).is_none());
    }

    #[tokio::test]
    async fn test_rejection_by_client() {
        let request = axum::http::Request::builder()
            .uri("/admin/pedidos?page=2")
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();
        let Err(rejection) = RequireStaff::from_request_parts(&mut parts, &()).await else {
            panic!("expected rejection");
        };
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/unauthorized?next=%2Fadmin%2Fpedidos"
        );

        let request = axum::http::Request::builder()
            .uri("/admin/pedidos")
            .header(header::ACCEPT, "application/json")
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();
        let Err(rejection) = RequireStaff::from_request_parts(&mut parts, &()).await else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejection_inside_nested_router_keeps_full_path() {
        let request = axum::http::Request::builder()
            .uri("/7/estado")
            .header(header::ACCEPT, "text/html")
            .extension(OriginalUri("/admin/pedidos/7/estado".parse().unwrap()))
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();
        let Err(rejection) = RequireStaff::from_request_parts(&mut parts, &()).await else {
            panic!("expected rejection");
        };
        assert_eq!(
            rejection.into_response().headers().get(header::LOCATION).unwrap(),
            "/admin/unauthorized?next=%2Fadmin%2Fpedidos%2F7%2Festado"
        );
    }
}
