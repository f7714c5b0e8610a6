//! Staff preferences.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};

use crate::middleware::{RequireStaff, Theme};
use crate::respond::is_htmx;
use crate::state::AppState;

/// Flip between the light and dark theme.
///
/// HTMX requests get `HX-Refresh` so the whole page repaints; plain form
/// posts go back to the referring page.
pub async fn toggle_theme(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    theme: Theme,
    headers: HeaderMap,
) -> Response {
    let next = theme.toggled();
    let cookie = next.cookie(state.config().app_env).to_string();
    let Ok(cookie) = HeaderValue::from_str(&cookie) else {
        return Redirect::to("/admin/dashboard").into_response();
    };

    if is_htmx(&headers) {
        return (
            [
                (header::SET_COOKIE, cookie),
                (
                    header::HeaderName::from_static("hx-refresh"),
                    HeaderValue::from_static("true"),
                ),
            ],
            "",
        )
            .into_response();
    }

    let back = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|r| url::Url::parse(r).ok())
        .map(|u| u.path().to_owned())
        .filter(|p| p.starts_with("/admin"))
        .unwrap_or_else(|| "/admin/dashboard".to_owned());
    ([(header::SET_COOKIE, cookie)], Redirect::to(&back)).into_response()
}
