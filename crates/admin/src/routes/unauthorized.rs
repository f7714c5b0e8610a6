//! Page for visitors without staff permissions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::filters;
use crate::middleware::Theme;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UnauthorizedQuery {
    pub next: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "unauthorized.html")]
pub struct UnauthorizedTemplate {
    pub theme: Theme,
    pub login_url: String,
}

/// Keep `next` only when it points back into the back office.
fn safe_next(next: Option<&str>) -> &str {
    next.filter(|n| n.starts_with("/admin") && !n.starts_with("//"))
        .unwrap_or("/admin/dashboard")
}

/// 403 page linking to the storefront sign-in.
pub async fn show(
    State(state): State<AppState>,
    theme: Theme,
    Query(query): Query<UnauthorizedQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref());
    (
        StatusCode::FORBIDDEN,
        UnauthorizedTemplate {
            theme,
            login_url: state.config().login_url(next),
        },
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/admin/pedidos")), "/admin/pedidos");
        assert_eq!(safe_next(Some("https://evil.example")), "/admin/dashboard");
        assert_eq!(safe_next(Some("//evil.example/admin")), "/admin/dashboard");
        assert_eq!(safe_next(None), "/admin/dashboard");
    }
}
