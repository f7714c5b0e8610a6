//! Response helpers shared by the back office handlers.
//!
//! Table actions answer HTMX with a re-rendered row plus an `HX-Trigger`
//! toast; forms produce an [`ActionState`] that JSON clients receive as is.

use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};
use refaccionaria_core::ActionState;
use serde::Serialize;

use crate::backend::BackendError;

/// Whether the client asked for JSON.
#[must_use]
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

/// Whether the request came from HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// `ActionState` as a JSON response.
pub fn action_json<T: Serialize>(state: ActionState<T>) -> Response {
    Json(state).into_response()
}

/// JSON for API clients, otherwise whatever `page` renders.
pub fn negotiate<T: Serialize>(
    headers: &HeaderMap,
    state: ActionState<T>,
    page: impl FnOnce(ActionState<T>) -> Response,
) -> Response {
    if wants_json(headers) {
        action_json(state)
    } else {
        page(state)
    }
}

/// Successful action that navigates elsewhere.
///
/// JSON clients get `{"success": true, "error": null}`, HTMX an
/// `HX-Redirect`, browsers a 303.
pub fn redirect_after(headers: &HeaderMap, location: &str) -> Response {
    if wants_json(headers) {
        return action_json(ActionState::<()>::done());
    }
    if is_htmx(headers) {
        if let Ok(value) = HeaderValue::from_str(location) {
            return [(HeaderName::from_static("hx-redirect"), value)].into_response();
        }
    }
    Redirect::to(location).into_response()
}

/// Turn a backend failure into the state shown on the form.
///
/// Server-side failures are logged here; the user sees `default` or the
/// backend's own message.
pub fn backend_failure<T>(error: &BackendError, default: &str) -> ActionState<T> {
    if error.is_server_error() {
        tracing::error!(error = %error, "Backend call failed");
    } else {
        tracing::debug!(error = %error, "Backend rejected action");
    }
    ActionState::failed(error.to_action_error(default))
}

/// `HX-Trigger` header showing an error toast.
#[must_use]
pub fn toast_error(message: &str) -> [(HeaderName, HeaderValue); 1] {
    toast("error", message)
}

/// `HX-Trigger` header showing a confirmation toast.
#[must_use]
pub fn toast_success(message: &str) -> [(HeaderName, HeaderValue); 1] {
    toast("success", message)
}

/// Toast for a row action: `ok` on success, otherwise the failure's message.
///
/// Field-scoped failures show their first field message since a table row
/// has nowhere to render it inline.
#[must_use]
pub fn outcome_toast<T>(
    outcome: &ActionState<T>,
    ok: &str,
    default_error: &str,
) -> [(HeaderName, HeaderValue); 1] {
    if outcome.success {
        return toast_success(ok);
    }
    let field_message = outcome
        .field_errors()
        .and_then(|errors| errors.iter().find_map(|(_, messages)| messages.first()));
    toast_error(
        outcome
            .message()
            .or(field_message.map(String::as_str))
            .unwrap_or(default_error),
    )
}

fn toast(kind: &'static str, message: &str) -> [(HeaderName, HeaderValue); 1] {
    let payload = serde_json::json!({ "toast": { "kind": kind, "message": message } });
    let value = HeaderValue::from_str(&ascii_json(&payload.to_string()))
        .unwrap_or_else(|_| HeaderValue::from_static(r#"{"toast":{}}"#));
    [(HeaderName::from_static("hx-trigger"), value)]
}

/// Escape non-ASCII characters as `\uXXXX` so the JSON fits in a header.
fn ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units).iter() {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
