//! Refaccionaria Storefront library.
//!
//! Public catalog, session cart, checkout and customer account pages,
//! rendered server-side against the backend REST API. Exposed as a library
//! so the router can be exercised in tests without binding a port.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod respond;
pub mod routes;
pub mod state;
pub mod views;

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::service::SignedCookie;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the storefront router with every layer except Sentry's.
///
/// `static_dir` is served under `/static`.
pub fn app(
    state: AppState,
    session_layer: SessionManagerLayer<MemoryStore, SignedCookie>,
    static_dir: impl AsRef<Path>,
) -> Router {
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
