//! Integration tests for Refaccionaria.
//!
//! Both binaries are driven through their routers with `tower::ServiceExt`
//! while a fake backend, an axum server on an ephemeral port, answers the
//! REST calls they make. Nothing outside the test process is needed:
//!
//! ```bash
//! cargo test -p refaccionaria-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// A request the fake backend received.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Requests seen by the fake backend, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    /// Everything recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    #[must_use]
    pub fn all(&self) -> Vec<Recorded> {
        self.0.lock().expect("recorder lock poisoned").clone()
    }

    /// The first request for `path`, if any.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<Recorded> {
        self.all().into_iter().find(|r| r.path == path)
    }
}

/// Wrap `routes` so every request is recorded, then serve it under `/api`
/// on an ephemeral port. Returns the base URL the clients should use.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn_backend(routes: Router, recorder: Recorder) -> String {
    let app = Router::new()
        .nest("/api", routes)
        .layer(axum::middleware::from_fn(move |request: Request<Body>, next: axum::middleware::Next| {
            let recorder = recorder.clone();
            async move {
                let (parts, body) = request.into_parts();
                let bytes = axum::body::to_bytes(body, usize::MAX)
                    .await
                    .unwrap_or_default();
                let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
                recorder
                    .0
                    .lock()
                    .expect("recorder lock poisoned")
                    .push(Recorded {
                        method: parts.method.to_string(),
                        path: parts.uri.path().trim_start_matches("/api").to_owned(),
                        query: parts.uri.query().map(str::to_owned),
                        authorization: parts
                            .headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_owned),
                        body: json,
                    });
                next.run(Request::from_parts(parts, Body::from(bytes))).await
            }
        }));

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}/api")
}

/// A JWT whose payload is `claims`. The signature is not checked by the
/// web binaries, only by the backend.
#[must_use]
pub fn jwt(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.firma")
}

/// Cookie header for a staff member.
#[must_use]
pub fn staff_cookie() -> String {
    let token = jwt(&serde_json::json!({
        "user_id": 1,
        "username": "mostrador",
        "is_staff": true
    }));
    format!("access_cookie={token}; username=mostrador")
}

/// Cookie header for a signed-in customer without back office access.
#[must_use]
pub fn customer_cookie() -> String {
    let token = jwt(&serde_json::json!({ "user_id": 9, "username": "ana" }));
    format!("access_cookie={token}; username=ana")
}

/// Admin router talking to the fake backend at `api_url`.
///
/// # Panics
///
/// Panics if `api_url` is not an http URL.
#[must_use]
pub fn admin_app(api_url: &str) -> Router {
    use refaccionaria_admin::config::{AdminConfig, ApiConfig, AppEnv};

    let config = AdminConfig {
        host: "127.0.0.1".parse().expect("loopback address"),
        port: 3001,
        base_url: "http://localhost:3001".to_owned(),
        storefront_url: "http://localhost:3000".to_owned(),
        api: ApiConfig::new(api_url, Duration::from_secs(5)).expect("fake backend URL"),
        app_env: AppEnv::Development,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    refaccionaria_admin::app(
        refaccionaria_admin::state::AppState::new(config),
        "../admin/static",
    )
}

/// Storefront router talking to the fake backend at `api_url`.
///
/// # Panics
///
/// Panics if `api_url` is not an http URL.
#[must_use]
pub fn storefront_app(api_url: &str) -> Router {
    use refaccionaria_storefront::config::{ApiConfig, AppEnv, StorefrontConfig};

    let config = StorefrontConfig {
        host: "127.0.0.1".parse().expect("loopback address"),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: secrecy::SecretString::from("k7#Qm2$vX9!pL4@wZ8&nR1*tY6^cB3%hJ5-fD0+gS".repeat(2)),
        api: ApiConfig::new(api_url, Duration::from_secs(5)).expect("fake backend URL"),
        app_env: AppEnv::Development,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let sessions = refaccionaria_storefront::middleware::create_session_layer(&config)
        .expect("session layer");
    refaccionaria_storefront::app(
        refaccionaria_storefront::state::AppState::new(config),
        sessions,
        "../storefront/static",
    )
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8_lossy(&bytes).into_owned()
}
