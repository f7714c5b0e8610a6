//! Customer sign-in against a fake backend.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::extract::Json;
use axum::http::{Request, StatusCode, header};
use axum::routing::post;
use refaccionaria_integration_tests::{Recorder, body_text, spawn_backend, storefront_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn backend() -> Router {
    Router::new().route(
        "/user/login/",
        post(|Json(body): Json<Value>| async move {
            if body["password"] == "correcta" {
                (
                    StatusCode::OK,
                    Json(json!({
                        "usuario": "ana",
                        "access": "acceso.jwt.firma",
                        "refresh": "refresco.jwt.firma"
                    })),
                )
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "detail": "No active account found" })),
                )
            }
        }),
    )
}

fn login_request() -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri("/cuenta/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.7")
}

#[tokio::test]
async fn test_login_sets_auth_cookies_and_redirects() {
    let recorder = Recorder::default();
    let api = spawn_backend(backend(), recorder.clone()).await;
    let app = storefront_app(&api);

    let response = app
        .oneshot(
            login_request()
                .body(Body::from(
                    "email=Ana%40Example.com&password=correcta&next=%2Fcheckout",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/checkout");
    let cookies: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("access_cookie=acceso.jwt.firma")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_cookie=refresco.jwt.firma")));
    assert!(cookies.iter().any(|c| c.starts_with("username=ana")));

    let sent = recorder.find("/user/login/").unwrap();
    assert_eq!(sent.body["email"], "ana@example.com");
    assert!(sent.authorization.is_none());
}

#[tokio::test]
async fn test_rejected_login_shows_generic_message() {
    let api = spawn_backend(backend(), Recorder::default()).await;
    let app = storefront_app(&api);

    let response = app
        .oneshot(
            login_request()
                .header(header::ACCEPT, "application/json")
                .body(Body::from("email=ana%40example.com&password=otra"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .all(|c| !c.to_str().unwrap().starts_with("access_cookie="))
    );
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Correo o contraseña incorrectos");
}

#[tokio::test]
async fn test_health() {
    let api = spawn_backend(Router::new(), Recorder::default()).await;
    let response = storefront_app(&api)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
