//! Contact page.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use refaccionaria_integration_tests::{Recorder, body_text, spawn_backend, storefront_app};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let api = spawn_backend(Router::new(), Recorder::default()).await;
    storefront_app(&api)
}

fn send() -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri("/contacto")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "198.51.100.20")
}

const MENSAJE: &str = "name=Rosa+Mart%C3%ADnez&email=rosa%40example.com&subject=Cotizaci%C3%B3n\
                       &message=Busco+termostato&priority=high&terms=on";

#[tokio::test]
async fn test_contact_page_renders_form() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/contacto").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"action="/contacto""#));
    assert!(body.contains(r#"<option value="normal" selected>"#));
}

#[tokio::test]
async fn test_contact_message_shows_confirmation() {
    let response = app()
        .await
        .oneshot(send().body(Body::from(MENSAJE)).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("¡Mensaje enviado!"));
    assert!(!body.contains(r#"action="/contacto""#));
}

#[tokio::test]
async fn test_contact_without_terms_keeps_input() {
    let response = app()
        .await
        .oneshot(
            send()
                .body(Body::from(
                    "name=Rosa&email=rosa%40example.com&subject=Hola&message=Busco+termostato\
                     &priority=urgent",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Debes aceptar los términos y condiciones"));
    assert!(body.contains(r#"name="subject" value="Hola""#));
    assert!(body.contains(r#"<option value="urgent" selected>"#));
    assert!(!body.contains("¡Mensaje enviado!"));
}

#[tokio::test]
async fn test_contact_json_reports_field_errors() {
    let response = app()
        .await
        .oneshot(
            send()
                .header(header::ACCEPT, "application/json")
                .body(Body::from("email=no-es-correo&terms=on"))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"]["email"],
        json!({ "_errors": ["Por favor ingresa un email válido"] })
    );
    assert!(json["error"]["name"].is_object());
    assert!(json["error"].get("terms").is_none());
}
