//! Cart and checkout flows against a fake backend.
//!
//! The cart lives in the session, so each test carries the session cookie
//! from one request to the next.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::extract::Json;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::{get, post};
use refaccionaria_integration_tests::{
    Recorded, Recorder, body_text, customer_cookie, spawn_backend, storefront_app,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const DIRECCIONES: &str = "/user/user-profile/direcciones/";

fn direccion(id: i32, nombre: &str, is_primary: bool) -> Value {
    json!({
        "id": id,
        "nombre": nombre,
        "street": "Av. Reforma 120",
        "colony": "Centro",
        "city": "Puebla",
        "state": "Puebla",
        "postal_code": "72000",
        "is_primary": is_primary
    })
}

/// Fake backend whose address book is `direcciones`.
fn backend(direcciones: Value) -> Router {
    Router::new()
        .route(
            DIRECCIONES,
            get(move || {
                let direcciones = direcciones.clone();
                async move { Json(json!({ "direcciones": direcciones })) }
            })
            .post(|Json(body): Json<Value>| async move {
                if body["nombre"] == "Duplicada" {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "non_field_errors": ["Ya tienes una dirección con ese nombre"]
                        })),
                    );
                }
                if body["postal_code"] == "00000" {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "postal_code": ["Código postal fuera de cobertura"] })),
                    );
                }
                let nombre = body["nombre"].as_str().unwrap_or_default().to_owned();
                (
                    StatusCode::CREATED,
                    Json(json!({ "direccion": direccion(40, &nombre, false) })),
                )
            }),
        )
        .route(
            "/pedidos/checkout/",
            post(|| async {
                (
                    StatusCode::CREATED,
                    Json(json!({ "pedido_id": 31, "total": "1030.00", "estado": "CRE" })),
                )
            }),
        )
}

async fn setup(direcciones: Value) -> (Router, Recorder) {
    let recorder = Recorder::default();
    let api = spawn_backend(backend(direcciones), recorder.clone()).await;
    (storefront_app(&api), recorder)
}

fn form(uri: &str, cookie: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
}

/// `name=value` of the session cookie set by `response`.
fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .find(|c| c.starts_with("refaccionaria_session="))
        .and_then(|c| c.split(';').next())
        .unwrap()
        .to_owned()
}

/// Put `lines` of `(id, price, quantity)` in a fresh cart and return the
/// cookie header of a signed-in customer holding it.
async fn cart_with(app: &Router, lines: &[(i32, &str, u32)]) -> String {
    let mut session = String::new();
    for (id, price, quantity) in lines {
        let cookie = if session.is_empty() {
            customer_cookie()
        } else {
            format!("{session}; {}", customer_cookie())
        };
        let response = app
            .clone()
            .oneshot(
                form("/cart/add", &cookie)
                    .header(header::ACCEPT, "application/json")
                    .body(Body::from(format!(
                        "id={id}&name=Balata+{id}&price={price}&quantity={quantity}"
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        if session.is_empty() {
            session = session_cookie(&response);
        }
    }
    format!("{session}; {}", customer_cookie())
}

fn posted(recorder: &Recorder, path: &str) -> Recorded {
    recorder
        .all()
        .into_iter()
        .find(|r| r.method == "POST" && r.path == path)
        .unwrap()
}

async fn get_page(app: &Router, uri: &str, cookie: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_text(response).await)
}

const DIRECCION_FORM: &str =
    "nombre=Taller&street=Calle+5+de+Mayo+8&colony=Centro&city=Puebla&state=Puebla";

#[tokio::test]
async fn test_no_addresses_shows_creation_form() {
    let (app, _) = setup(json!([])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let (status, body) = get_page(&app, "/checkout", &cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"action="/checkout/direcciones""#));
    assert!(!body.contains(r#"action="/checkout/continuar""#));
    assert!(!body.contains(r#"action="/checkout/cancelar""#));
}

#[tokio::test]
async fn test_primary_address_is_preselected() {
    let (app, _) = setup(json!([
        direccion(1, "Oficina", false),
        direccion(2, "Casa", true)
    ]))
    .await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let (status, body) = get_page(&app, "/checkout", &cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches(r#"<li class="direccion selected">"#).count(), 1);
    let selected = body
        .split(r#"<li class="direccion selected">"#)
        .nth(1)
        .and_then(|rest| rest.split("</li>").next())
        .unwrap();
    assert!(selected.contains(r#"name="direccion_id" value="2""#));
    assert!(selected.contains("Casa"));
}

#[tokio::test]
async fn test_new_address_sends_normalized_postal_code() {
    let (app, recorder) = setup(json!([])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let response = app
        .oneshot(
            form("/checkout/direcciones", &cookie)
                .header(header::ACCEPT, "application/json")
                .body(Body::from(format!("{DIRECCION_FORM}&postal_code=12+345")))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["id"], 40);

    let sent = posted(&recorder, DIRECCIONES);
    assert_eq!(sent.body["postal_code"], "12345");
    assert_eq!(sent.body["nombre"], "Taller");
    assert_eq!(sent.body["is_primary"], false);
    assert!(sent.authorization.unwrap().starts_with("Bearer "));
}

#[tokio::test]
async fn test_invalid_postal_code_never_reaches_backend() {
    let (app, recorder) = setup(json!([])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let response = app
        .oneshot(
            form("/checkout/direcciones", &cookie)
                .header(header::ACCEPT, "application/json")
                .body(Body::from(format!("{DIRECCION_FORM}&postal_code=123")))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"]["postal_code"]["_errors"].is_array());
    assert!(recorder.all().iter().all(|r| r.method != "POST"));
}

#[tokio::test]
async fn test_backend_field_errors_render_inline() {
    let (app, _) = setup(json!([])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let response = app
        .oneshot(
            form("/checkout/direcciones", &cookie)
                .body(Body::from(format!("{DIRECCION_FORM}&postal_code=00000")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(
        r#"<span class="field-error">Código postal fuera de cobertura</span>"#
    ));
    assert!(!body.contains(r#"role="alert""#));
    // The form keeps what the customer typed.
    assert!(body.contains(r#"name="nombre" value="Taller""#));
}

#[tokio::test]
async fn test_backend_non_field_error_shows_banner() {
    let (app, _) = setup(json!([])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let response = app
        .oneshot(
            form("/checkout/direcciones", &cookie)
                .body(Body::from(
                    "nombre=Duplicada&street=Calle+5+de+Mayo+8&colony=Centro&city=Puebla\
                     &state=Puebla&postal_code=72000",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains(
        r#"<div class="alert alert-error" role="alert">Ya tienes una dirección con ese nombre</div>"#
    ));
}

#[tokio::test]
async fn test_continue_without_selection_fails() {
    let (app, _) = setup(json!([])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let response = app
        .clone()
        .oneshot(
            form("/checkout/continuar", &cookie)
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        json,
        json!({ "success": false, "error": "Por favor selecciona una dirección" })
    );

    let response = app
        .oneshot(form("/checkout/continuar", &cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Por favor selecciona una dirección"));
}

#[tokio::test]
async fn test_continue_with_primary_goes_to_extra_info() {
    let (app, _) = setup(json!([direccion(2, "Casa", true)])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 1)]).await;

    let response = app
        .oneshot(form("/checkout/continuar", &cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/addresses/extra-info-details?direccion_id=2"
    );
}

#[tokio::test]
async fn test_confirm_posts_ids_and_quantities_then_clears_cart() {
    let (app, recorder) = setup(json!([direccion(2, "Casa", true)])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 2), (9, "130.00", 1)]).await;

    let response = app
        .clone()
        .oneshot(form("/checkout/confirmar", &cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("#31"));

    let sent = posted(&recorder, "/pedidos/checkout/");
    assert_eq!(
        sent.body,
        json!({
            "items": [
                { "refaccion": 4, "cantidad": 2 },
                { "refaccion": 9, "cantidad": 1 }
            ]
        })
    );

    let (_, cart) = get_page(&app, "/cart", &cookie).await;
    assert!(cart.contains("Tu carrito está vacío"));
}

#[tokio::test]
async fn test_confirm_with_empty_cart_goes_back_to_cart() {
    let (app, recorder) = setup(json!([])).await;
    let response = app
        .oneshot(
            form("/checkout/confirmar", &customer_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/cart");
    assert!(recorder.all().is_empty());
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let (app, _) = setup(json!([])).await;
    let cookie = cart_with(&app, &[(4, "450.00", 2), (9, "130.00", 1)]).await;

    let response = app
        .oneshot(
            form("/cart/update", &cookie)
                .header(header::ACCEPT, "application/json")
                .body(Body::from("id=4&quantity=0"))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["success"], true);
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], 9);
    assert_eq!(json["data"]["item_count"], 1);
}

#[tokio::test]
async fn test_add_rejects_overflowing_price() {
    let (app, _) = setup(json!([])).await;

    let response = app
        .clone()
        .oneshot(
            form("/cart/add", "")
                .body(Body::from(
                    "id=4&name=Balata&price=79228162514264337593543950335&quantity=2",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            form("/cart/add", "")
                .header(header::ACCEPT, "application/json")
                .body(Body::from("id=4&name=Balata&price=-5&quantity=1"))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({ "success": false, "error": "Precio inválido" }));
}
