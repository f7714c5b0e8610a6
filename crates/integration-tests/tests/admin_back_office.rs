//! Back office flows against a fake backend.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::extract::{Json, Path};
use axum::http::{Request, StatusCode, header};
use axum::routing::{get, patch, post};
use axum::Router;
use refaccionaria_integration_tests::{
    Recorder, admin_app, body_text, customer_cookie, spawn_backend, staff_cookie,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn pedido(id: i32, estado: &str) -> Value {
    json!({
        "id": id,
        "estado": estado,
        "total": "1250.00",
        "fecha_creacion": "2025-06-01T12:00:00Z",
        "items": [],
        "usuario_nombre": "Ana Ruiz",
        "usuario_email": "ana@example.com",
        "metodo_pago": "mercadopago"
    })
}

fn servicio(id: i32) -> Value {
    json!({
        "noDeServicio": id,
        "fecha": "2025-05-10",
        "aparato": "Refrigerador",
        "telefono": "2221234567",
        "cliente": "Luis Hernández",
        "observaciones": "No enfría",
        "estado": "En Proceso",
        "marca": "Whirlpool",
        "nota": { "laborCost": "300.00", "technician": "Alfredo" }
    })
}

fn backend() -> Router {
    Router::new()
        .route(
            "/pedidos/all/",
            get(|| async {
                Json(json!({
                    "count": 1,
                    "next": null,
                    "previous": null,
                    "results": [pedido(7, "PAG")]
                }))
            }),
        )
        .route(
            "/pedidos/{id}/update-estado/",
            patch(|Path(id): Path<i32>, Json(body): Json<Value>| async move {
                if id == 8 {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "detail": "Transición no permitida" })),
                    );
                }
                // Order 9 is already delivered whatever the client asks for.
                let estado = if id == 9 {
                    "ENT".to_owned()
                } else {
                    body["estado"].as_str().unwrap_or("CRE").to_owned()
                };
                (StatusCode::OK, Json(pedido(id, &estado)))
            }),
        )
        .route(
            "/ventas/all/estadisticas/",
            get(|| async {
                Json(json!({
                    "ventas_servicios": { "total": "3000.00", "cantidad": 2 },
                    "ventas_refacciones": { "total": "1000.00", "cantidad": 3 },
                    "devoluciones": { "total": "0.00", "cantidad": 0 }
                }))
            }),
        )
        .route(
            "/servicios/estadisticas/",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/servicios/{id}/",
            get(|Path(id): Path<i32>| async move {
                if id == 404 {
                    (StatusCode::NOT_FOUND, Json(json!({ "detail": "No encontrado" })))
                } else {
                    (StatusCode::OK, Json(servicio(id)))
                }
            })
            .put(|Json(body): Json<Value>| async move { (StatusCode::OK, Json(body)) })
            .patch(|| async { StatusCode::NO_CONTENT })
            .delete(|Path(id): Path<i32>| async move {
                if id == 404 {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .route(
            "/inventario/salida/",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": "Stock insuficiente" })),
                )
            }),
        )
        .route(
            "/inventario/entrada/",
            post(|| async { (StatusCode::CREATED, Json(json!({ "id": 55 }))) }),
        )
        .route(
            "/ventas/registros-servicios/",
            post(|| async { (StatusCode::CREATED, Json(json!({ "id": 3 }))) }),
        )
}

async fn setup() -> (Router, Recorder) {
    let recorder = Recorder::default();
    let api = spawn_backend(backend(), recorder.clone()).await;
    (admin_app(&api), recorder)
}

fn form_post(uri: &str, cookie: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
}

#[tokio::test]
async fn test_browser_without_staff_token_goes_to_unauthorized() {
    let (app, _) = setup().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/pedidos")
                .header(header::ACCEPT, "text/html")
                .header(header::COOKIE, customer_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/unauthorized?next=%2Fadmin%2Fpedidos"
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/unauthorized?next=/admin/pedidos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_text(response).await;
    assert!(body.contains("http://localhost:3000/cuenta/login?next="));
}

#[tokio::test]
async fn test_htmx_without_token_gets_hx_redirect() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/pedidos/7/estado")
                .header("hx-request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("hx-redirect").is_some());
}

#[tokio::test]
async fn test_dashboard_survives_failing_source() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/dashboard")
                .header(header::COOKIE, staff_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("No se pudieron cargar los servicios"));
    assert!(body.contains("Ingresos del mes"));
    assert!(body.contains("Ana Ruiz"));

    let stats = recorder.find("/ventas/all/estadisticas/").unwrap();
    assert_eq!(stats.query.as_deref(), Some("tipo=mes"));
    assert!(stats.authorization.unwrap().starts_with("Bearer "));
}

#[tokio::test]
async fn test_pedido_estado_success_shows_new_value() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/pedidos/7/estado", &staff_cookie())
                .header("hx-request", "true")
                .body(Body::from("estado=ENV&actual=PAG"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let trigger = response.headers().get("hx-trigger").unwrap().to_str().unwrap().to_owned();
    assert!(trigger.contains("success"));
    let body = body_text(response).await;
    assert!(body.contains(r#"id="pedido-7-estado""#));
    assert!(body.contains(r#"<option value="ENV" selected>"#));
    assert!(body.contains(r#"name="actual" value="ENV""#));

    let sent = recorder.find("/pedidos/7/update-estado/").unwrap();
    assert_eq!(sent.method, "PATCH");
    assert_eq!(sent.body, json!({ "estado": "ENV" }));
}

#[tokio::test]
async fn test_pedido_estado_renders_backend_value() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/pedidos/9/estado", &staff_cookie())
                .header("hx-request", "true")
                .body(Body::from("estado=ENV&actual=PAG"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"<option value="ENT" selected>"#));
    assert!(!body.contains(r#"<option value="ENV" selected>"#));
    assert!(body.contains(r#"name="actual" value="ENT""#));
}

#[tokio::test]
async fn test_pedido_estado_rejected_rolls_back() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/pedidos/8/estado", &staff_cookie())
                .header("hx-request", "true")
                .body(Body::from("estado=ENT&actual=PAG"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let trigger: Value = serde_json::from_str(
        response.headers().get("hx-trigger").unwrap().to_str().unwrap(),
    )
    .unwrap();
    assert_eq!(trigger["toast"]["kind"], "error");
    assert_eq!(trigger["toast"]["message"], "Transición no permitida");
    let body = body_text(response).await;
    assert!(body.contains(r#"<option value="PAG" selected>"#));
    assert!(!body.contains(r#"<option value="ENT" selected>"#));
}

#[tokio::test]
async fn test_pedido_estado_json_client() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/pedidos/8/estado", &staff_cookie())
                .header(header::ACCEPT, "application/json")
                .body(Body::from("estado=ENT&actual=PAG"))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({ "success": false, "error": "Transición no permitida" }));
}

#[tokio::test]
async fn test_servicio_pago_patch() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/servicios/12/pago", &staff_cookie())
                .header("hx-request", "true")
                .body(Body::from("estado_pago=Pagado&actual=Pendiente"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"id="servicio-12-pago""#));
    assert!(body.contains(r#"<option value="Pagado" selected>"#));

    let sent = recorder.find("/servicios/12/").unwrap();
    assert_eq!(sent.method, "PATCH");
    assert_eq!(sent.body, json!({ "estado_pago": "Pagado" }));
}

#[tokio::test]
async fn test_delete_missing_servicio_keeps_row() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/servicios/404/eliminar", &staff_cookie())
                .header("hx-request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("hx-reswap").unwrap(), "none");
}

#[tokio::test]
async fn test_registrar_venta_uses_path_id() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/servicios/12/venta", &staff_cookie())
                .header(header::ACCEPT, "application/json")
                .body(Body::from("servicio=99&mano_obra=300&refacciones_total=150"))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["success"], true);

    let sent = recorder.find("/ventas/registros-servicios/").unwrap();
    assert_eq!(sent.body["servicio"], 12);
    assert_eq!(sent.body["total"], "450");
    assert_eq!(sent.body["garantia_dias"], 30);

    let nota = recorder.find("/servicios/12/").unwrap();
    assert_eq!(nota.method, "PATCH");
    assert_eq!(nota.body["nota"]["totalCost"], "450");
    assert_eq!(nota.body["nota"]["paymentStatus"], "Pendiente");
}

#[tokio::test]
async fn test_servicio_detalle_prefills_forms() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/servicios/12")
                .header(header::COOKIE, staff_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"action="/admin/servicios/12""#));
    assert!(body.contains(r#"name="cliente" value="Luis Hernández""#));
    assert!(body.contains(r#"<option value="En Proceso" selected>"#));
    assert!(body.contains(r#"name="mano_obra" min="0" step="0.01" value="300.00""#));
    assert!(body.contains(r#"name="tecnico" value="Alfredo""#));
    assert!(body.contains(r#"name="garantia_dias" min="0" value="30""#));

    let sent = recorder.find("/servicios/12/").unwrap();
    assert_eq!(sent.method, "GET");
}

#[tokio::test]
async fn test_servicio_detalle_missing_is_not_found() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/servicios/404")
                .header(header::COOKIE, staff_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

const SERVICIO_FORM: &str = "fecha=2025-05-10&cliente=Luis+Hern%C3%A1ndez&aparato=Refrigerador\
                             &marca=Whirlpool&estado=Reparado";

#[tokio::test]
async fn test_servicio_edit_puts_ticket() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/servicios/12", &staff_cookie())
                .body(Body::from(format!("{SERVICIO_FORM}&telefono=2229876543")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin/servicios/12");

    let sent = recorder.all().into_iter().find(|r| r.method == "PUT").unwrap();
    assert_eq!(sent.path, "/servicios/12/");
    assert_eq!(sent.body["noDeServicio"], 12);
    assert_eq!(sent.body["telefono"], "2229876543");
    assert_eq!(sent.body["estado"], "Reparado");
}

#[tokio::test]
async fn test_servicio_edit_invalid_rerenders_with_errors() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/servicios/12", &staff_cookie())
                .body(Body::from(format!("{SERVICIO_FORM}&telefono=222")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("El teléfono debe tener 10 dígitos"));
    assert!(body.contains(r#"name="telefono" value="222""#));
    assert!(recorder.all().iter().all(|r| r.method != "PUT"));
}

#[tokio::test]
async fn test_servicio_nota_patch() {
    let (app, recorder) = setup().await;
    let response = app
        .oneshot(
            form_post("/admin/servicios/12/nota", &staff_cookie())
                .header(header::ACCEPT, "application/json")
                .body(Body::from(
                    "mano_obra=300&refacciones_total=150&tecnico=Alfredo&estado_pago=Pagado",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["success"], true);

    let sent = recorder.find("/servicios/12/").unwrap();
    assert_eq!(sent.method, "PATCH");
    assert_eq!(
        sent.body,
        json!({
            "nota": {
                "laborCost": "300",
                "partsCost": "150",
                "totalCost": "450",
                "technician": "Alfredo",
                "warranty": 30,
                "paymentStatus": "Pagado"
            }
        })
    );
}

#[tokio::test]
async fn test_inventario_movimientos() {
    let (app, recorder) = setup().await;

    let response = app
        .clone()
        .oneshot(
            form_post("/admin/inventario/salida", &staff_cookie())
                .header(header::ACCEPT, "application/json")
                .body(Body::from("refaccion=4&cantidad=2"))
                .unwrap(),
        )
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({ "success": false, "error": "Stock insuficiente" }));

    let response = app
        .clone()
        .oneshot(
            form_post("/admin/inventario/entrada", &staff_cookie())
                .body(Body::from("refaccion=4&cantidad=10&precio_unitario=85.50"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin/inventario");
    let sent = recorder.find("/inventario/entrada/").unwrap();
    assert_eq!(sent.body["cantidad"], 10);

    let response = app
        .oneshot(
            form_post("/admin/inventario/traspaso", &staff_cookie())
                .body(Body::from("refaccion=4&cantidad=1"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
