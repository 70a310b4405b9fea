//! End-to-end checks of the router against a mocked PayTo API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use payto_client::{ApiConfig, PaytoClient};
use payto_core::TotalsCalculator;
use payto_frontend::config::ServerSettings;
use payto_frontend::services::metrics::detached_handle;
use payto_frontend::startup::build_router;
use payto_frontend::AppState;
use secrecy::Secret;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPANY: &str = "6f9c1d2e-1111-4c3b-9a1e-2b2f1a0c0d01";
const INVOICE: &str = "00000000-0000-4000-8000-000000000042";

fn server_settings() -> ServerSettings {
    ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        session_secret: Secret::new("s".repeat(64)),
        secure_cookies: false,
        session_ttl_hours: 1,
    }
}

fn app(server: &MockServer) -> Router {
    let api = PaytoClient::new(ApiConfig::new(server.uri())).unwrap();
    let state = AppState::new(api, TotalsCalculator::default(), detached_handle());
    build_router(state, &server_settings()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn mock_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({ "email": "ana@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "access_token": "token-123",
                "user": {
                    "id": "11111111-2222-4333-8444-555555555555",
                    "name": "Ana Pérez",
                    "email": "ana@example.com"
                }
            }
        })))
        .mount(server)
        .await;
}

/// Log in through the form and return the session cookie.
async fn login(app: &Router, server: &MockServer) -> String {
    mock_login(server).await;
    let response = app
        .clone()
        .oneshot(form_post("/login", "email=ana%40example.com&password=secret", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Redirect"], "/dashboard");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn health_check_works() {
    let server = MockServer::start().await;
    let response = app(&server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn pages_redirect_to_login_without_session() {
    let server = MockServer::start().await;
    let app = app(&server);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/companies/{COMPANY}/invoices"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/companies/{COMPANY}/invoices/rows"))
                .header("HX-Request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["HX-Redirect"], "/login");
}

#[tokio::test]
async fn bad_credentials_show_the_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Email o contraseña incorrectos" })),
        )
        .mount(&server)
        .await;

    let response = app(&server)
        .oneshot(form_post("/login", "email=ana%40example.com&password=nope", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get("HX-Redirect").is_none());
    assert_eq!(response.headers()["HX-Retarget"], "#flash");
    assert!(body_text(response).await.contains("Email o contraseña incorrectos"));
}

#[tokio::test]
async fn totals_endpoint_computes_worked_example() {
    let server = MockServer::start().await;
    let request = json!({
        "items": [{ "description": "Servicio", "quantity": 2, "unit_price": "100" }],
        "perceptions": [{ "type": "iibb", "name": "", "rate": 3 }]
    });

    let response = app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/totals")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["formatted_total"], "$249.26");
}

#[tokio::test]
async fn totals_endpoint_validates_on_request() {
    let server = MockServer::start().await;
    let response = app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/totals")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "items": [], "validate": true }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["details"][0], "Agregá al menos un ítem");
}

#[tokio::test]
async fn totals_endpoint_rejects_amounts_beyond_range() {
    let server = MockServer::start().await;
    let request = json!({
        "items": [{
            "description": "x",
            "quantity": "100000000000000000000",
            "unit_price": "100000000000000000000"
        }]
    });

    let response = app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/totals")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body["details"][0],
        "Los importes son demasiado grandes para calcular los totales"
    );
}

const HUGE_ITEM: &str = "item_description=x&item_quantity=100000000000000000000&item_unit_price=100000000000000000000&item_tax_rate=";

#[tokio::test]
async fn invoice_preview_reports_amounts_beyond_range() {
    let server = MockServer::start().await;
    let app = app(&server);
    let cookie = login(&app, &server).await;

    let response = app
        .oneshot(form_post(
            &format!("/companies/{COMPANY}/invoices/preview"),
            HUGE_ITEM,
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.headers()["HX-Retarget"], "#flash");
    assert!(body_text(response)
        .await
        .contains("Los importes son demasiado grandes"));
}

#[tokio::test]
async fn voucher_preview_reports_amounts_beyond_range() {
    let server = MockServer::start().await;
    let app = app(&server);
    let cookie = login(&app, &server).await;

    let response = app
        .oneshot(form_post(
            &format!("/companies/{COMPANY}/vouchers/preview"),
            &format!("kind=invoice&{HUGE_ITEM}"),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response)
        .await
        .contains("Los importes son demasiado grandes"));
}

#[tokio::test]
async fn voucher_preview_rejects_issuer_without_letter() {
    const CLIENT: &str = "6f9c1d2e-3333-4c3b-9a1e-2b2f1a0c0d03";
    let server = MockServer::start().await;
    let app = app(&server);
    let cookie = login(&app, &server).await;

    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": COMPANY,
                "name": "Acme SRL",
                "cuit": "30712345671",
                "tax_condition": "consumidor_final",
                "point_of_sale": 1
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/companies/{COMPANY}/clients/{CLIENT}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": CLIENT,
                "business_name": "Cliente SA",
                "cuit": "20123456786",
                "tax_condition": "responsable_inscripto"
            }
        })))
        .mount(&server)
        .await;

    let response = app
        .oneshot(form_post(
            &format!("/companies/{COMPANY}/vouchers/preview"),
            &format!(
                "kind=invoice&counterparty_id={CLIENT}&item_description=Servicio&item_quantity=1&item_unit_price=100&item_tax_rate="
            ),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.headers()["HX-Retarget"], "#flash");
    assert!(body_text(response)
        .await
        .contains("Consumidor Final no puede emitir comprobantes"));
}

#[tokio::test]
async fn invalid_invoice_never_reaches_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/companies/{COMPANY}/invoices")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&server);
    let cookie = login(&app, &server).await;
    let body = format!(
        "direction=issued&counterparty_id={COMPANY}&item_description=Servicio&item_quantity=1&item_unit_price=0&item_tax_rate="
    );
    let response = app
        .oneshot(form_post(&format!("/companies/{COMPANY}/invoices"), &body, Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.headers()["HX-Retarget"], "#flash");
    let html = body_text(response).await;
    assert!(html.contains("Ítem 1: el precio unitario debe ser mayor a cero"));
}

#[tokio::test]
async fn api_errors_are_shown_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "El CUIT ya está registrado" })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let cookie = login(&app, &server).await;
    let response = app
        .oneshot(form_post(
            "/companies",
            "name=Acme+SRL&cuit=30-71234567-1&tax_condition=responsable_inscripto&point_of_sale=",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("El CUIT ya está registrado"));
}

#[tokio::test]
async fn partial_approval_rerenders_the_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/companies/{COMPANY}/invoices/{INVOICE}/approve")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "approvals_received": 2,
            "approvals_required": 3,
            "status": "pending_approval"
        })))
        .mount(&server)
        .await;

    let app = app(&server);
    let cookie = login(&app, &server).await;
    let response = app
        .oneshot(form_post(
            &format!("/companies/{COMPANY}/approvals/{INVOICE}/approve"),
            "number=0001-00000042&counterparty_name=Acme&total=242&received=1&required=3",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("2 de 3"));
    assert!(html.contains("faltan 1"));
}

#[tokio::test]
async fn final_approval_removes_the_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/companies/{COMPANY}/invoices/{INVOICE}/approve")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "approvals_received": 3,
            "approvals_required": 3,
            "status": "approved"
        })))
        .mount(&server)
        .await;

    let app = app(&server);
    let cookie = login(&app, &server).await;
    let response = app
        .oneshot(form_post(
            &format!("/companies/{COMPANY}/approvals/{INVOICE}/approve"),
            "number=0001-00000042&counterparty_name=Acme&total=242&received=2&required=3",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.trim().is_empty());
}

fn company_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "cuit": "30712345671",
        "tax_condition": "responsable_inscripto",
        "point_of_sale": 1
    })
}

#[tokio::test]
async fn created_company_dashboard_loads_right_away() {
    const CREATED: &str = "6f9c1d2e-2222-4c3b-9a1e-2b2f1a0c0d02";
    let server = MockServer::start().await;
    let app = app(&server);
    let cookie = login(&app, &server).await;

    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [company_json(COMPANY, "Acme SRL")] })))
        .mount(&server)
        .await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/companies")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": company_json(CREATED, "Nueva SRL") })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [company_json(COMPANY, "Acme SRL"), company_json(CREATED, "Nueva SRL")]
        })))
        .mount(&server)
        .await;
    for endpoint in ["invoices", "approvals/pending", "tasks"] {
        Mock::given(method("GET"))
            .and(path(format!("/companies/{CREATED}/{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;
    }

    let response = app
        .clone()
        .oneshot(form_post(
            "/companies",
            "name=Nueva+SRL&cuit=30-71234567-1&tax_condition=responsable_inscripto&point_of_sale=1",
            Some(&cookie),
        ))
        .await
        .unwrap();
    let target = response.headers()["HX-Redirect"].to_str().unwrap().to_string();
    assert_eq!(target, format!("/companies/{CREATED}/dashboard"));

    let response = app
        .oneshot(
            Request::builder()
                .uri(&target)
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Nueva SRL"));
}
