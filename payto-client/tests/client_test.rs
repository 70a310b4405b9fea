//! Contract tests for the PayTo API client against a mock server.

use futures::{StreamExt, TryStreamExt};
use payto_client::error::BATCH_FAILURE_MESSAGE;
use payto_client::{ApiConfig, ApiError, PaytoClient, Session};
use payto_core::models::{CounterpartyKind, InvoiceDirection, LoginRequest};
use payto_core::Cuit;
use rust_decimal::Decimal;
use serde_json::json;
use service_core::error::GENERIC_UPSTREAM_MESSAGE;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPANY: &str = "6f9c1d2e-1111-4c3b-9a1e-2b2f1a0c0d01";

fn company_id() -> Uuid {
    COMPANY.parse().unwrap()
}

fn session(server: &MockServer) -> Session {
    let mut config = ApiConfig::new(server.uri());
    config.page_size = 2;
    PaytoClient::new(config).unwrap().session("token-123")
}

fn company_json(name: &str) -> serde_json::Value {
    json!({
        "id": COMPANY,
        "name": name,
        "cuit": "30712345671",
        "tax_condition": "responsable_inscripto",
        "role": "owner"
    })
}

fn invoice_json(id: u32) -> serde_json::Value {
    json!({
        "id": format!("00000000-0000-4000-8000-{id:012}"),
        "number": format!("0001-{id:08}"),
        "letter": "A",
        "direction": "issued",
        "status": "approved",
        "counterparty_name": "Acme",
        "total": "242.00"
    })
}

// ── envelopes ───────────────────────────────────────────────────────

#[tokio::test]
async fn wrapped_and_bare_responses_decode_identically() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [company_json("Acme")] })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([company_json("Acme")])))
        .mount(&server)
        .await;

    let session = session(&server);
    let wrapped = session.companies().list().await.unwrap();
    let bare = session.companies().list().await.unwrap();

    assert_eq!(wrapped, bare);
    assert_eq!(wrapped[0].name, "Acme");
}

// ── errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn api_error_message_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/companies/{COMPANY}/clients")))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Ya existe un cliente con ese CUIT" })),
        )
        .mount(&server)
        .await;

    let form = payto_core::models::CounterpartyForm {
        business_name: "Acme".into(),
        cuit: "20123456786".into(),
        ..Default::default()
    };
    let err = session(&server)
        .counterparties(company_id(), CounterpartyKind::Client)
        .create(&form)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(err.user_message(), "Ya existe un cliente con ese CUIT");
}

#[tokio::test]
async fn error_without_message_uses_generic_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = session(&server).companies().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 503, .. }));
    assert_eq!(err.user_message(), GENERIC_UPSTREAM_MESSAGE);
}

#[tokio::test]
async fn unexpected_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "nope" })))
        .mount(&server)
        .await;

    let err = session(&server).companies().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
    assert_eq!(err.user_message(), GENERIC_UPSTREAM_MESSAGE);
}

#[tokio::test]
async fn login_posts_credentials_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "access_token": "abc",
                "user": { "id": COMPANY, "name": "Ana", "email": "ana@example.com" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PaytoClient::new(ApiConfig::new(server.uri())).unwrap();
    let response = client
        .auth()
        .login(&LoginRequest {
            email: "ana@example.com".into(),
            password: "secreto".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.access_token, "abc");
    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

// ── pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn paginator_walks_pages_until_first_empty_one() {
    let server = MockServer::start().await;
    let list_path = format!("/companies/{COMPANY}/invoices");
    for (page, body) in [
        ("1", json!({ "data": [invoice_json(1), invoice_json(2)] })),
        ("2", json!([invoice_json(3)])),
        ("3", json!({ "data": [] })),
    ] {
        Mock::given(method("GET"))
            .and(path(list_path.as_str()))
            .and(query_param("page", page))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(list_path.as_str()))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([invoice_json(9)])))
        .expect(0)
        .mount(&server)
        .await;

    let invoices: Vec<_> = session(&server)
        .invoices(company_id())
        .list()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(invoices.len(), 3);
    assert_eq!(invoices[2].number.as_deref(), Some("0001-00000003"));
    assert_eq!(invoices[0].direction, InvoiceDirection::Issued);
    assert_eq!(invoices[0].total, Decimal::new(24200, 2));
}

#[tokio::test]
async fn paginator_is_lazy_and_restartable() {
    let server = MockServer::start().await;
    let list_path = format!("/companies/{COMPANY}/invoices");
    Mock::given(method("GET"))
        .and(path(list_path.as_str()))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([invoice_json(1), invoice_json(2)])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(list_path.as_str()))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let session = session(&server);
    for _ in 0..2 {
        let first_two: Vec<_> = session.invoices(company_id()).list().take(2).collect().await;
        assert_eq!(first_two.len(), 2);
        assert!(first_two.iter().all(Result::is_ok));
    }
}

#[tokio::test]
async fn paginator_stops_after_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/companies/{COMPANY}/audit-logs")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "Falló la consulta" })))
        .expect(1)
        .mount(&server)
        .await;

    let results: Vec<_> = session(&server).audit(company_id()).list().collect().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].as_ref().unwrap_err().user_message(), "Falló la consulta");
}

// ── fan-out ─────────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_completion_aborts_with_batch_error() {
    let server = MockServer::start().await;
    let ok_id = Uuid::new_v4();
    let bad_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/companies/{COMPANY}/tasks/{ok_id}/complete")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": ok_id, "title": "IVA", "done": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/companies/{COMPANY}/tasks/{bad_id}/complete")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Tarea inexistente" })))
        .mount(&server)
        .await;

    let session = session(&server);
    let tasks = session.tasks(company_id());

    let done = tasks.complete_many(&[ok_id]).await.unwrap();
    assert!(done[0].done);

    let err = tasks.complete_many(&[ok_id, bad_id]).await.unwrap_err();
    assert!(matches!(err, ApiError::Batch { .. }));
    assert_eq!(err.user_message(), BATCH_FAILURE_MESSAGE);
}

#[tokio::test]
async fn network_overview_isolates_failed_sources() {
    let server = MockServer::start().await;
    let base = format!("/companies/{COMPANY}/network");
    Mock::given(method("GET"))
        .and(path(format!("{base}/connections")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{
            "id": Uuid::new_v4(), "company_id": Uuid::new_v4(), "company_name": "Proveedor Uno",
            "cuit": "20123456786", "status": "accepted"
        }]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{base}/requests/incoming")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "Servicio no disponible" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{base}/requests/outgoing")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let overview = session(&server).network(company_id()).overview().await;

    assert_eq!(overview.connections.as_ref().unwrap().len(), 1);
    assert!(overview.incoming.is_err());
    assert!(overview.outgoing.as_ref().unwrap().is_empty());
    assert_eq!(
        overview.failures(),
        vec!["Solicitudes recibidas: Servicio no disponible".to_string()]
    );
}

// ── misc endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn approve_returns_server_counters() {
    let server = MockServer::start().await;
    let invoice_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/companies/{COMPANY}/invoices/{invoice_id}/approve")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "approvals_received": 2, "approvals_required": 2, "status": "approved" }
        })))
        .mount(&server)
        .await;

    let response = session(&server).invoices(company_id()).approve(invoice_id).await.unwrap();
    assert!(response.progress.is_complete());
}

#[tokio::test]
async fn padron_lookup_uses_plain_digits_and_forwards_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/companies/{COMPANY}/afip/padron/20123456786")))
        .and(header("x-request-id", "req-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cuit": "20123456786", "name": "PEREZ JUAN", "tax_condition": "monotributo"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cuit: Cuit = "20-12345678-6".parse().unwrap();
    let record = session(&server)
        .with_request_id(Some("req-42"))
        .afip(company_id())
        .padron(&cuit)
        .await
        .unwrap();
    assert_eq!(record.name, "PEREZ JUAN");
}
