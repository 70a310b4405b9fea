use axum::{
    middleware::from_fn,
    routing::{delete, get, patch, post},
    Extension, Router,
};
use payto_core::models::CounterpartyKind;
use secrecy::ExposeSecret;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::Key, service::SignedCookie, Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ServerSettings;
use crate::handlers::{
    afip, app, approvals, audit, auth, companies, counterparties, dashboard, invoices, members,
    metrics, network, payments, tasks, totals, vouchers,
};
use crate::AppState;

/// Client and supplier pages share one set of routes; the nest decides which.
fn counterparty_routes(kind: CounterpartyKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(counterparties::counterparties_page).post(counterparties::create_counterparty),
        )
        .route("/rows", get(counterparties::counterparty_rows))
        .route("/new", get(counterparties::new_counterparty_page))
        .route("/:id/edit", get(counterparties::edit_counterparty_page))
        .route("/:id", axum::routing::put(counterparties::update_counterparty))
        .route("/:id/archive", post(counterparties::archive_counterparty))
        .route("/:id/restore", post(counterparties::restore_counterparty))
        .layer(Extension(kind))
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::company_dashboard))
        .route("/invoices", get(invoices::invoices_page).post(invoices::create_invoice))
        .route("/invoices/rows", get(invoices::invoice_rows))
        .route("/invoices/new", get(invoices::new_invoice_page))
        .route("/invoices/item-row", get(invoices::item_row))
        .route("/invoices/perception-row", get(invoices::perception_row))
        .route("/invoices/preview", post(invoices::preview_totals))
        .route("/vouchers/new", get(vouchers::new_voucher_page))
        .route("/vouchers/preview", post(vouchers::preview_voucher))
        .route("/vouchers", post(vouchers::emit_voucher))
        .route("/approvals", get(approvals::approvals_page))
        .route("/approvals/:invoice_id/approve", post(approvals::approve_invoice))
        .route("/approvals/:invoice_id/reject", post(approvals::reject_invoice))
        .route("/payments", get(payments::payments_page).post(payments::create_payment))
        .route("/payments/rows", get(payments::payment_rows))
        .route("/payments/:payment_id/confirm", post(payments::confirm_payment))
        .route("/payments/:payment_id/reject", post(payments::reject_payment))
        .nest("/clients", counterparty_routes(CounterpartyKind::Client))
        .nest("/suppliers", counterparty_routes(CounterpartyKind::Supplier))
        .route("/members", get(members::members_page).post(members::invite_member))
        .route("/members/rows", get(members::member_rows))
        .route(
            "/members/:member_id",
            patch(members::change_role).delete(members::remove_member),
        )
        .route("/network", get(network::network_page))
        .route("/network/requests", post(network::request_connection))
        .route("/network/requests/:request_id/accept", post(network::accept_request))
        .route("/network/requests/:request_id/reject", post(network::reject_request))
        .route("/network/connections/:connection_id", delete(network::remove_connection))
        .route("/afip", get(afip::afip_page))
        .route(
            "/afip/certificate",
            post(afip::upload_certificate).delete(afip::delete_certificate),
        )
        .route("/afip/certificate/test", post(afip::test_certificate))
        .route("/afip/padron", get(afip::padron_lookup))
        .route("/audit", get(audit::audit_page))
        .route("/audit/rows", get(audit::audit_rows))
        .route("/tasks", get(tasks::tasks_page).post(tasks::create_task))
        .route("/tasks/rows", get(tasks::task_rows))
        .route("/tasks/complete", post(tasks::complete_tasks))
        .route("/tasks/:task_id", delete(tasks::delete_task))
}

/// Cookie-backed sessions signed with the configured secret.
pub fn session_layer(
    server: &ServerSettings,
) -> anyhow::Result<SessionManagerLayer<MemoryStore, SignedCookie>> {
    let key = Key::try_from(server.session_secret.expose_secret().as_bytes())
        .map_err(|err| anyhow::anyhow!("Invalid session secret: {err}"))?;

    Ok(SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(server.session_ttl_hours)))
        .with_signed(key))
}

pub fn build_router(state: AppState, server: &ServerSettings) -> anyhow::Result<Router> {
    let session_layer = session_layer(server)?;

    let router = Router::new()
        .route("/", get(app::index))
        .route("/health", get(app::health_check))
        .route("/metrics", get(metrics::metrics))
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/dashboard", get(dashboard::dashboard_redirect))
        .route("/companies", get(companies::companies_page).post(companies::create_company))
        .route("/companies/rows", get(companies::company_rows))
        .route(
            "/companies/:company_id",
            axum::routing::put(companies::update_company).delete(companies::delete_company),
        )
        .nest("/companies/:company_id", company_routes())
        .route("/api/totals", post(totals::compute_totals))
        .nest_service("/static", ServeDir::new("payto-frontend/static"))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state);

    Ok(router)
}
