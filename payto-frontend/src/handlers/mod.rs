pub mod afip;
pub mod app;
pub mod approvals;
pub mod audit;
pub mod auth;
pub mod companies;
pub mod counterparties;
pub mod dashboard;
pub mod invoices;
pub mod members;
pub mod metrics;
pub mod network;
pub mod payments;
pub mod tasks;
pub mod totals;
pub mod vouchers;

use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
};

/// Navigate the browser to `path` after an HTMX request.
pub fn hx_redirect(path: &str) -> Response {
    let mut response = ().into_response();
    if let Ok(value) = HeaderValue::from_str(path) {
        response.headers_mut().insert("HX-Redirect", value);
    }
    response
}

/// Format an optional date as dd/mm/yyyy, or a dash.
pub fn display_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}
