use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Script origin allowed next to `'self'` for the HTMX bundle.
const HTMX_ORIGIN: &str = "https://unpkg.com";

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_json_route = req.uri().path().starts_with("/api/");

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("same-origin"),
    );

    let csp = if is_json_route {
        "default-src 'none'; frame-ancestors 'none'".to_string()
    } else {
        format!(
            "default-src 'self'; script-src 'self' {HTMX_ORIGIN}; style-src 'self' 'unsafe-inline'; \
             img-src 'self' data:; form-action 'self'; frame-ancestors 'none'"
        )
    };
    if let Ok(value) = header::HeaderValue::from_str(&csp) {
        headers.insert(header::CONTENT_SECURITY_POLICY, value);
    }

    response
}
