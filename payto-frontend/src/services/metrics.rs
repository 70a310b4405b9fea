use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the process-wide Prometheus recorder.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    Ok(handle)
}

/// A recorder that is not installed globally, for tests.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

fn describe() {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    metrics::describe_counter!("payto_api_requests_total", "Requests sent to the PayTo API");
    metrics::describe_histogram!(
        "payto_api_request_duration_seconds",
        metrics::Unit::Seconds,
        "PayTo API request duration in seconds"
    );
    metrics::describe_counter!(
        "payto_submissions_blocked_total",
        "Form submissions stopped by client-side validation"
    );
}
