use dotenvy::dotenv;
use payto_client::PaytoClient;
use payto_core::{TaxRate, TotalsCalculator};
use payto_frontend::config::get_configuration;
use payto_frontend::services::metrics::init_metrics;
use payto_frontend::startup::build_router;
use payto_frontend::AppState;
use service_core::observability::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let settings = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        &settings.telemetry.service_name,
        &settings.telemetry.log_level,
        settings.telemetry.otlp_endpoint.as_deref(),
    );

    let metrics = init_metrics()?;
    let api = PaytoClient::new(settings.api.clone())?;
    let default_rate = TaxRate::try_from(settings.invoicing.default_tax_rate)?;
    let state = AppState::new(api, TotalsCalculator::new(default_rate), metrics);

    let app = build_router(state, &settings.server)?;

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!(api = %settings.api.base_url, "Starting payto-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
