use payto_client::ApiConfig;
use rust_decimal::Decimal;
use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiConfig,
    #[serde(default)]
    pub invoicing: InvoicingSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Signing key for the session cookie.
    pub session_secret: Secret<String>,
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

fn default_session_ttl_hours() -> i64 {
    12
}

#[derive(Deserialize, Clone)]
pub struct InvoicingSettings {
    /// IVA rate for line items that do not choose one.
    pub default_tax_rate: Decimal,
}

impl Default for InvoicingSettings {
    fn default() -> Self {
        Self {
            default_tax_rate: payto_core::tax::DEFAULT_TAX_RATE,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::load_settings("payto-frontend")
}
