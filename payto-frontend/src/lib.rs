pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use metrics_exporter_prometheus::PrometheusHandle;
use payto_client::PaytoClient;
use payto_core::TotalsCalculator;
use services::{forms::FormRegistry, refresh::RefreshBus, sidebar::SidebarCache};
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub api: PaytoClient,
    pub totals: TotalsCalculator,
    pub refresh: RefreshBus,
    pub sidebar: SidebarCache,
    pub forms: Arc<FormRegistry>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Wire the shared services together. The sidebar cache starts
    /// listening on the refresh bus, so this must run inside a Tokio runtime.
    pub fn new(api: PaytoClient, totals: TotalsCalculator, metrics: PrometheusHandle) -> Self {
        let refresh = RefreshBus::default();
        let sidebar = SidebarCache::default();
        sidebar.listen(&refresh);

        Self {
            api,
            totals,
            refresh,
            sidebar,
            forms: Arc::new(FormRegistry::with_counterparty_forms()),
            metrics,
        }
    }
}
