//! AFIP certificate state and padron (taxpayer registry) lookups.

use crate::voucher::TaxCondition;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateStatus {
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub cuit: Option<String>,
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
    /// `homologacion` or `produccion`.
    #[serde(default)]
    pub environment: Option<String>,
}

impl CertificateStatus {
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires| expires < Utc::now().date_naive())
    }
}

/// Result of a connectivity test against AFIP with the stored certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateTest {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadronRecord {
    pub cuit: String,
    pub name: String,
    #[serde(default)]
    pub tax_condition: Option<TaxCondition>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
