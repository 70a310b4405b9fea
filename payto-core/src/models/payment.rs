//! Payments against invoices.

use crate::filter::{Filter, Searchable};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pendiente",
            PaymentStatus::Confirmed => "Confirmado",
            PaymentStatus::Rejected => "Rechazado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("estado de pago desconocido: {0}")]
pub struct UnknownPaymentStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "pending" => Ok(PaymentStatus::Pending),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "rejected" => Ok(PaymentStatus::Rejected),
            other => Err(UnknownPaymentStatus(other.to_string())),
        }
    }
}

/// Amount withheld from a payment (retención).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retention {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    #[serde(default)]
    pub invoice_id: Option<Uuid>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub counterparty_name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub retentions: Vec<Retention>,
    #[serde(default)]
    pub method: Option<String>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_at: Option<NaiveDate>,
}

impl Payment {
    pub fn total_retentions(&self) -> Decimal {
        self.retentions
            .iter()
            .fold(Decimal::ZERO, |acc, retention| acc.saturating_add(retention.amount))
    }

    /// Amount actually transferred after retentions.
    pub fn net_amount(&self) -> Decimal {
        self.amount.saturating_sub(self.total_retentions())
    }

    pub fn accepted_by(&self, status: &Filter<PaymentStatus>) -> bool {
        status.accepts(&self.status)
    }
}

impl Searchable for Payment {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.counterparty_name.as_str()];
        fields.extend(self.invoice_number.as_deref());
        fields.extend(self.method.as_deref());
        fields
    }
}

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        let mut error = ValidationError::new("amount");
        error.message = Some("El monto debe ser mayor a cero".into());
        Err(error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentForm {
    pub invoice_id: Uuid,
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "crate::line_item::lenient::decimal"
    )]
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub paid_at: Option<NaiveDate>,
}
