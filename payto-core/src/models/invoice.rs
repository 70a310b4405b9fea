//! Invoices and invoice drafts.

use crate::approval::ApprovalProgress;
use crate::filter::{Filter, Searchable};
use crate::line_item::LineItem;
use crate::perception::Perception;
use crate::validation::{validate_draft, DraftErrors};
use crate::voucher::{VoucherKind, VoucherLetter};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceDirection {
    /// Issued by the company to a client.
    Issued,
    /// Received from a supplier.
    Received,
}

impl InvoiceDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceDirection::Issued => "issued",
            InvoiceDirection::Received => "received",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceDirection::Issued => "Emitida",
            InvoiceDirection::Received => "Recibida",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    Paid,
    Cancelled,
    #[serde(other)]
    Other,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::PendingApproval => "pending_approval",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Rejected => "rejected",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Borrador",
            InvoiceStatus::PendingApproval => "Pendiente de aprobación",
            InvoiceStatus::Approved => "Aprobada",
            InvoiceStatus::Rejected => "Rechazada",
            InvoiceStatus::Paid => "Pagada",
            InvoiceStatus::Cancelled => "Anulada",
            InvoiceStatus::Other => "Otro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("valor de filtro desconocido: {0}")]
pub struct UnknownInvoiceFilter(pub String);

impl FromStr for InvoiceStatus {
    type Err = UnknownInvoiceFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(raw.to_string()))
            .ok()
            .filter(|status| *status != InvoiceStatus::Other)
            .ok_or_else(|| UnknownInvoiceFilter(raw.to_string()))
    }
}

impl FromStr for InvoiceDirection {
    type Err = UnknownInvoiceFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "issued" => Ok(InvoiceDirection::Issued),
            "received" => Ok(InvoiceDirection::Received),
            other => Err(UnknownInvoiceFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub letter: Option<VoucherLetter>,
    #[serde(default = "default_kind")]
    pub kind: VoucherKind,
    pub direction: InvoiceDirection,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub counterparty_id: Option<Uuid>,
    #[serde(default)]
    pub counterparty_name: String,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub total_taxes: Decimal,
    #[serde(default)]
    pub total_perceptions: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub approvals_received: u32,
    #[serde(default)]
    pub approvals_required: u32,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

fn default_kind() -> VoucherKind {
    VoucherKind::Invoice
}

impl Invoice {
    pub fn approval_progress(&self) -> ApprovalProgress {
        ApprovalProgress {
            received: self.approvals_received,
            required: self.approvals_required,
        }
    }

    /// Number as shown in lists; drafts show a dash.
    pub fn display_number(&self) -> String {
        match (&self.letter, &self.number) {
            (Some(letter), Some(number)) => format!("{letter} {number}"),
            (None, Some(number)) => number.clone(),
            _ => "-".to_string(),
        }
    }

    pub fn accepted_by(&self, status: &Filter<InvoiceStatus>, direction: &Filter<InvoiceDirection>) -> bool {
        status.accepts(&self.status) && direction.accepts(&self.direction)
    }
}

impl Searchable for Invoice {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.counterparty_name.as_str()];
        if let Some(number) = &self.number {
            fields.push(number);
        }
        fields
    }
}

/// Body of an invoice or voucher creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub counterparty_id: Uuid,
    pub direction: InvoiceDirection,
    #[serde(default = "default_kind")]
    pub kind: VoucherKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<VoucherLetter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_of_sale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub perceptions: Vec<Perception>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InvoiceDraft {
    /// Submit-time check; a failing draft must not be sent.
    pub fn validate(&self) -> Result<(), DraftErrors> {
        validate_draft(&self.items, &self.perceptions)
    }
}
