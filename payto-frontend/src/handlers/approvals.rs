//! Approval queue. Rows carry their own state in hidden fields so an
//! approve or reject answer can be folded into the row that sent it.

use crate::error::PageError;
use crate::models::page::{PageContext, Section};
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use payto_core::{format_currency, merge_approval, merge_rejection, ApprovalProgress, MergeOutcome, PendingInvoice};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

pub struct ApprovalRow {
    pub company_id: String,
    pub id: String,
    pub number: String,
    pub counterparty: String,
    pub total: String,
    pub raw_total: String,
    pub received: u32,
    pub required: u32,
    pub remaining: u32,
}

impl ApprovalRow {
    fn new(company_id: Uuid, invoice: &PendingInvoice) -> Self {
        Self {
            company_id: company_id.to_string(),
            id: invoice.id.to_string(),
            number: invoice.number.clone().unwrap_or_default(),
            counterparty: invoice.counterparty_name.clone(),
            total: format_currency(invoice.total),
            raw_total: invoice.total.to_string(),
            received: invoice.progress.received,
            required: invoice.progress.required,
            remaining: invoice.progress.remaining(),
        }
    }
}

#[derive(Template)]
#[template(path = "approvals.html")]
pub struct ApprovalsTemplate {
    pub ctx: PageContext,
    pub rows: Vec<ApprovalRow>,
}

#[derive(Template)]
#[template(path = "fragments/approval_row.html")]
pub struct ApprovalRowFragment {
    pub row: ApprovalRow,
}

/// Hidden fields of a pending row.
#[derive(Debug, Deserialize)]
pub struct PendingRowInput {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub counterparty_name: String,
    #[serde(default)]
    pub total: Decimal,
    pub received: u32,
    pub required: u32,
    #[serde(default)]
    pub reason: Option<String>,
}

impl PendingRowInput {
    fn into_pending(self, id: Uuid) -> PendingInvoice {
        PendingInvoice {
            id,
            number: Some(self.number).filter(|number| !number.is_empty()),
            counterparty_name: self.counterparty_name,
            total: self.total,
            progress: ApprovalProgress {
                received: self.received,
                required: self.required,
            },
        }
    }
}

pub async fn approvals_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Approvals).await?;
    let pending = user.api(&state.api).invoices(company_id).pending_approvals().await?;

    Ok(ApprovalsTemplate {
        ctx,
        rows: pending
            .iter()
            .map(|invoice| ApprovalRow::new(company_id, invoice))
            .collect(),
    })
}

/// The row after a merge: re-rendered when it stays, empty when it leaves.
fn merged_row(company_id: Uuid, pending: &[PendingInvoice], outcome: MergeOutcome) -> Response {
    match (outcome, pending.first()) {
        (MergeOutcome::Updated(_), Some(invoice)) => ApprovalRowFragment {
            row: ApprovalRow::new(company_id, invoice),
        }
        .into_response(),
        _ => ().into_response(),
    }
}

pub async fn approve_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
    Form(row): Form<PendingRowInput>,
) -> Result<Response, PageError> {
    let response = user.api(&state.api).invoices(company_id).approve(invoice_id).await?;

    let mut pending = vec![row.into_pending(invoice_id)];
    let outcome = merge_approval(&mut pending, invoice_id, &response);
    tracing::info!(
        invoice_id = %invoice_id,
        received = response.progress.received,
        required = response.progress.required,
        ?outcome,
        "Invoice approved"
    );

    Ok(merged_row(company_id, &pending, outcome))
}

pub async fn reject_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
    Form(row): Form<PendingRowInput>,
) -> Result<Response, PageError> {
    let reason = row.reason.clone().filter(|reason| !reason.trim().is_empty());
    user.api(&state.api)
        .invoices(company_id)
        .reject(invoice_id, reason.as_deref())
        .await?;

    let mut pending = vec![row.into_pending(invoice_id)];
    let outcome = merge_rejection(&mut pending, invoice_id);
    tracing::info!(invoice_id = %invoice_id, ?outcome, "Invoice rejected");

    Ok(merged_row(company_id, &pending, outcome))
}
