use crate::client::{Session, Verb};
use crate::error::ApiError;
use crate::pagination::paginate;
use futures::stream::BoxStream;
use payto_core::approval::{ApprovalResponse, PendingInvoice};
use payto_core::models::{Invoice, InvoiceDraft};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
struct Rejection<'r> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'r str>,
}

pub struct InvoicesApi<'a> {
    session: &'a Session,
    company_id: Uuid,
}

impl<'a> InvoicesApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid) -> Self {
        Self {
            session,
            company_id,
        }
    }

    fn base(&self) -> String {
        format!("/companies/{}/invoices", self.company_id)
    }

    /// All invoices of the company, fetched lazily page by page.
    pub fn list(&self) -> BoxStream<'static, Result<Invoice, ApiError>> {
        paginate(self.session, "GET /companies/:id/invoices", self.base())
    }

    pub async fn get(&self, id: Uuid) -> Result<Invoice, ApiError> {
        self.session
            .call(Verb::Get, "GET /companies/:id/invoices/:id", format!("{}/{id}", self.base()))
            .send()
            .await
    }

    /// Create an invoice. The caller validates the draft first.
    pub async fn create(&self, draft: &InvoiceDraft) -> Result<Invoice, ApiError> {
        self.session
            .call(Verb::Post, "POST /companies/:id/invoices", self.base())
            .body(draft)?
            .send()
            .await
    }

    /// Emit an AFIP voucher (factura, nota de débito o crédito).
    pub async fn emit_voucher(&self, draft: &InvoiceDraft) -> Result<Invoice, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/vouchers",
                format!("/companies/{}/vouchers", self.company_id),
            )
            .body(draft)?
            .send()
            .await
    }

    pub async fn pending_approvals(&self) -> Result<Vec<PendingInvoice>, ApiError> {
        self.session
            .call(
                Verb::Get,
                "GET /companies/:id/approvals/pending",
                format!("/companies/{}/approvals/pending", self.company_id),
            )
            .send()
            .await
    }

    /// Record the user's approval; the answer carries the new counters.
    pub async fn approve(&self, id: Uuid) -> Result<ApprovalResponse, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/invoices/:id/approve",
                format!("{}/{id}/approve", self.base()),
            )
            .send()
            .await
    }

    pub async fn reject(&self, id: Uuid, reason: Option<&str>) -> Result<(), ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/invoices/:id/reject",
                format!("{}/{id}/reject", self.base()),
            )
            .body(&Rejection { reason })?
            .send_empty()
            .await
    }
}
