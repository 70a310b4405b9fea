use crate::client::Session;
use crate::error::ApiError;
use crate::pagination::paginate;
use futures::stream::BoxStream;
use payto_core::models::AuditEntry;
use uuid::Uuid;

pub struct AuditApi<'a> {
    session: &'a Session,
    company_id: Uuid,
}

impl<'a> AuditApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid) -> Self {
        Self {
            session,
            company_id,
        }
    }

    /// Newest entries first, as returned by the API.
    pub fn list(&self) -> BoxStream<'static, Result<AuditEntry, ApiError>> {
        paginate(
            self.session,
            "GET /companies/:id/audit-logs",
            format!("/companies/{}/audit-logs", self.company_id),
        )
    }
}
