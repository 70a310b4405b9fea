use crate::client::{Session, Verb};
use crate::error::ApiError;
use crate::pagination::paginate;
use futures::stream::BoxStream;
use payto_core::models::{Payment, PaymentForm};
use uuid::Uuid;

pub struct PaymentsApi<'a> {
    session: &'a Session,
    company_id: Uuid,
}

impl<'a> PaymentsApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid) -> Self {
        Self {
            session,
            company_id,
        }
    }

    fn base(&self) -> String {
        format!("/companies/{}/payments", self.company_id)
    }

    pub fn list(&self) -> BoxStream<'static, Result<Payment, ApiError>> {
        paginate(self.session, "GET /companies/:id/payments", self.base())
    }

    pub async fn create(&self, form: &PaymentForm) -> Result<Payment, ApiError> {
        self.session
            .call(Verb::Post, "POST /companies/:id/payments", self.base())
            .body(form)?
            .send()
            .await
    }

    pub async fn confirm(&self, id: Uuid) -> Result<Payment, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/payments/:id/confirm",
                format!("{}/{id}/confirm", self.base()),
            )
            .send()
            .await
    }

    pub async fn reject(&self, id: Uuid) -> Result<Payment, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/payments/:id/reject",
                format!("{}/{id}/reject", self.base()),
            )
            .send()
            .await
    }
}
