use crate::client::{Session, Verb};
use crate::error::ApiError;
use crate::pagination::paginate;
use futures::stream::BoxStream;
use payto_core::models::{Counterparty, CounterpartyForm, CounterpartyKind};
use uuid::Uuid;

/// Clients or suppliers of a company. Both resources share one contract.
pub struct CounterpartiesApi<'a> {
    session: &'a Session,
    company_id: Uuid,
    kind: CounterpartyKind,
}

impl<'a> CounterpartiesApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid, kind: CounterpartyKind) -> Self {
        Self {
            session,
            company_id,
            kind,
        }
    }

    fn base(&self) -> String {
        format!("/companies/{}/{}", self.company_id, self.kind.path())
    }

    fn endpoint(&self, client: &'static str, supplier: &'static str) -> &'static str {
        match self.kind {
            CounterpartyKind::Client => client,
            CounterpartyKind::Supplier => supplier,
        }
    }

    /// Active and archived records alike; filtering happens on the page.
    pub fn list(&self) -> BoxStream<'static, Result<Counterparty, ApiError>> {
        let endpoint = self.endpoint("GET /companies/:id/clients", "GET /companies/:id/suppliers");
        paginate(self.session, endpoint, self.base())
    }

    pub async fn get(&self, id: Uuid) -> Result<Counterparty, ApiError> {
        let endpoint = self.endpoint("GET /companies/:id/clients/:id", "GET /companies/:id/suppliers/:id");
        self.session
            .call(Verb::Get, endpoint, format!("{}/{id}", self.base()))
            .send()
            .await
    }

    pub async fn create(&self, form: &CounterpartyForm) -> Result<Counterparty, ApiError> {
        let endpoint = self.endpoint("POST /companies/:id/clients", "POST /companies/:id/suppliers");
        self.session
            .call(Verb::Post, endpoint, self.base())
            .body(form)?
            .send()
            .await
    }

    pub async fn update(&self, id: Uuid, form: &CounterpartyForm) -> Result<Counterparty, ApiError> {
        let endpoint = self.endpoint("PUT /companies/:id/clients/:id", "PUT /companies/:id/suppliers/:id");
        self.session
            .call(Verb::Put, endpoint, format!("{}/{id}", self.base()))
            .body(form)?
            .send()
            .await
    }

    pub async fn archive(&self, id: Uuid) -> Result<Counterparty, ApiError> {
        let endpoint = self.endpoint(
            "POST /companies/:id/clients/:id/archive",
            "POST /companies/:id/suppliers/:id/archive",
        );
        self.session
            .call(Verb::Post, endpoint, format!("{}/{id}/archive", self.base()))
            .send()
            .await
    }

    pub async fn restore(&self, id: Uuid) -> Result<Counterparty, ApiError> {
        let endpoint = self.endpoint(
            "POST /companies/:id/clients/:id/restore",
            "POST /companies/:id/suppliers/:id/restore",
        );
        self.session
            .call(Verb::Post, endpoint, format!("{}/{id}/restore", self.base()))
            .send()
            .await
    }
}
