use crate::client::{Session, Verb};
use crate::error::ApiError;
use payto_core::models::{Company, CompanyForm};
use uuid::Uuid;

pub struct CompaniesApi<'a> {
    session: &'a Session,
}

impl<'a> CompaniesApi<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Companies the user belongs to.
    pub async fn list(&self) -> Result<Vec<Company>, ApiError> {
        self.session
            .call(Verb::Get, "GET /companies", "/companies".to_string())
            .send()
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Company, ApiError> {
        self.session
            .call(Verb::Get, "GET /companies/:id", format!("/companies/{id}"))
            .send()
            .await
    }

    pub async fn create(&self, form: &CompanyForm) -> Result<Company, ApiError> {
        self.session
            .call(Verb::Post, "POST /companies", "/companies".to_string())
            .body(form)?
            .send()
            .await
    }

    pub async fn update(&self, id: Uuid, form: &CompanyForm) -> Result<Company, ApiError> {
        self.session
            .call(Verb::Put, "PUT /companies/:id", format!("/companies/{id}"))
            .body(form)?
            .send()
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.session
            .call(Verb::Delete, "DELETE /companies/:id", format!("/companies/{id}"))
            .send_empty()
            .await
    }
}
