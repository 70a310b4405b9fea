use crate::client::{Session, Verb};
use crate::error::ApiError;
use crate::fanout::all_or_abort;
use payto_core::models::{Task, TaskForm};
use uuid::Uuid;

pub struct TasksApi<'a> {
    session: &'a Session,
    company_id: Uuid,
}

impl<'a> TasksApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid) -> Self {
        Self {
            session,
            company_id,
        }
    }

    fn base(&self) -> String {
        format!("/companies/{}/tasks", self.company_id)
    }

    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        self.session
            .call(Verb::Get, "GET /companies/:id/tasks", self.base())
            .send()
            .await
    }

    pub async fn create(&self, form: &TaskForm) -> Result<Task, ApiError> {
        self.session
            .call(Verb::Post, "POST /companies/:id/tasks", self.base())
            .body(form)?
            .send()
            .await
    }

    pub async fn complete(&self, id: Uuid) -> Result<Task, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/tasks/:id/complete",
                format!("{}/{id}/complete", self.base()),
            )
            .send()
            .await
    }

    /// Complete several tasks at once. The requests run concurrently and the
    /// first failure aborts the batch; tasks already completed stay so.
    pub async fn complete_many(&self, ids: &[Uuid]) -> Result<Vec<Task>, ApiError> {
        all_or_abort(ids.iter().map(|id| self.complete(*id))).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.session
            .call(
                Verb::Delete,
                "DELETE /companies/:id/tasks/:id",
                format!("{}/{id}", self.base()),
            )
            .send_empty()
            .await
    }
}
