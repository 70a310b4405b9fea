use crate::client::{Session, Verb};
use crate::error::ApiError;
use payto_core::models::{InviteMember, Member, RoleChange};
use uuid::Uuid;

pub struct MembersApi<'a> {
    session: &'a Session,
    company_id: Uuid,
}

impl<'a> MembersApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid) -> Self {
        Self {
            session,
            company_id,
        }
    }

    fn base(&self) -> String {
        format!("/companies/{}/members", self.company_id)
    }

    pub async fn list(&self) -> Result<Vec<Member>, ApiError> {
        self.session
            .call(Verb::Get, "GET /companies/:id/members", self.base())
            .send()
            .await
    }

    pub async fn invite(&self, invite: &InviteMember) -> Result<(), ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/members/invite",
                format!("{}/invite", self.base()),
            )
            .body(invite)?
            .send_empty()
            .await
    }

    pub async fn change_role(&self, member_id: Uuid, change: &RoleChange) -> Result<Member, ApiError> {
        self.session
            .call(
                Verb::Patch,
                "PATCH /companies/:id/members/:id",
                format!("{}/{member_id}", self.base()),
            )
            .body(change)?
            .send()
            .await
    }

    pub async fn remove(&self, member_id: Uuid) -> Result<(), ApiError> {
        self.session
            .call(
                Verb::Delete,
                "DELETE /companies/:id/members/:id",
                format!("{}/{member_id}", self.base()),
            )
            .send_empty()
            .await
    }
}
