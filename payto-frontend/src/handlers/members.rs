use crate::error::PageError;
use crate::handlers::invoices::SelectOption;
use crate::models::page::{PageContext, Section};
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form,
};
use payto_client::Session;
use payto_core::models::{InviteMember, Member, MemberRole, RoleChange};
use payto_core::{filter_records, Filter, SearchTerm};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub struct MemberRow {
    pub company_id: String,
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub joined: String,
}

impl MemberRow {
    fn new(company_id: Uuid, member: &Member) -> Self {
        Self {
            company_id: company_id.to_string(),
            id: member.id.to_string(),
            name: member.name.clone(),
            email: member.email.clone(),
            role: member.role,
            joined: member
                .joined_at
                .map(|joined| joined.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
        }
    }
}

pub struct RoleOption {
    pub value: &'static str,
    pub label: &'static str,
}

fn roles() -> Vec<RoleOption> {
    MemberRole::ALL
        .iter()
        .map(|role| RoleOption {
            value: role.as_str(),
            label: role.label(),
        })
        .collect()
}

fn role_filter_options(selected: &Filter<MemberRole>) -> Vec<SelectOption> {
    std::iter::once(SelectOption {
        value: "all".to_string(),
        label: "Todos los roles".to_string(),
        selected: selected.is_all(),
    })
    .chain(MemberRole::ALL.iter().map(|role| SelectOption {
        value: role.as_str().to_string(),
        label: role.label().to_string(),
        selected: *selected == Filter::Only(*role),
    }))
    .collect()
}

#[derive(Deserialize)]
pub struct MemberQuery {
    #[serde(default)]
    pub search: SearchTerm,
    #[serde(default)]
    pub role: Filter<MemberRole>,
}

#[derive(Template)]
#[template(path = "members.html")]
pub struct MembersTemplate {
    pub ctx: PageContext,
    pub rows: Vec<MemberRow>,
    pub roles: Vec<RoleOption>,
    pub role_filter: Vec<SelectOption>,
    pub search: String,
    /// Whether the current user may invite, change roles and remove.
    pub can_manage: bool,
}

#[derive(Template)]
#[template(path = "fragments/member_rows.html")]
pub struct MemberRowsFragment {
    pub rows: Vec<MemberRow>,
    pub roles: Vec<RoleOption>,
    pub can_manage: bool,
}

#[derive(Template)]
#[template(path = "fragments/member_row.html")]
pub struct MemberRowFragment {
    pub row: MemberRow,
    pub roles: Vec<RoleOption>,
    pub can_manage: bool,
}

async fn rows(session: &Session, company_id: Uuid, query: &MemberQuery) -> Result<Vec<MemberRow>, PageError> {
    let members = session.members(company_id).list().await?;
    Ok(filter_records(&members, &query.search, |member| query.role.accepts(&member.role))
        .into_iter()
        .map(|member| MemberRow::new(company_id, member))
        .collect())
}

/// Permissions are enforced by the API; this only hides controls.
fn can_manage(ctx: &PageContext) -> bool {
    ctx.company
        .as_ref()
        .and_then(|company| company.role)
        .map_or(true, |role| role.manages_members())
}

pub async fn members_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<MemberQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Members).await?;
    let rows = rows(&user.api(&state.api), company_id, &query).await?;

    Ok(MembersTemplate {
        can_manage: can_manage(&ctx),
        ctx,
        rows,
        roles: roles(),
        role_filter: role_filter_options(&query.role),
        search: query.search.as_str().to_string(),
    })
}

pub async fn member_rows(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<MemberQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Members).await?;
    Ok(MemberRowsFragment {
        rows: rows(&user.api(&state.api), company_id, &query).await?,
        roles: roles(),
        can_manage: can_manage(&ctx),
    })
}

pub async fn invite_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(invite): Form<InviteMember>,
) -> Result<Response, PageError> {
    invite.validate()?;
    user.api(&state.api).members(company_id).invite(&invite).await?;

    tracing::info!(company_id = %company_id, role = invite.role.as_str(), "Member invited");
    Ok(crate::handlers::hx_redirect(&format!("/companies/{company_id}/members")))
}

pub async fn change_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, member_id)): Path<(Uuid, Uuid)>,
    Form(change): Form<RoleChange>,
) -> Result<impl IntoResponse, PageError> {
    let member = user
        .api(&state.api)
        .members(company_id)
        .change_role(member_id, &change)
        .await?;

    Ok(MemberRowFragment {
        row: MemberRow::new(company_id, &member),
        roles: roles(),
        can_manage: true,
    })
}

pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, PageError> {
    user.api(&state.api).members(company_id).remove(member_id).await?;
    Ok(().into_response())
}
