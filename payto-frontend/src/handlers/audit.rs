use crate::error::PageError;
use crate::handlers::invoices::SelectOption;
use crate::models::page::{PageContext, Section};
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use payto_client::collect_all;
use payto_core::models::AuditEntry;
use payto_core::{filter_records, Filter, SearchTerm};
use serde::Deserialize;
use std::collections::BTreeSet;
use uuid::Uuid;

pub struct AuditRow {
    pub at: String,
    pub action: String,
    pub actor: String,
    pub entity: String,
}

impl From<&AuditEntry> for AuditRow {
    fn from(entry: &AuditEntry) -> Self {
        let actor = if entry.actor_name.is_empty() {
            entry.actor_email.clone()
        } else {
            format!("{} <{}>", entry.actor_name, entry.actor_email)
        };
        let entity = match &entry.entity_id {
            Some(id) => format!("{} {id}", entry.entity_type),
            None => entry.entity_type.clone(),
        };
        Self {
            at: entry.created_at.format("%d/%m/%Y %H:%M").to_string(),
            action: entry.action.clone(),
            actor,
            entity,
        }
    }
}

#[derive(Deserialize)]
pub struct AuditQuery {
    #[serde(default)]
    pub search: SearchTerm,
    #[serde(default)]
    pub entity: Filter<String>,
}

#[derive(Template)]
#[template(path = "audit.html")]
pub struct AuditTemplate {
    pub ctx: PageContext,
    pub rows: Vec<AuditRow>,
    pub search: String,
    pub entities: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "fragments/audit_rows.html")]
pub struct AuditRowsFragment {
    pub rows: Vec<AuditRow>,
}

fn entity_options(entries: &[AuditEntry], selected: &Filter<String>) -> Vec<SelectOption> {
    let types: BTreeSet<&str> = entries.iter().map(|entry| entry.entity_type.as_str()).collect();
    std::iter::once(SelectOption {
        value: "all".to_string(),
        label: "Todas las entidades".to_string(),
        selected: selected.is_all(),
    })
    .chain(types.into_iter().map(|entity| SelectOption {
        value: entity.to_string(),
        label: entity.to_string(),
        selected: selected.accepts_by(|expected| expected == entity),
    }))
    .collect()
}

fn filtered(entries: &[AuditEntry], query: &AuditQuery) -> Vec<AuditRow> {
    filter_records(entries, &query.search, |entry| query.entity.accepts(&entry.entity_type))
        .into_iter()
        .map(AuditRow::from)
        .collect()
}

pub async fn audit_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Audit).await?;
    let entries = collect_all(user.api(&state.api).audit(company_id).list()).await?;

    Ok(AuditTemplate {
        ctx,
        rows: filtered(&entries, &query),
        search: query.search.as_str().to_string(),
        entities: entity_options(&entries, &query.entity),
    })
}

pub async fn audit_rows(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, PageError> {
    let entries = collect_all(user.api(&state.api).audit(company_id).list()).await?;
    Ok(AuditRowsFragment {
        rows: filtered(&entries, &query),
    })
}
