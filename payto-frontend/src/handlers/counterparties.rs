//! Clients and suppliers. The same handlers serve both; the kind comes from
//! the router the request was matched in.

use crate::error::PageError;
use crate::handlers::companies::{condition_options, ConditionOption};
use crate::handlers::hx_redirect;
use crate::handlers::invoices::SelectOption;
use crate::models::page::{Link, PageContext, Section};
use crate::models::user::AuthUser;
use crate::services::forms::EntityForm;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Form,
};
use payto_client::{collect_all, Session};
use payto_core::models::{Counterparty, CounterpartyForm, CounterpartyKind, RecordState};
use payto_core::{filter_records, Filter, SearchTerm, TaxCondition};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct CounterpartyRow {
    pub base: String,
    pub id: String,
    pub business_name: String,
    pub cuit: String,
    pub condition: String,
    pub email: String,
    pub archived: bool,
}

impl CounterpartyRow {
    fn new(base: &str, record: &Counterparty) -> Self {
        Self {
            base: base.to_string(),
            id: record.id.to_string(),
            business_name: record.business_name.clone(),
            cuit: record.display_cuit(),
            condition: record.tax_condition.label().to_string(),
            email: record.email.clone().unwrap_or_default(),
            archived: record.archived,
        }
    }
}

#[derive(Deserialize)]
pub struct CounterpartyQuery {
    #[serde(default)]
    pub search: SearchTerm,
    #[serde(default)]
    pub state: Filter<RecordState>,
    #[serde(default)]
    pub condition: Filter<TaxCondition>,
}

fn state_options(selected: &Filter<RecordState>) -> Vec<SelectOption> {
    [
        ("all", "Todos", Filter::All),
        ("active", "Activos", Filter::Only(RecordState::Active)),
        ("archived", "Archivados", Filter::Only(RecordState::Archived)),
    ]
    .into_iter()
    .map(|(value, label, filter)| SelectOption {
        value: value.to_string(),
        label: label.to_string(),
        selected: filter == *selected,
    })
    .collect()
}

fn condition_filter_options(selected: &Filter<TaxCondition>) -> Vec<SelectOption> {
    std::iter::once(SelectOption {
        value: "all".to_string(),
        label: "Todas las condiciones".to_string(),
        selected: selected.is_all(),
    })
    .chain(TaxCondition::ALL.iter().map(|condition| SelectOption {
        value: condition.as_str().to_string(),
        label: condition.label().to_string(),
        selected: *selected == Filter::Only(*condition),
    }))
    .collect()
}

fn registered(state: &AppState, kind: CounterpartyKind) -> Result<Arc<dyn EntityForm>, PageError> {
    state
        .forms
        .get(kind)
        .ok_or_else(|| PageError::not_found("Formulario no disponible"))
}

fn section(kind: CounterpartyKind) -> Section {
    match kind {
        CounterpartyKind::Client => Section::Clients,
        CounterpartyKind::Supplier => Section::Suppliers,
    }
}

#[derive(Template)]
#[template(path = "counterparties.html")]
pub struct CounterpartiesTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub base: String,
    pub new_label: &'static str,
    pub rows: Vec<CounterpartyRow>,
    pub search: String,
    pub states: Vec<SelectOption>,
    pub conditions: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "fragments/counterparty_rows.html")]
pub struct CounterpartyRowsFragment {
    pub rows: Vec<CounterpartyRow>,
}

#[derive(Template)]
#[template(path = "fragments/counterparty_row.html")]
pub struct CounterpartyRowFragment {
    pub row: CounterpartyRow,
}

async fn rows(
    session: &Session,
    company_id: Uuid,
    kind: CounterpartyKind,
    query: &CounterpartyQuery,
) -> Result<Vec<CounterpartyRow>, PageError> {
    let records = collect_all(session.counterparties(company_id, kind).list()).await?;
    let base = format!("/companies/{company_id}/{}", kind.path());
    Ok(filter_records(&records, &query.search, |record| {
        record.accepted_by(&query.state, &query.condition)
    })
    .into_iter()
    .map(|record| CounterpartyRow::new(&base, record))
    .collect())
}

pub async fn counterparties_page(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<CounterpartyQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), section(kind)).await?;
    let form = registered(&state, kind)?;
    let rows = rows(&user.api(&state.api), company_id, kind, &query).await?;

    Ok(CounterpartiesTemplate {
        ctx,
        title: kind.plural_label(),
        base: form.path(company_id),
        new_label: form.create_label(),
        rows,
        search: query.search.as_str().to_string(),
        states: state_options(&query.state),
        conditions: condition_filter_options(&query.condition),
    })
}

pub async fn counterparty_rows(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<CounterpartyQuery>,
) -> Result<impl IntoResponse, PageError> {
    Ok(CounterpartyRowsFragment {
        rows: rows(&user.api(&state.api), company_id, kind, &query).await?,
    })
}

#[derive(Template)]
#[template(path = "counterparty_form.html")]
pub struct CounterpartyFormTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub action: String,
    pub editing: bool,
    pub values: CounterpartyForm,
    pub selected_condition: &'static str,
    pub conditions: Vec<ConditionOption>,
    /// "Create the other kind" links offered by the registry.
    pub alternatives: Vec<Link>,
    pub back: String,
}

fn form_page(
    ctx: PageContext,
    state: &AppState,
    form: &dyn EntityForm,
    company_id: Uuid,
    editing: Option<(Uuid, CounterpartyForm)>,
) -> CounterpartyFormTemplate {
    let alternatives = state
        .forms
        .alternatives(form.kind())
        .iter()
        .map(|other| Link {
            href: other.new_path(company_id),
            label: other.create_label().to_string(),
            active: false,
        })
        .collect();

    let is_editing = editing.is_some();
    let (title, action, values) = match editing {
        Some((id, values)) => (
            format!("Editar {}", form.kind().label()),
            format!("{}/{id}", form.path(company_id)),
            values,
        ),
        None => (form.title().to_string(), form.path(company_id), form.blank()),
    };

    CounterpartyFormTemplate {
        ctx,
        editing: is_editing,
        title,
        action,
        selected_condition: values.tax_condition.as_str(),
        values,
        conditions: condition_options(),
        alternatives,
        back: form.path(company_id),
    }
}

pub async fn new_counterparty_page(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), section(kind)).await?;
    let form = registered(&state, kind)?;
    Ok(form_page(ctx, &state, form.as_ref(), company_id, None))
}

pub async fn edit_counterparty_page(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), section(kind)).await?;
    let form = registered(&state, kind)?;
    let record = user.api(&state.api).counterparties(company_id, kind).get(id).await?;

    Ok(form_page(
        ctx,
        &state,
        form.as_ref(),
        company_id,
        Some((id, CounterpartyForm::from(&record))),
    ))
}

pub async fn create_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(values): Form<CounterpartyForm>,
) -> Result<Response, PageError> {
    values.validate()?;
    let form = registered(&state, kind)?;
    let record = form.create(&user.api(&state.api), company_id, &values).await?;

    tracing::info!(kind = kind.path(), id = %record.id, "Counterparty created");
    Ok(hx_redirect(&form.path(company_id)))
}

pub async fn update_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    Form(values): Form<CounterpartyForm>,
) -> Result<Response, PageError> {
    values.validate()?;
    let form = registered(&state, kind)?;
    form.update(&user.api(&state.api), company_id, id, &values).await?;

    Ok(hx_redirect(&form.path(company_id)))
}

pub async fn archive_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, PageError> {
    let record = user.api(&state.api).counterparties(company_id, kind).archive(id).await?;
    let base = format!("/companies/{company_id}/{}", kind.path());
    Ok(CounterpartyRowFragment {
        row: CounterpartyRow::new(&base, &record),
    })
}

pub async fn restore_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    user: AuthUser,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, PageError> {
    let record = user.api(&state.api).counterparties(company_id, kind).restore(id).await?;
    let base = format!("/companies/{company_id}/{}", kind.path());
    Ok(CounterpartyRowFragment {
        row: CounterpartyRow::new(&base, &record),
    })
}
