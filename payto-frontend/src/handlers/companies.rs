use crate::error::PageError;
use crate::handlers::hx_redirect;
use crate::models::page::{PageContext, Section};
use crate::models::user::AuthUser;
use crate::services::refresh::RefreshEvent;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form,
};
use payto_core::models::{Company, CompanyForm};
use payto_core::{filter_records, SearchTerm, TaxCondition};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub struct CompanyRow {
    pub id: String,
    pub name: String,
    pub cuit: String,
    pub tax_condition: TaxCondition,
    pub condition: String,
    pub role: String,
    pub point_of_sale: String,
}

impl From<&Company> for CompanyRow {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.to_string(),
            name: company.name.clone(),
            cuit: company.display_cuit(),
            tax_condition: company.tax_condition,
            condition: company.tax_condition.label().to_string(),
            role: company
                .role
                .map(|role| role.label().to_string())
                .unwrap_or_default(),
            point_of_sale: company
                .point_of_sale
                .map(|pos| pos.to_string())
                .unwrap_or_default(),
        }
    }
}

pub struct ConditionOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn condition_options() -> Vec<ConditionOption> {
    TaxCondition::ALL
        .iter()
        .map(|condition| ConditionOption {
            value: condition.as_str(),
            label: condition.label(),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "companies.html")]
pub struct CompaniesTemplate {
    pub ctx: PageContext,
    pub rows: Vec<CompanyRow>,
    pub search: String,
    pub conditions: Vec<ConditionOption>,
}

#[derive(Template)]
#[template(path = "fragments/company_rows.html")]
pub struct CompanyRowsFragment {
    pub rows: Vec<CompanyRow>,
    pub conditions: Vec<ConditionOption>,
}

#[derive(Deserialize)]
pub struct CompanyQuery {
    #[serde(default)]
    pub search: SearchTerm,
}

/// Company form as posted by the browser; the point of sale arrives as text.
#[derive(Deserialize)]
pub struct CompanyInput {
    pub name: String,
    pub cuit: String,
    #[serde(default)]
    pub tax_condition: TaxCondition,
    #[serde(default)]
    pub point_of_sale: String,
}

impl TryFrom<CompanyInput> for CompanyForm {
    type Error = PageError;

    fn try_from(input: CompanyInput) -> Result<Self, Self::Error> {
        let point_of_sale = match input.point_of_sale.trim() {
            "" => None,
            raw => Some(
                raw.parse()
                    .map_err(|_| PageError::invalid(vec!["Punto de venta inválido".to_string()]))?,
            ),
        };
        let form = CompanyForm {
            name: input.name.trim().to_string(),
            cuit: input.cuit,
            tax_condition: input.tax_condition,
            point_of_sale,
        };
        form.validate()?;
        Ok(form)
    }
}

async fn rows(state: &AppState, user: &AuthUser, search: &SearchTerm) -> Result<Vec<CompanyRow>, PageError> {
    let companies = user.api(&state.api).companies().list().await?;
    Ok(filter_records(&companies, search, |_| true)
        .into_iter()
        .map(CompanyRow::from)
        .collect())
}

pub async fn companies_page(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CompanyQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, None, Section::Companies).await?;
    Ok(CompaniesTemplate {
        ctx,
        rows: rows(&state, &user, &query.search).await?,
        search: query.search.as_str().to_string(),
        conditions: condition_options(),
    })
}

pub async fn company_rows(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CompanyQuery>,
) -> Result<impl IntoResponse, PageError> {
    Ok(CompanyRowsFragment {
        rows: rows(&state, &user, &query.search).await?,
        conditions: condition_options(),
    })
}

/// Invalidate before responding so the redirect target sees the change;
/// the event reaches the other subscribers.
fn companies_changed(state: &AppState, user: &AuthUser) {
    state.sidebar.invalidate(&user.user_id);
    state.refresh.publish(RefreshEvent::CompaniesChanged {
        user_id: user.user_id.clone(),
    });
}

pub async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Form(input): Form<CompanyInput>,
) -> Result<Response, PageError> {
    let form = CompanyForm::try_from(input)?;
    let company = user.api(&state.api).companies().create(&form).await?;

    tracing::info!(company_id = %company.id, "Company created");
    companies_changed(&state, &user);
    Ok(hx_redirect(&format!("/companies/{}/dashboard", company.id)))
}

pub async fn update_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(input): Form<CompanyInput>,
) -> Result<Response, PageError> {
    let form = CompanyForm::try_from(input)?;
    user.api(&state.api).companies().update(company_id, &form).await?;

    companies_changed(&state, &user);
    Ok(hx_redirect("/companies"))
}

pub async fn delete_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<Response, PageError> {
    user.api(&state.api).companies().delete(company_id).await?;

    tracing::info!(company_id = %company_id, "Company deleted");
    companies_changed(&state, &user);
    Ok(().into_response())
}
