use crate::error::PageError;
use crate::handlers::display_date;
use crate::models::page::{PageContext, Section};
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use payto_core::format_currency;
use payto_core::models::Invoice;
use uuid::Uuid;

const RECENT_INVOICES: usize = 5;

pub struct RecentInvoice {
    pub href: String,
    pub number: String,
    pub counterparty: String,
    pub status: String,
    pub total: String,
    pub issue_date: String,
}

impl RecentInvoice {
    fn new(company_id: Uuid, invoice: &Invoice) -> Self {
        Self {
            href: format!("/companies/{company_id}/invoices"),
            number: invoice.display_number(),
            counterparty: invoice.counterparty_name.clone(),
            status: invoice.status.label().to_string(),
            total: format_currency(invoice.total),
            issue_date: display_date(invoice.issue_date),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub pending_approvals: usize,
    pub open_tasks: usize,
    pub overdue_tasks: usize,
    pub recent: Vec<RecentInvoice>,
}

/// Land on the first company, or on the company list when there is none.
pub async fn dashboard_redirect(State(state): State<AppState>, user: AuthUser) -> Result<Response, PageError> {
    let session = user.api(&state.api);
    let companies = state.sidebar.companies(&user.user_id, &session).await?;

    let target = match companies.first() {
        Some(company) => format!("/companies/{}/dashboard", company.id),
        None => "/companies".to_string(),
    };
    Ok(Redirect::to(&target).into_response())
}

pub async fn company_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Dashboard).await?;
    let session = user.api(&state.api);

    let invoices = session.invoices(company_id);
    let tasks_api = session.tasks(company_id);
    let recent = invoices.list().take(RECENT_INVOICES).try_collect::<Vec<_>>();
    let (pending, tasks, recent) = tokio::try_join!(
        invoices.pending_approvals(),
        tasks_api.list(),
        recent,
    )?;

    let today = Utc::now().date_naive();
    Ok(DashboardTemplate {
        ctx,
        pending_approvals: pending.len(),
        open_tasks: tasks.iter().filter(|task| !task.done).count(),
        overdue_tasks: tasks.iter().filter(|task| task.is_overdue(today)).count(),
        recent: recent
            .iter()
            .map(|invoice| RecentInvoice::new(company_id, invoice))
            .collect(),
    })
}
