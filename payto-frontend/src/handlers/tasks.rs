use crate::error::PageError;
use crate::handlers::invoices::SelectOption;
use crate::handlers::{display_date, hx_redirect};
use crate::models::page::{PageContext, Section};
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form,
};
use chrono::{NaiveDate, Utc};
use payto_client::Session;
use payto_core::models::{Task, TaskForm, TaskState};
use payto_core::{filter_records, Filter, SearchTerm};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub struct TaskRow {
    pub company_id: String,
    pub id: String,
    pub title: String,
    pub done: bool,
    pub overdue: bool,
    pub due: String,
    pub assignee: String,
}

impl TaskRow {
    fn new(company_id: Uuid, task: &Task, today: NaiveDate) -> Self {
        Self {
            company_id: company_id.to_string(),
            id: task.id.to_string(),
            title: task.title.clone(),
            done: task.done,
            overdue: task.is_overdue(today),
            due: display_date(task.due_date),
            assignee: task.assignee_name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub search: SearchTerm,
    #[serde(default)]
    pub state: Filter<TaskState>,
}

fn state_options(selected: &Filter<TaskState>) -> Vec<SelectOption> {
    [
        ("all", "Todas", Filter::All),
        ("open", "Pendientes", Filter::Only(TaskState::Open)),
        ("done", "Completadas", Filter::Only(TaskState::Done)),
    ]
    .into_iter()
    .map(|(value, label, filter)| SelectOption {
        value: value.to_string(),
        label: label.to_string(),
        selected: filter == *selected,
    })
    .collect()
}

#[derive(Template)]
#[template(path = "tasks.html")]
pub struct TasksTemplate {
    pub ctx: PageContext,
    pub rows: Vec<TaskRow>,
    pub search: String,
    pub states: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "fragments/task_rows.html")]
pub struct TaskRowsFragment {
    pub rows: Vec<TaskRow>,
}

async fn rows(session: &Session, company_id: Uuid, query: &TaskQuery) -> Result<Vec<TaskRow>, PageError> {
    let tasks = session.tasks(company_id).list().await?;
    let today = Utc::now().date_naive();
    Ok(filter_records(&tasks, &query.search, |task| task.accepted_by(&query.state))
        .into_iter()
        .map(|task| TaskRow::new(company_id, task, today))
        .collect())
}

pub async fn tasks_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<TaskQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Tasks).await?;
    let rows = rows(&user.api(&state.api), company_id, &query).await?;

    Ok(TasksTemplate {
        ctx,
        rows,
        search: query.search.as_str().to_string(),
        states: state_options(&query.state),
    })
}

pub async fn task_rows(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<TaskQuery>,
) -> Result<impl IntoResponse, PageError> {
    Ok(TaskRowsFragment {
        rows: rows(&user.api(&state.api), company_id, &query).await?,
    })
}

#[derive(Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub due_date: String,
}

pub async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(input): Form<TaskInput>,
) -> Result<Response, PageError> {
    let due_date = match input.due_date.trim() {
        "" => None,
        raw => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| PageError::invalid(vec!["Fecha de vencimiento inválida".to_string()]))?,
        ),
    };
    let form = TaskForm {
        title: input.title.trim().to_string(),
        due_date,
    };
    form.validate()?;

    user.api(&state.api).tasks(company_id).create(&form).await?;
    Ok(hx_redirect(&format!("/companies/{company_id}/tasks")))
}

/// Complete every checked task. One failure fails the whole batch; tasks
/// already completed stay completed.
pub async fn complete_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let ids: Vec<Uuid> = fields
        .iter()
        .filter(|(name, _)| name == "task_id")
        .filter_map(|(_, value)| Uuid::parse_str(value).ok())
        .collect();
    if ids.is_empty() {
        return Err(PageError::invalid(vec!["Seleccioná al menos una tarea".to_string()]));
    }

    let completed = user.api(&state.api).tasks(company_id).complete_many(&ids).await?;
    tracing::info!(company_id = %company_id, completed = completed.len(), "Tasks completed");

    Ok(hx_redirect(&format!("/companies/{company_id}/tasks")))
}

pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, PageError> {
    user.api(&state.api).tasks(company_id).delete(task_id).await?;
    Ok(().into_response())
}
