//! Company network. The three sources load independently; a failed one is
//! reported next to the ones that loaded.

use crate::error::PageError;
use crate::handlers::hx_redirect;
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
use payto_core::models::{Connection, ConnectionRequest, ConnectionStatus};
use payto_core::{filter_records, Filter, SearchTerm};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub struct ConnectionRow {
    pub company_id: String,
    pub id: String,
    pub name: String,
    pub cuit: String,
    pub status: String,
    pub since: String,
}

impl ConnectionRow {
    fn new(company_id: Uuid, connection: &Connection) -> Self {
        Self {
            company_id: company_id.to_string(),
            id: connection.id.to_string(),
            name: connection.company_name.clone(),
            cuit: connection.display_cuit(),
            status: connection.status.label().to_string(),
            since: connection
                .created_at
                .map(|at| at.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
        }
    }
}

/// One source of the page: its rows, or the reason it did not load.
pub struct Source {
    pub rows: Vec<ConnectionRow>,
    pub failed: bool,
}

#[derive(Deserialize)]
pub struct NetworkQuery {
    #[serde(default)]
    pub search: SearchTerm,
    #[serde(default)]
    pub status: Filter<ConnectionStatus>,
}

#[derive(Template)]
#[template(path = "network.html")]
pub struct NetworkTemplate {
    pub ctx: PageContext,
    pub connections: Source,
    pub incoming: Source,
    pub outgoing: Source,
    pub failures: Vec<String>,
    pub search: String,
    pub statuses: Vec<SelectOption>,
}

fn status_options(selected: &Filter<ConnectionStatus>) -> Vec<SelectOption> {
    std::iter::once(SelectOption {
        value: "all".to_string(),
        label: "Todos los estados".to_string(),
        selected: selected.is_all(),
    })
    .chain(
        [ConnectionStatus::Pending, ConnectionStatus::Accepted, ConnectionStatus::Rejected]
            .iter()
            .map(|status| SelectOption {
                value: status.as_str().to_string(),
                label: status.label().to_string(),
                selected: *selected == Filter::Only(*status),
            }),
    )
    .collect()
}

fn source(
    company_id: Uuid,
    loaded: &payto_client::fanout::Settled<Vec<Connection>>,
    query: &NetworkQuery,
) -> Source {
    match loaded {
        Ok(connections) => Source {
            rows: filter_records(connections, &query.search, |c| c.accepted_by(&query.status))
                .into_iter()
                .map(|connection| ConnectionRow::new(company_id, connection))
                .collect(),
            failed: false,
        },
        Err(_) => Source {
            rows: Vec::new(),
            failed: true,
        },
    }
}

pub async fn network_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<NetworkQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Network).await?;
    let overview = user.api(&state.api).network(company_id).overview().await;

    let failures = overview.failures();
    if !failures.is_empty() {
        tracing::warn!(failures = ?failures, "Network page partially loaded");
    }

    Ok(NetworkTemplate {
        ctx,
        connections: source(company_id, &overview.connections, &query),
        incoming: source(company_id, &overview.incoming, &query),
        outgoing: source(company_id, &overview.outgoing, &query),
        failures,
        search: query.search.as_str().to_string(),
        statuses: status_options(&query.status),
    })
}

fn back_to_network(company_id: Uuid) -> Response {
    hx_redirect(&format!("/companies/{company_id}/network"))
}

pub async fn request_connection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(mut request): Form<ConnectionRequest>,
) -> Result<Response, PageError> {
    request.validate()?;
    request.message = request.message.filter(|message| !message.trim().is_empty());
    user.api(&state.api).network(company_id).request(&request).await?;
    Ok(back_to_network(company_id))
}

pub async fn accept_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, request_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, PageError> {
    user.api(&state.api).network(company_id).accept(request_id).await?;
    Ok(back_to_network(company_id))
}

pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, request_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, PageError> {
    user.api(&state.api).network(company_id).reject(request_id).await?;
    Ok(back_to_network(company_id))
}

pub async fn remove_connection(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, connection_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, PageError> {
    user.api(&state.api).network(company_id).remove(connection_id).await?;
    Ok(().into_response())
}
