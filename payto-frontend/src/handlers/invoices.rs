use crate::error::PageError;
use crate::handlers::{display_date, hx_redirect};
use crate::models::draft::DraftForm;
use crate::models::page::{PageContext, Section};
use crate::models::totals::{TotalsFragment, TotalsView};
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form,
};
use payto_client::{collect_all, Session};
use payto_core::models::{Counterparty, CounterpartyKind, Invoice, InvoiceDirection, InvoiceStatus};
use payto_core::{filter_records, format_currency, Filter, PerceptionKind, SearchTerm, TaxRate, Totals};
use serde::Deserialize;
use uuid::Uuid;

pub struct InvoiceRow {
    pub number: String,
    pub counterparty: String,
    pub direction: String,
    pub status: String,
    pub status_class: &'static str,
    pub total: String,
    pub issue_date: String,
    pub due_date: String,
    pub approvals: String,
}

fn status_class(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Approved | InvoiceStatus::Paid => "ok",
        InvoiceStatus::PendingApproval => "warn",
        InvoiceStatus::Rejected | InvoiceStatus::Cancelled => "bad",
        InvoiceStatus::Draft | InvoiceStatus::Other => "",
    }
}

impl From<&Invoice> for InvoiceRow {
    fn from(invoice: &Invoice) -> Self {
        let progress = invoice.approval_progress();
        Self {
            number: invoice.display_number(),
            counterparty: invoice.counterparty_name.clone(),
            direction: invoice.direction.label().to_string(),
            status: invoice.status.label().to_string(),
            status_class: status_class(invoice.status),
            total: format_currency(invoice.total),
            issue_date: display_date(invoice.issue_date),
            due_date: display_date(invoice.due_date),
            approvals: if progress.required > 0 {
                format!("{}/{}", progress.received, progress.required)
            } else {
                String::new()
            },
        }
    }
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

#[derive(Deserialize)]
pub struct InvoiceQuery {
    #[serde(default)]
    pub search: SearchTerm,
    #[serde(default)]
    pub status: Filter<InvoiceStatus>,
    #[serde(default)]
    pub direction: Filter<InvoiceDirection>,
}

const STATUSES: [InvoiceStatus; 6] = [
    InvoiceStatus::Draft,
    InvoiceStatus::PendingApproval,
    InvoiceStatus::Approved,
    InvoiceStatus::Rejected,
    InvoiceStatus::Paid,
    InvoiceStatus::Cancelled,
];

fn status_options(selected: &Filter<InvoiceStatus>) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("all", "Todos los estados", selected.is_all()))
        .chain(STATUSES.iter().map(|status| {
            SelectOption::new(status.as_str(), status.label(), *selected == Filter::Only(*status))
        }))
        .collect()
}

fn direction_options(selected: &Filter<InvoiceDirection>) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("all", "Emitidas y recibidas", selected.is_all()))
        .chain(
            [InvoiceDirection::Issued, InvoiceDirection::Received]
                .iter()
                .map(|direction| {
                    SelectOption::new(
                        direction.as_str(),
                        direction.label(),
                        *selected == Filter::Only(*direction),
                    )
                }),
        )
        .collect()
}

#[derive(Template)]
#[template(path = "invoices.html")]
pub struct InvoicesTemplate {
    pub ctx: PageContext,
    pub rows: Vec<InvoiceRow>,
    pub search: String,
    pub statuses: Vec<SelectOption>,
    pub directions: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "fragments/invoice_rows.html")]
pub struct InvoiceRowsFragment {
    pub rows: Vec<InvoiceRow>,
}

async fn rows(session: &Session, company_id: Uuid, query: &InvoiceQuery) -> Result<Vec<InvoiceRow>, PageError> {
    let invoices = collect_all(session.invoices(company_id).list()).await?;
    Ok(filter_records(&invoices, &query.search, |invoice| {
        invoice.accepted_by(&query.status, &query.direction)
    })
    .into_iter()
    .map(InvoiceRow::from)
    .collect())
}

pub async fn invoices_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<InvoiceQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Invoices).await?;
    let rows = rows(&user.api(&state.api), company_id, &query).await?;

    Ok(InvoicesTemplate {
        ctx,
        rows,
        search: query.search.as_str().to_string(),
        statuses: status_options(&query.status),
        directions: direction_options(&query.direction),
    })
}

pub async fn invoice_rows(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<InvoiceQuery>,
) -> Result<impl IntoResponse, PageError> {
    Ok(InvoiceRowsFragment {
        rows: rows(&user.api(&state.api), company_id, &query).await?,
    })
}

/// IVA choices of an item row. The blank value uses the configured default.
pub fn rate_options(default_rate: TaxRate) -> Vec<SelectOption> {
    let percents = ["21", "10.5", "27", "5", "2.5", "0"];
    std::iter::once(SelectOption::new("", format!("Por defecto ({default_rate})"), true))
        .chain(percents.iter().map(|rate| SelectOption::new(*rate, format!("{rate}%"), false)))
        .chain([TaxRate::Exempt, TaxRate::NotTaxed].iter().map(|sentinel| {
            SelectOption::new(sentinel.as_decimal().to_string(), sentinel.label(), false)
        }))
        .collect()
}

pub fn perception_kind_options() -> Vec<SelectOption> {
    [
        PerceptionKind::Iibb,
        PerceptionKind::Iva,
        PerceptionKind::Ganancias,
        PerceptionKind::Municipal,
        PerceptionKind::Other,
    ]
    .iter()
    .enumerate()
    .map(|(index, kind)| SelectOption::new(kind.as_str(), kind.label(), index == 0))
    .collect()
}

#[derive(Template)]
#[template(path = "fragments/item_row.html")]
pub struct ItemRowFragment {
    pub rates: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "fragments/perception_row.html")]
pub struct PerceptionRowFragment {
    pub kinds: Vec<SelectOption>,
}

pub async fn item_row(State(state): State<AppState>, _user: AuthUser) -> impl IntoResponse {
    ItemRowFragment {
        rates: rate_options(state.totals.default_rate()),
    }
}

pub async fn perception_row(_user: AuthUser) -> impl IntoResponse {
    PerceptionRowFragment {
        kinds: perception_kind_options(),
    }
}

pub struct CounterpartyOption {
    pub id: String,
    pub label: String,
}

impl From<&Counterparty> for CounterpartyOption {
    fn from(record: &Counterparty) -> Self {
        Self {
            id: record.id.to_string(),
            label: format!("{} ({})", record.business_name, record.display_cuit()),
        }
    }
}

/// Active counterparties of `kind`, for the selects of the draft forms.
pub async fn counterparty_options(
    session: &Session,
    company_id: Uuid,
    kind: CounterpartyKind,
) -> Result<Vec<CounterpartyOption>, PageError> {
    let records = collect_all(session.counterparties(company_id, kind).list()).await?;
    Ok(records
        .iter()
        .filter(|record| !record.archived)
        .map(CounterpartyOption::from)
        .collect())
}

#[derive(Template)]
#[template(path = "invoice_new.html")]
pub struct NewInvoiceTemplate {
    pub ctx: PageContext,
    pub clients: Vec<CounterpartyOption>,
    pub suppliers: Vec<CounterpartyOption>,
    pub rates: Vec<SelectOption>,
    pub kinds: Vec<SelectOption>,
    pub totals: TotalsView,
}

pub async fn new_invoice_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Invoices).await?;
    let session = user.api(&state.api);
    let (clients, suppliers) = tokio::try_join!(
        counterparty_options(&session, company_id, CounterpartyKind::Client),
        counterparty_options(&session, company_id, CounterpartyKind::Supplier),
    )?;

    Ok(NewInvoiceTemplate {
        ctx,
        clients,
        suppliers,
        rates: rate_options(state.totals.default_rate()),
        kinds: perception_kind_options(),
        totals: TotalsView::new(&Totals::empty(), true),
    })
}

/// Totals of the draft as currently typed. Never validates.
pub async fn preview_totals(
    State(state): State<AppState>,
    _user: AuthUser,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse, PageError> {
    let draft = DraftForm::new(fields).parse();
    let totals = state.totals.compute(&draft.items, &draft.perceptions)?;
    Ok(TotalsFragment {
        totals: TotalsView::new(&totals, true),
    })
}

pub(crate) fn blocked(problems: Vec<String>, form: &'static str) -> PageError {
    metrics::counter!("payto_submissions_blocked_total", "form" => form).increment(1);
    tracing::info!(form, problems = problems.len(), "Submission blocked by validation");
    PageError::invalid(problems)
}

pub async fn create_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let draft = DraftForm::new(fields)
        .parse()
        .into_draft()
        .map_err(|problems| blocked(problems, "invoice"))?;

    let invoice = user.api(&state.api).invoices(company_id).create(&draft).await?;
    tracing::info!(invoice_id = %invoice.id, total = %invoice.total, "Invoice created");

    Ok(hx_redirect(&format!("/companies/{company_id}/invoices")))
}
