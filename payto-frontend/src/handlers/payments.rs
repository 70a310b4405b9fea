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
use chrono::NaiveDate;
use payto_client::{collect_all, Session};
use payto_core::line_item::parse_decimal_input;
use payto_core::models::{InvoiceStatus, Payment, PaymentForm, PaymentStatus};
use payto_core::{filter_records, format_currency, Filter, SearchTerm};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub struct PaymentRow {
    pub company_id: String,
    pub id: String,
    pub invoice: String,
    pub counterparty: String,
    pub amount: String,
    pub retentions: String,
    pub net: String,
    pub method: String,
    pub status: String,
    pub pending: bool,
    pub paid_at: String,
}

impl PaymentRow {
    fn new(company_id: Uuid, payment: &Payment) -> Self {
        Self {
            company_id: company_id.to_string(),
            id: payment.id.to_string(),
            invoice: payment.invoice_number.clone().unwrap_or_else(|| "-".to_string()),
            counterparty: payment.counterparty_name.clone(),
            amount: format_currency(payment.amount),
            retentions: format_currency(payment.total_retentions()),
            net: format_currency(payment.net_amount()),
            method: payment.method.clone().unwrap_or_default(),
            status: payment.status.label().to_string(),
            pending: payment.status == PaymentStatus::Pending,
            paid_at: display_date(payment.paid_at),
        }
    }
}

#[derive(Deserialize)]
pub struct PaymentQuery {
    #[serde(default)]
    pub search: SearchTerm,
    #[serde(default)]
    pub status: Filter<PaymentStatus>,
}

fn status_options(selected: &Filter<PaymentStatus>) -> Vec<SelectOption> {
    let mut options = vec![SelectOption {
        value: "all".to_string(),
        label: "Todos los estados".to_string(),
        selected: selected.is_all(),
    }];
    options.extend(
        [PaymentStatus::Pending, PaymentStatus::Confirmed, PaymentStatus::Rejected]
            .iter()
            .map(|status| SelectOption {
                value: status.as_str().to_string(),
                label: status.label().to_string(),
                selected: *selected == Filter::Only(*status),
            }),
    );
    options
}

#[derive(Template)]
#[template(path = "payments.html")]
pub struct PaymentsTemplate {
    pub ctx: PageContext,
    pub rows: Vec<PaymentRow>,
    pub search: String,
    pub statuses: Vec<SelectOption>,
    /// Approved invoices a payment can be registered against.
    pub payable: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "fragments/payment_rows.html")]
pub struct PaymentRowsFragment {
    pub rows: Vec<PaymentRow>,
}

async fn rows(session: &Session, company_id: Uuid, query: &PaymentQuery) -> Result<Vec<PaymentRow>, PageError> {
    let payments = collect_all(session.payments(company_id).list()).await?;
    Ok(filter_records(&payments, &query.search, |payment| payment.accepted_by(&query.status))
        .into_iter()
        .map(|payment| PaymentRow::new(company_id, payment))
        .collect())
}

pub async fn payments_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PaymentQuery>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Payments).await?;
    let session = user.api(&state.api);

    let (rows, invoices) = tokio::try_join!(
        rows(&session, company_id, &query),
        async { collect_all(session.invoices(company_id).list()).await.map_err(PageError::from) },
    )?;

    let payable = invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Approved)
        .map(|invoice| SelectOption {
            value: invoice.id.to_string(),
            label: format!(
                "{} · {} · {}",
                invoice.display_number(),
                invoice.counterparty_name,
                format_currency(invoice.total)
            ),
            selected: false,
        })
        .collect();

    Ok(PaymentsTemplate {
        ctx,
        rows,
        search: query.search.as_str().to_string(),
        statuses: status_options(&query.status),
        payable,
    })
}

pub async fn payment_rows(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PaymentQuery>,
) -> Result<impl IntoResponse, PageError> {
    Ok(PaymentRowsFragment {
        rows: rows(&user.api(&state.api), company_id, &query).await?,
    })
}

/// Payment form as posted; every field arrives as text.
#[derive(Deserialize)]
pub struct PaymentInput {
    #[serde(default)]
    pub invoice_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub paid_at: String,
}

impl TryFrom<PaymentInput> for PaymentForm {
    type Error = PageError;

    fn try_from(input: PaymentInput) -> Result<Self, Self::Error> {
        let mut problems = Vec::new();

        let invoice_id = Uuid::parse_str(input.invoice_id.trim()).ok();
        if invoice_id.is_none() {
            problems.push("Seleccioná la factura a pagar".to_string());
        }
        let amount = match parse_decimal_input(&input.amount) {
            Ok(amount) => amount.unwrap_or_default(),
            Err(_) => {
                problems.push("El monto no es un número válido".to_string());
                Default::default()
            }
        };
        let paid_at = match input.paid_at.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    problems.push("Fecha de pago inválida".to_string());
                    None
                }
            },
        };

        let Some(invoice_id) = invoice_id.filter(|_| problems.is_empty()) else {
            return Err(PageError::invalid(problems));
        };
        let method = Some(input.method.trim().to_string()).filter(|method| !method.is_empty());
        let form = PaymentForm {
            invoice_id,
            amount,
            method,
            paid_at,
        };
        form.validate()?;
        Ok(form)
    }
}

pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(input): Form<PaymentInput>,
) -> Result<Response, PageError> {
    let form = PaymentForm::try_from(input)?;
    let payment = user.api(&state.api).payments(company_id).create(&form).await?;

    tracing::info!(payment_id = %payment.id, amount = %payment.amount, "Payment registered");
    Ok(hx_redirect(&format!("/companies/{company_id}/payments")))
}

#[derive(Template)]
#[template(path = "fragments/payment_row.html")]
pub struct PaymentRowFragment {
    pub row: PaymentRow,
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, PageError> {
    let payment = user.api(&state.api).payments(company_id).confirm(payment_id).await?;
    Ok(PaymentRowFragment {
        row: PaymentRow::new(company_id, &payment),
    })
}

pub async fn reject_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((company_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, PageError> {
    let payment = user.api(&state.api).payments(company_id).reject(payment_id).await?;
    Ok(PaymentRowFragment {
        row: PaymentRow::new(company_id, &payment),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(invoice_id: &str, amount: &str, paid_at: &str) -> PaymentInput {
        PaymentInput {
            invoice_id: invoice_id.into(),
            amount: amount.into(),
            method: " transferencia ".into(),
            paid_at: paid_at.into(),
        }
    }

    #[test]
    fn converts_typed_values() {
        let form = PaymentForm::try_from(input("0b7e7a36-7d53-4bb4-8f6c-4d0f1e1f2a3b", "1.500,00", "")).ok();
        // "1.500,00" mixes separators and is not accepted
        assert!(form.is_none());

        let form = PaymentForm::try_from(input("0b7e7a36-7d53-4bb4-8f6c-4d0f1e1f2a3b", "1500,5", "2024-06-01"))
            .ok()
            .unwrap();
        assert_eq!(form.amount.to_string(), "1500.5");
        assert_eq!(form.method.as_deref(), Some("transferencia"));
        assert!(form.paid_at.is_some());
    }

    #[test]
    fn collects_every_problem() {
        let PageError(err) = PaymentForm::try_from(input("", "abc", "ayer")).err().unwrap();
        assert_eq!(
            err.user_message(),
            "Seleccioná la factura a pagar\nEl monto no es un número válido\nFecha de pago inválida"
        );
    }

    #[test]
    fn zero_amount_fails_validation() {
        assert!(PaymentForm::try_from(input("0b7e7a36-7d53-4bb4-8f6c-4d0f1e1f2a3b", "0", "")).is_err());
    }
}
