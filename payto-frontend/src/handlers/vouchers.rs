//! Emission of AFIP vouchers to clients.

use crate::error::PageError;
use crate::handlers::hx_redirect;
use crate::handlers::invoices::{
    blocked, counterparty_options, perception_kind_options, rate_options, CounterpartyOption, SelectOption,
};
use crate::models::draft::DraftForm;
use crate::models::page::{PageContext, Section};
use crate::models::totals::TotalsView;
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use payto_core::models::{CounterpartyKind, InvoiceDirection};
use payto_core::{TaxCondition, Totals, VoucherKind, VoucherType};
use uuid::Uuid;

fn kind_options() -> Vec<SelectOption> {
    VoucherKind::ALL
        .iter()
        .map(|kind| SelectOption {
            value: kind.as_str().to_string(),
            label: kind.label().to_string(),
            selected: *kind == VoucherKind::Invoice,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "voucher_new.html")]
pub struct NewVoucherTemplate {
    pub ctx: PageContext,
    pub clients: Vec<CounterpartyOption>,
    pub voucher_kinds: Vec<SelectOption>,
    pub rates: Vec<SelectOption>,
    pub kinds: Vec<SelectOption>,
    pub issuer_condition: String,
    pub point_of_sale: String,
    pub voucher: String,
    pub totals: TotalsView,
}

/// Voucher type and totals as they will be submitted.
#[derive(Template)]
#[template(path = "fragments/voucher_preview.html")]
pub struct VoucherPreviewFragment {
    pub voucher: String,
    pub totals: TotalsView,
}

fn describe(voucher: Option<VoucherType>) -> String {
    match voucher {
        Some(voucher) => format!("{voucher} (código AFIP {:03})", voucher.afip_code()),
        None => "Seleccioná un cliente para determinar la letra".to_string(),
    }
}

pub async fn new_voucher_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Vouchers).await?;
    let company = ctx.company()?;
    let issuer_condition = company.tax_condition.label().to_string();
    let point_of_sale = company
        .point_of_sale
        .map(|pos| format!("{pos:05}"))
        .unwrap_or_else(|| "Sin configurar".to_string());

    let clients = counterparty_options(&user.api(&state.api), company_id, CounterpartyKind::Client).await?;

    Ok(NewVoucherTemplate {
        ctx,
        clients,
        voucher_kinds: kind_options(),
        rates: rate_options(state.totals.default_rate()),
        kinds: perception_kind_options(),
        issuer_condition,
        point_of_sale,
        voucher: describe(None),
        totals: TotalsView::new(&Totals::empty(), true),
    })
}

async fn issuer_condition(state: &AppState, user: &AuthUser, company_id: Uuid) -> Result<TaxCondition, PageError> {
    let ctx = PageContext::load(state, user, Some(company_id), Section::Vouchers).await?;
    Ok(ctx.company()?.tax_condition)
}

async fn receiver_condition(
    state: &AppState,
    user: &AuthUser,
    company_id: Uuid,
    client_id: Uuid,
) -> Result<TaxCondition, PageError> {
    let client = user
        .api(&state.api)
        .counterparties(company_id, CounterpartyKind::Client)
        .get(client_id)
        .await?;
    Ok(client.tax_condition)
}

/// Letter and totals for the voucher as typed. `C` vouchers are previewed
/// with their items as not taxed.
pub async fn preview_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse, PageError> {
    let draft = DraftForm::new(fields).parse();

    let voucher = match draft.counterparty_id {
        Some(client_id) => {
            let (issuer, receiver) = tokio::try_join!(
                issuer_condition(&state, &user, company_id),
                receiver_condition(&state, &user, company_id, client_id),
            )?;
            Some(VoucherType::for_parties(draft.kind, issuer, receiver)?)
        }
        None => None,
    };

    let items = match voucher {
        Some(voucher) => voucher.prepare_items(&draft.items),
        None => draft.items.clone(),
    };
    let totals = state.totals.compute(&items, &draft.perceptions)?;

    Ok(VoucherPreviewFragment {
        voucher: describe(voucher),
        totals: TotalsView::new(&totals, voucher.map_or(true, |v| v.letter.discriminates_iva())),
    })
}

pub async fn emit_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let mut draft = DraftForm::new(fields)
        .parse()
        .into_draft()
        .map_err(|problems| blocked(problems, "voucher"))?;

    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Vouchers).await?;
    let company = ctx.company()?;
    let receiver = receiver_condition(&state, &user, company_id, draft.counterparty_id).await?;

    let voucher = VoucherType::for_parties(draft.kind, company.tax_condition, receiver)?;
    draft.direction = InvoiceDirection::Issued;
    draft.letter = Some(voucher.letter);
    draft.voucher_code = Some(voucher.afip_code());
    draft.point_of_sale = company.point_of_sale;
    draft.items = voucher.prepare_items(&draft.items);

    let invoice = user.api(&state.api).invoices(company_id).emit_voucher(&draft).await?;
    tracing::info!(
        invoice_id = %invoice.id,
        voucher = %voucher,
        afip_code = voucher.afip_code(),
        "Voucher emitted"
    );

    Ok(hx_redirect(&format!("/companies/{company_id}/invoices")))
}
