//! JSON totals for scripts and integrations.

use crate::AppState;
use axum::{extract::State, Json};
use payto_core::{format_currency, validate_draft, LineItem, Perception, Totals};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TotalsRequest {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub perceptions: Vec<Perception>,
    /// Apply the submit-time rules before computing.
    #[serde(default)]
    pub validate: bool,
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    #[serde(flatten)]
    pub totals: Totals,
    pub formatted_total: String,
}

pub async fn compute_totals(
    State(state): State<AppState>,
    Json(request): Json<TotalsRequest>,
) -> Result<Json<TotalsResponse>, AppError> {
    if request.validate {
        validate_draft(&request.items, &request.perceptions)
            .map_err(|errors| AppError::InvalidSubmission(errors.messages()))?;
    }

    let totals = state
        .totals
        .compute(&request.items, &request.perceptions)
        .map_err(|err| AppError::InvalidSubmission(vec![err.to_string()]))?;
    Ok(Json(TotalsResponse {
        formatted_total: format_currency(totals.total),
        totals,
    }))
}
