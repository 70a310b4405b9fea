//! Clients and suppliers. Both share one shape and one form.

use crate::cuit::display_cuit;
use crate::filter::{Filter, Searchable};
use crate::voucher::TaxCondition;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyKind {
    Client,
    Supplier,
}

impl CounterpartyKind {
    /// API and URL path segment.
    pub fn path(&self) -> &'static str {
        match self {
            CounterpartyKind::Client => "clients",
            CounterpartyKind::Supplier => "suppliers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CounterpartyKind::Client => "cliente",
            CounterpartyKind::Supplier => "proveedor",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            CounterpartyKind::Client => "Clientes",
            CounterpartyKind::Supplier => "Proveedores",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            CounterpartyKind::Client => CounterpartyKind::Supplier,
            CounterpartyKind::Supplier => CounterpartyKind::Client,
        }
    }
}

/// Active/archived filter on counterparty lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Active,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("estado desconocido: {0}")]
pub struct UnknownRecordState(pub String);

impl FromStr for RecordState {
    type Err = UnknownRecordState;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "active" => Ok(RecordState::Active),
            "archived" => Ok(RecordState::Archived),
            other => Err(UnknownRecordState(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: Uuid,
    pub business_name: String,
    pub cuit: String,
    pub tax_condition: TaxCondition,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl Counterparty {
    pub fn display_cuit(&self) -> String {
        display_cuit(&self.cuit)
    }

    pub fn state(&self) -> RecordState {
        if self.archived {
            RecordState::Archived
        } else {
            RecordState::Active
        }
    }

    /// Categorical filters of the clients and suppliers pages.
    pub fn accepted_by(&self, state: &Filter<RecordState>, condition: &Filter<TaxCondition>) -> bool {
        state.accepts(&self.state()) && condition.accepts(&self.tax_condition)
    }
}

impl Searchable for Counterparty {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.business_name.as_str(), self.cuit.as_str()];
        if let Some(email) = &self.email {
            fields.push(email);
        }
        fields
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CounterpartyForm {
    #[validate(length(min = 1, message = "Ingresá la razón social"))]
    pub business_name: String,
    #[validate(custom(function = "crate::models::validate_cuit"))]
    pub cuit: String,
    #[serde(default)]
    pub tax_condition: TaxCondition,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Ingresá un email válido"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address: Option<String>,
}

fn blank_as_none<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

impl From<&Counterparty> for CounterpartyForm {
    fn from(record: &Counterparty) -> Self {
        Self {
            business_name: record.business_name.clone(),
            cuit: record.cuit.clone(),
            tax_condition: record.tax_condition,
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
        }
    }
}
