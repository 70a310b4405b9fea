//! Network connections between companies.

use crate::cuit::display_cuit;
use crate::filter::{Filter, Searchable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "Pendiente",
            ConnectionStatus::Accepted => "Conectada",
            ConnectionStatus::Rejected => "Rechazada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDirection {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("valor de filtro desconocido: {0}")]
pub struct UnknownConnectionFilter(pub String);

impl FromStr for ConnectionStatus {
    type Err = UnknownConnectionFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(UnknownConnectionFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    /// The other company in the connection.
    pub company_id: Uuid,
    pub company_name: String,
    #[serde(default)]
    pub cuit: String,
    pub status: ConnectionStatus,
    #[serde(default = "outgoing")]
    pub direction: ConnectionDirection,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn outgoing() -> ConnectionDirection {
    ConnectionDirection::Outgoing
}

impl Connection {
    pub fn display_cuit(&self) -> String {
        display_cuit(&self.cuit)
    }

    pub fn accepted_by(&self, status: &Filter<ConnectionStatus>) -> bool {
        status.accepts(&self.status)
    }
}

impl Searchable for Connection {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.company_name, &self.cuit]
    }
}

/// Ask another company, identified by CUIT, to connect.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConnectionRequest {
    #[validate(custom(function = "crate::models::validate_cuit"))]
    pub cuit: String,
    #[serde(default)]
    pub message: Option<String>,
}
