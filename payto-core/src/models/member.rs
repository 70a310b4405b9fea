//! Company membership and roles.

use crate::filter::Searchable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Accountant,
    Approver,
    Viewer,
}

impl MemberRole {
    pub const ALL: [MemberRole; 5] = [
        MemberRole::Owner,
        MemberRole::Admin,
        MemberRole::Accountant,
        MemberRole::Approver,
        MemberRole::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Accountant => "accountant",
            MemberRole::Approver => "approver",
            MemberRole::Viewer => "viewer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemberRole::Owner => "Dueño",
            MemberRole::Admin => "Administrador",
            MemberRole::Accountant => "Contador",
            MemberRole::Approver => "Aprobador",
            MemberRole::Viewer => "Lectura",
        }
    }

    /// Whether the role may invite, change or remove members. Only used to
    /// hide controls; the API enforces it.
    pub fn manages_members(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    pub fn approves_invoices(&self) -> bool {
        matches!(
            self,
            MemberRole::Owner | MemberRole::Admin | MemberRole::Approver
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rol desconocido: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for MemberRole {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        MemberRole::ALL
            .into_iter()
            .find(|role| role.as_str() == raw)
            .ok_or_else(|| UnknownRole(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

impl Searchable for Member {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InviteMember {
    #[validate(email(message = "Ingresá un email válido"))]
    pub email: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoleChange {
    pub role: MemberRole,
}
