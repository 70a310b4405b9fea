use crate::filter::Searchable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the company audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    #[serde(default)]
    pub actor_name: String,
    #[serde(default)]
    pub actor_email: String,
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl Searchable for AuditEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.action,
            &self.actor_name,
            &self.actor_email,
            &self.entity_type,
        ]
    }
}
