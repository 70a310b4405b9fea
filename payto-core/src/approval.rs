//! Mirroring of server-owned approval state into the pending list.
//!
//! The server decides when an invoice is approved. This module only folds its
//! answers into the list the user is looking at.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approval status as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    PendingApproval,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::PendingApproval => "pending_approval",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Unknown => "unknown",
        }
    }
}

/// Approval counters. Fully approved once `received >= required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalProgress {
    #[serde(rename = "approvals_received")]
    pub received: u32,
    #[serde(rename = "approvals_required")]
    pub required: u32,
}

impl ApprovalProgress {
    pub fn is_complete(&self) -> bool {
        self.received >= self.required
    }

    pub fn remaining(&self) -> u32 {
        self.required.saturating_sub(self.received)
    }
}

/// Invoice waiting for approvals, as listed on the approvals page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInvoice {
    pub id: Uuid,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub counterparty_name: String,
    #[serde(default)]
    pub total: Decimal,
    #[serde(flatten)]
    pub progress: ApprovalProgress,
}

/// Server answer to an approve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    #[serde(flatten)]
    pub progress: ApprovalProgress,
    #[serde(default = "pending")]
    pub status: ApprovalStatus,
}

fn pending() -> ApprovalStatus {
    ApprovalStatus::PendingApproval
}

/// What a merge did to the pending list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The invoice left the pending view.
    Removed,
    /// The invoice stays, counters replaced by the server values.
    Updated(ApprovalProgress),
    /// No invoice with that id was in the list.
    NotListed,
}

/// Fold an approve response into the pending list.
pub fn merge_approval(
    pending: &mut Vec<PendingInvoice>,
    invoice_id: Uuid,
    response: &ApprovalResponse,
) -> MergeOutcome {
    let Some(index) = pending.iter().position(|invoice| invoice.id == invoice_id) else {
        return MergeOutcome::NotListed;
    };

    if response.progress.is_complete() {
        pending.remove(index);
        MergeOutcome::Removed
    } else {
        pending[index].progress = response.progress;
        MergeOutcome::Updated(response.progress)
    }
}

/// A rejected invoice always leaves the pending list.
pub fn merge_rejection(pending: &mut Vec<PendingInvoice>, invoice_id: Uuid) -> MergeOutcome {
    let before = pending.len();
    pending.retain(|invoice| invoice.id != invoice_id);
    if pending.len() < before {
        MergeOutcome::Removed
    } else {
        MergeOutcome::NotListed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(received: u32, required: u32) -> PendingInvoice {
        PendingInvoice {
            id: Uuid::new_v4(),
            number: Some("0001-00000042".to_string()),
            counterparty_name: "Acme SRL".to_string(),
            total: dec!(242),
            progress: ApprovalProgress { received, required },
        }
    }

    fn response(received: u32, required: u32) -> ApprovalResponse {
        ApprovalResponse {
            progress: ApprovalProgress { received, required },
            status: ApprovalStatus::PendingApproval,
        }
    }

    #[test]
    fn completed_approval_removes_invoice() {
        let first = invoice(1, 2);
        let id = first.id;
        let mut pending = vec![first, invoice(0, 3)];

        let outcome = merge_approval(&mut pending, id, &response(2, 2));

        assert_eq!(outcome, MergeOutcome::Removed);
        assert_eq!(pending.len(), 1);
        assert!(pending.iter().all(|i| i.id != id));
    }

    #[test]
    fn partial_approval_updates_counter() {
        let first = invoice(0, 3);
        let id = first.id;
        let mut pending = vec![first];

        let outcome = merge_approval(&mut pending, id, &response(1, 3));

        assert_eq!(
            outcome,
            MergeOutcome::Updated(ApprovalProgress {
                received: 1,
                required: 3
            })
        );
        assert_eq!(pending[0].progress.received, 1);
        assert_eq!(pending[0].progress.remaining(), 2);
    }

    #[test]
    fn over_approval_still_removes() {
        let first = invoice(2, 2);
        let id = first.id;
        let mut pending = vec![first];
        assert_eq!(
            merge_approval(&mut pending, id, &response(3, 2)),
            MergeOutcome::Removed
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn unknown_invoice_is_noop() {
        let mut pending = vec![invoice(0, 1)];
        let outcome = merge_approval(&mut pending, Uuid::new_v4(), &response(1, 1));
        assert_eq!(outcome, MergeOutcome::NotListed);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn rejection_removes() {
        let first = invoice(1, 3);
        let id = first.id;
        let mut pending = vec![first];
        assert_eq!(merge_rejection(&mut pending, id), MergeOutcome::Removed);
        assert_eq!(merge_rejection(&mut pending, id), MergeOutcome::NotListed);
    }

    #[test]
    fn decodes_server_payload() {
        let response: ApprovalResponse = serde_json::from_str(
            r#"{"approvals_received":2,"approvals_required":3,"status":"pending_approval"}"#,
        )
        .unwrap();
        assert_eq!(response.progress.received, 2);
        assert!(!response.progress.is_complete());
    }
}
