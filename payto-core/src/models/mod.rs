//! DTOs for the PayTo REST API resources.

pub mod afip;
pub mod audit;
pub mod auth;
pub mod company;
pub mod connection;
pub mod counterparty;
pub mod invoice;
pub mod member;
pub mod payment;
pub mod task;

pub use afip::{CertificateStatus, CertificateTest, PadronRecord};
pub use audit::AuditEntry;
pub use auth::{LoginRequest, LoginResponse, UserProfile};
pub use company::{Company, CompanyForm};
pub use connection::{Connection, ConnectionDirection, ConnectionRequest, ConnectionStatus};
pub use counterparty::{Counterparty, CounterpartyForm, CounterpartyKind, RecordState};
pub use invoice::{Invoice, InvoiceDirection, InvoiceDraft, InvoiceStatus};
pub use member::{InviteMember, Member, MemberRole, RoleChange};
pub use payment::{Payment, PaymentForm, PaymentStatus, Retention};
pub use task::{Task, TaskForm, TaskState};

use validator::ValidationError;

/// `validator` hook for CUIT fields.
pub(crate) fn validate_cuit(raw: &str) -> Result<(), ValidationError> {
    raw.parse::<crate::cuit::Cuit>().map(|_| ()).map_err(|err| {
        let mut error = ValidationError::new("cuit");
        error.message = Some(err.to_string().into());
        error
    })
}
