//! Domain rules of the PayTo frontend: invoice totals, submit-time
//! validation, approval merging, list filtering and the API resource types.
//!
//! Everything here is pure and synchronous. I/O lives in `payto-client` and
//! `payto-frontend`.

pub mod approval;
pub mod cuit;
pub mod filter;
pub mod line_item;
pub mod models;
pub mod money;
pub mod perception;
pub mod tax;
pub mod totals;
pub mod validation;
pub mod voucher;

pub use approval::{merge_approval, merge_rejection, ApprovalProgress, ApprovalResponse, MergeOutcome, PendingInvoice};
pub use cuit::Cuit;
pub use filter::{filter_records, Filter, SearchTerm, Searchable};
pub use line_item::LineItem;
pub use money::{format_currency, format_percent, round_cents};
pub use perception::{Perception, PerceptionKind};
pub use tax::TaxRate;
pub use totals::{Totals, TotalsCalculator, TotalsError};
pub use validation::{validate_draft, validate_items, DraftError, DraftErrors};
pub use voucher::{IssuerCannotEmit, TaxCondition, VoucherKind, VoucherLetter, VoucherType};
