//! One typed sub-client per API resource.

pub mod afip;
pub mod audit;
pub mod auth;
pub mod companies;
pub mod counterparties;
pub mod invoices;
pub mod members;
pub mod network;
pub mod payments;
pub mod tasks;
