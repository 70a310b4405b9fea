//! Typed client for the PayTo REST API.
//!
//! Responses may arrive bare or wrapped in `{"data": ...}`; both decode into
//! the same types. Non-2xx answers become [`ApiError::Api`] carrying the
//! server's `message` verbatim. List endpoints are exposed as lazy streams
//! that page until the first empty page.
//!
//! ```no_run
//! # async fn demo() -> Result<(), payto_client::ApiError> {
//! use futures::TryStreamExt;
//! use payto_client::{ApiConfig, PaytoClient};
//!
//! let client = PaytoClient::new(ApiConfig::new("https://api.payto.example"))?;
//! let session = client.session("access-token");
//! let companies = session.companies().list().await?;
//! if let Some(company) = companies.first() {
//!     let invoices: Vec<_> = session.invoices(company.id).list().try_collect().await?;
//!     println!("{} invoices", invoices.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fanout;
pub mod pagination;

pub use api::afip::CertificateUpload;
pub use api::network::NetworkOverview;
pub use client::{PaytoClient, Session};
pub use config::ApiConfig;
pub use error::ApiError;
pub use pagination::{collect_all, paginate};
