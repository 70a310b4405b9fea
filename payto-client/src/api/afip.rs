use crate::client::{Session, Verb};
use crate::error::ApiError;
use payto_core::models::{CertificateStatus, CertificateTest, PadronRecord};
use payto_core::Cuit;
use serde::Serialize;
use uuid::Uuid;

/// PEM material for the AFIP web-service certificate.
#[derive(Serialize)]
pub struct CertificateUpload {
    pub certificate: String,
    pub private_key: String,
}

impl std::fmt::Debug for CertificateUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateUpload")
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &"[redacted]")
            .finish()
    }
}

pub struct AfipApi<'a> {
    session: &'a Session,
    company_id: Uuid,
}

impl<'a> AfipApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid) -> Self {
        Self {
            session,
            company_id,
        }
    }

    fn base(&self) -> String {
        format!("/companies/{}/afip", self.company_id)
    }

    pub async fn certificate(&self) -> Result<CertificateStatus, ApiError> {
        self.session
            .call(
                Verb::Get,
                "GET /companies/:id/afip/certificate",
                format!("{}/certificate", self.base()),
            )
            .send()
            .await
    }

    pub async fn upload_certificate(&self, upload: &CertificateUpload) -> Result<CertificateStatus, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/afip/certificate",
                format!("{}/certificate", self.base()),
            )
            .body(upload)?
            .send()
            .await
    }

    pub async fn test_certificate(&self) -> Result<CertificateTest, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/afip/certificate/test",
                format!("{}/certificate/test", self.base()),
            )
            .send()
            .await
    }

    pub async fn delete_certificate(&self) -> Result<(), ApiError> {
        self.session
            .call(
                Verb::Delete,
                "DELETE /companies/:id/afip/certificate",
                format!("{}/certificate", self.base()),
            )
            .send_empty()
            .await
    }

    /// Look a taxpayer up in the AFIP registry. Takes a parsed CUIT so an
    /// invalid one never reaches the network.
    pub async fn padron(&self, cuit: &Cuit) -> Result<PadronRecord, ApiError> {
        self.session
            .call(
                Verb::Get,
                "GET /companies/:id/afip/padron/:cuit",
                format!("{}/padron/{}", self.base(), cuit.digits()),
            )
            .send()
            .await
    }
}
