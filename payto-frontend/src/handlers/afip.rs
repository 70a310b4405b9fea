use crate::error::PageError;
use crate::models::page::{PageContext, Section};
use crate::models::user::AuthUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use payto_client::CertificateUpload;
use payto_core::models::{CertificateStatus, PadronRecord};
use payto_core::Cuit;
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;

pub struct CertificateView {
    pub company_id: String,
    pub configured: bool,
    pub expired: bool,
    pub cuit: String,
    pub expires_at: String,
    pub environment: String,
}

impl CertificateView {
    fn new(company_id: Uuid, status: &CertificateStatus) -> Self {
        Self {
            company_id: company_id.to_string(),
            configured: status.configured,
            expired: status.is_expired(),
            cuit: status
                .cuit
                .as_deref()
                .map(payto_core::cuit::display_cuit)
                .unwrap_or_default(),
            expires_at: crate::handlers::display_date(status.expires_at),
            environment: match status.environment.as_deref() {
                Some("produccion") => "Producción".to_string(),
                Some("homologacion") => "Homologación".to_string(),
                Some(other) => other.to_string(),
                None => "-".to_string(),
            },
        }
    }
}

#[derive(Template)]
#[template(path = "afip.html")]
pub struct AfipTemplate {
    pub ctx: PageContext,
    pub certificate: CertificateView,
}

#[derive(Template)]
#[template(path = "fragments/certificate.html")]
pub struct CertificateFragment {
    pub certificate: CertificateView,
}

pub async fn afip_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let ctx = PageContext::load(&state, &user, Some(company_id), Section::Afip).await?;
    let status = user.api(&state.api).afip(company_id).certificate().await?;

    Ok(AfipTemplate {
        ctx,
        certificate: CertificateView::new(company_id, &status),
    })
}

fn bad_upload(message: &str) -> PageError {
    PageError(AppError::BadRequest(anyhow::anyhow!(message.to_string())))
}

/// Read the PEM certificate and key from the upload form.
async fn read_upload(mut multipart: Multipart) -> Result<CertificateUpload, PageError> {
    let mut certificate = None;
    let mut private_key = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_upload("No se pudo leer el archivo enviado"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let text = field
            .text()
            .await
            .map_err(|_| bad_upload("El archivo debe ser texto PEM"))?;
        match name.as_str() {
            "certificate" => certificate = Some(text),
            "private_key" => private_key = Some(text),
            _ => {}
        }
    }

    let mut problems = Vec::new();
    let certificate = certificate.filter(|pem| pem.contains("BEGIN CERTIFICATE"));
    if certificate.is_none() {
        problems.push("Adjuntá el certificado (.crt) emitido por AFIP".to_string());
    }
    let private_key = private_key.filter(|pem| pem.contains("PRIVATE KEY"));
    if private_key.is_none() {
        problems.push("Adjuntá la clave privada (.key)".to_string());
    }

    match (certificate, private_key) {
        (Some(certificate), Some(private_key)) => Ok(CertificateUpload {
            certificate,
            private_key,
        }),
        _ => Err(PageError::invalid(problems)),
    }
}

pub async fn upload_certificate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, PageError> {
    let upload = read_upload(multipart).await?;
    let status = user
        .api(&state.api)
        .afip(company_id)
        .upload_certificate(&upload)
        .await?;

    tracing::info!(company_id = %company_id, expires_at = ?status.expires_at, "AFIP certificate uploaded");
    Ok(CertificateFragment {
        certificate: CertificateView::new(company_id, &status),
    })
}

#[derive(Template)]
#[template(path = "fragments/certificate_test.html")]
pub struct CertificateTestFragment {
    pub ok: bool,
    pub message: String,
}

pub async fn test_certificate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let result = user.api(&state.api).afip(company_id).test_certificate().await?;
    let message = if result.message.trim().is_empty() {
        if result.ok {
            "Conexión con AFIP correcta".to_string()
        } else {
            "AFIP rechazó el certificado".to_string()
        }
    } else {
        result.message
    };

    Ok(CertificateTestFragment { ok: result.ok, message })
}

pub async fn delete_certificate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    user.api(&state.api).afip(company_id).delete_certificate().await?;

    Ok(CertificateFragment {
        certificate: CertificateView::new(
            company_id,
            &CertificateStatus {
                configured: false,
                cuit: None,
                expires_at: None,
                environment: None,
            },
        ),
    })
}

#[derive(Deserialize)]
pub struct PadronQuery {
    #[serde(default)]
    pub cuit: String,
}

pub struct PadronView {
    pub cuit: String,
    pub name: String,
    pub condition: String,
    pub address: String,
    pub activity: String,
    pub status: String,
}

impl From<PadronRecord> for PadronView {
    fn from(record: PadronRecord) -> Self {
        Self {
            cuit: payto_core::cuit::display_cuit(&record.cuit),
            name: record.name,
            condition: record
                .tax_condition
                .map(|condition| condition.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
            address: record.address.unwrap_or_default(),
            activity: record.activity.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "fragments/padron.html")]
pub struct PadronFragment {
    pub record: PadronView,
}

/// The CUIT is checked locally; an invalid one never reaches the API.
pub async fn padron_lookup(
    State(state): State<AppState>,
    user: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PadronQuery>,
) -> Result<impl IntoResponse, PageError> {
    let cuit: Cuit = query
        .cuit
        .parse()
        .map_err(|err: payto_core::cuit::CuitError| PageError::invalid(vec![err.to_string()]))?;

    let record = user.api(&state.api).afip(company_id).padron(&cuit).await?;
    Ok(PadronFragment {
        record: record.into(),
    })
}
