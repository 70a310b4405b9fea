//! Data every authenticated page needs for its layout.

use crate::error::PageError;
use crate::models::user::AuthUser;
use crate::AppState;
use payto_core::models::Company;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Companies,
    Dashboard,
    Invoices,
    Vouchers,
    Approvals,
    Payments,
    Clients,
    Suppliers,
    Members,
    Network,
    Afip,
    Audit,
    Tasks,
}

impl Section {
    const COMPANY_NAV: [(Section, &'static str, &'static str); 12] = [
        (Section::Dashboard, "dashboard", "Inicio"),
        (Section::Invoices, "invoices", "Facturas"),
        (Section::Vouchers, "vouchers/new", "Emitir comprobante"),
        (Section::Approvals, "approvals", "Aprobaciones"),
        (Section::Payments, "payments", "Pagos"),
        (Section::Clients, "clients", "Clientes"),
        (Section::Suppliers, "suppliers", "Proveedores"),
        (Section::Members, "members", "Miembros"),
        (Section::Network, "network", "Red"),
        (Section::Afip, "afip", "AFIP"),
        (Section::Audit, "audit", "Auditoría"),
        (Section::Tasks, "tasks", "Tareas"),
    ];
}

#[derive(Debug, Clone)]
pub struct Link {
    pub href: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct PageContext {
    pub user_name: String,
    pub user_initials: String,
    pub user_email: String,
    /// Sidebar company switcher.
    pub companies: Vec<Link>,
    /// Sections of the selected company; empty when none is selected.
    pub nav: Vec<Link>,
    pub company: Option<Company>,
    pub company_id: String,
    pub company_name: String,
}

impl PageContext {
    /// Resolve the sidebar for `user`, optionally selecting `company_id`.
    /// A company the user does not belong to is reported as not found.
    pub async fn load(
        state: &AppState,
        user: &AuthUser,
        company_id: Option<Uuid>,
        section: Section,
    ) -> Result<Self, PageError> {
        let session = user.api(&state.api);
        let companies = state.sidebar.companies(&user.user_id, &session).await?;

        let company = match company_id {
            Some(id) => Some(
                companies
                    .iter()
                    .find(|company| company.id == id)
                    .cloned()
                    .ok_or_else(|| PageError::not_found("Empresa no encontrada"))?,
            ),
            None => None,
        };

        Ok(Self::build(user, &companies, company, section))
    }

    fn build(user: &AuthUser, companies: &[Company], company: Option<Company>, section: Section) -> Self {
        let selected = company.as_ref().map(|company| company.id);

        let links = companies
            .iter()
            .map(|candidate| Link {
                href: format!("/companies/{}/dashboard", candidate.id),
                label: candidate.name.clone(),
                active: Some(candidate.id) == selected,
            })
            .collect();

        let nav = match selected {
            Some(id) => Section::COMPANY_NAV
                .iter()
                .map(|(entry, path, label)| Link {
                    href: format!("/companies/{id}/{path}"),
                    label: (*label).to_string(),
                    active: *entry == section,
                })
                .collect(),
            None => Vec::new(),
        };

        Self {
            user_name: user.display_name().to_string(),
            user_initials: user.initials(),
            user_email: user.email.clone(),
            companies: links,
            nav,
            company_id: selected.map(|id| id.to_string()).unwrap_or_default(),
            company_name: company.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            company,
        }
    }

    /// The selected company. Only call on pages loaded with a company id.
    pub fn company(&self) -> Result<&Company, PageError> {
        self.company
            .as_ref()
            .ok_or_else(|| PageError::not_found("Empresa no encontrada"))
    }
}
