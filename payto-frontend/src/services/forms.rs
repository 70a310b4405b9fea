//! Registry of the entity creation forms.
//!
//! A form that wants to offer "create the other kind" asks the registry for
//! alternatives instead of referring to the other form directly.

use async_trait::async_trait;
use payto_client::{ApiError, Session};
use payto_core::models::{Counterparty, CounterpartyForm, CounterpartyKind};
use payto_core::TaxCondition;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait EntityForm: Send + Sync {
    fn kind(&self) -> CounterpartyKind;

    /// Heading of the creation page.
    fn title(&self) -> &'static str;

    /// Text of the link that opens this form from another one.
    fn create_label(&self) -> &'static str;

    /// Values the blank form starts with.
    fn blank(&self) -> CounterpartyForm;

    /// Listing page of the entity.
    fn path(&self, company_id: Uuid) -> String {
        format!("/companies/{company_id}/{}", self.kind().path())
    }

    fn new_path(&self, company_id: Uuid) -> String {
        format!("{}/new", self.path(company_id))
    }

    async fn create(&self, session: &Session, company_id: Uuid, form: &CounterpartyForm) -> Result<Counterparty, ApiError> {
        session.counterparties(company_id, self.kind()).create(form).await
    }

    async fn update(
        &self,
        session: &Session,
        company_id: Uuid,
        id: Uuid,
        form: &CounterpartyForm,
    ) -> Result<Counterparty, ApiError> {
        session.counterparties(company_id, self.kind()).update(id, form).await
    }
}

pub struct ClientForm;

#[async_trait]
impl EntityForm for ClientForm {
    fn kind(&self) -> CounterpartyKind {
        CounterpartyKind::Client
    }

    fn title(&self) -> &'static str {
        "Nuevo cliente"
    }

    fn create_label(&self) -> &'static str {
        "Crear cliente"
    }

    fn blank(&self) -> CounterpartyForm {
        CounterpartyForm {
            tax_condition: TaxCondition::ConsumidorFinal,
            ..CounterpartyForm::default()
        }
    }
}

pub struct SupplierForm;

#[async_trait]
impl EntityForm for SupplierForm {
    fn kind(&self) -> CounterpartyKind {
        CounterpartyKind::Supplier
    }

    fn title(&self) -> &'static str {
        "Nuevo proveedor"
    }

    fn create_label(&self) -> &'static str {
        "Crear proveedor"
    }

    fn blank(&self) -> CounterpartyForm {
        CounterpartyForm::default()
    }
}

#[derive(Default)]
pub struct FormRegistry {
    forms: HashMap<CounterpartyKind, Arc<dyn EntityForm>>,
}

impl FormRegistry {
    pub fn with_counterparty_forms() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(ClientForm));
        registry.register(Arc::new(SupplierForm));
        registry
    }

    /// Replaces any form already registered for the same kind.
    pub fn register(&mut self, form: Arc<dyn EntityForm>) {
        self.forms.insert(form.kind(), form);
    }

    pub fn get(&self, kind: CounterpartyKind) -> Option<Arc<dyn EntityForm>> {
        self.forms.get(&kind).cloned()
    }

    /// Every registered form other than `kind`, ordered by title.
    pub fn alternatives(&self, kind: CounterpartyKind) -> Vec<Arc<dyn EntityForm>> {
        let mut others: Vec<_> = self
            .forms
            .iter()
            .filter(|(registered, _)| **registered != kind)
            .map(|(_, form)| form.clone())
            .collect();
        others.sort_by_key(|form| form.title());
        others
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_form_offers_supplier_and_back() {
        let registry = FormRegistry::with_counterparty_forms();

        let from_client = registry.alternatives(CounterpartyKind::Client);
        assert_eq!(from_client.len(), 1);
        assert_eq!(from_client[0].kind(), CounterpartyKind::Supplier);

        let from_supplier = registry.alternatives(CounterpartyKind::Supplier);
        assert_eq!(from_supplier[0].create_label(), "Crear cliente");
    }

    #[test]
    fn paths_follow_kind() {
        let registry = FormRegistry::with_counterparty_forms();
        let id = Uuid::nil();
        let supplier = registry.get(CounterpartyKind::Supplier).unwrap();
        assert_eq!(
            supplier.new_path(id),
            "/companies/00000000-0000-0000-0000-000000000000/suppliers/new"
        );
    }

    #[test]
    fn empty_registry_offers_nothing() {
        let registry = FormRegistry::default();
        assert!(registry.get(CounterpartyKind::Client).is_none());
        assert!(registry.alternatives(CounterpartyKind::Client).is_empty());
    }

    #[test]
    fn blank_forms_differ_by_kind() {
        assert_eq!(ClientForm.blank().tax_condition, TaxCondition::ConsumidorFinal);
        assert_eq!(SupplierForm.blank().tax_condition, TaxCondition::ResponsableInscripto);
    }
}
