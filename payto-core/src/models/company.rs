//! Companies the signed-in user belongs to.

use crate::cuit::display_cuit;
use crate::filter::Searchable;
use crate::models::member::MemberRole;
use crate::voucher::TaxCondition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub cuit: String,
    pub tax_condition: TaxCondition,
    /// Role of the current user in this company.
    #[serde(default)]
    pub role: Option<MemberRole>,
    #[serde(default)]
    pub point_of_sale: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Company {
    pub fn display_cuit(&self) -> String {
        display_cuit(&self.cuit)
    }
}

impl Searchable for Company {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.cuit]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanyForm {
    #[validate(length(min = 1, message = "Ingresá la razón social"))]
    pub name: String,
    #[validate(custom(function = "crate::models::validate_cuit"))]
    pub cuit: String,
    pub tax_condition: TaxCondition,
    #[serde(default)]
    #[validate(range(min = 1, max = 99998, message = "Punto de venta inválido"))]
    pub point_of_sale: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_rejects_bad_cuit() {
        let form = CompanyForm {
            name: "Acme SRL".into(),
            cuit: "20123456780".into(),
            tax_condition: TaxCondition::ResponsableInscripto,
            point_of_sale: Some(1),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cuit"));
    }

    #[test]
    fn decodes_api_company() {
        let company: Company = serde_json::from_str(
            r#"{"id":"6f9c1d2e-1111-4c3b-9a1e-2b2f1a0c0d01","name":"Acme","cuit":"30712345671",
                "tax_condition":"responsable_inscripto","role":"owner"}"#,
        )
        .unwrap();
        assert_eq!(company.role, Some(MemberRole::Owner));
        assert_eq!(company.display_cuit(), "30-71234567-1");
    }
}
