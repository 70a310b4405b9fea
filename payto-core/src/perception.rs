//! Perceptions (percepciones) added on top of an invoice.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax a perception is collected on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionKind {
    /// Ingresos Brutos.
    Iibb,
    Iva,
    Ganancias,
    Municipal,
    #[serde(other)]
    Other,
}

impl PerceptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerceptionKind::Iibb => "iibb",
            PerceptionKind::Iva => "iva",
            PerceptionKind::Ganancias => "ganancias",
            PerceptionKind::Municipal => "municipal",
            PerceptionKind::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerceptionKind::Iibb => "Percepción IIBB",
            PerceptionKind::Iva => "Percepción IVA",
            PerceptionKind::Ganancias => "Percepción Ganancias",
            PerceptionKind::Municipal => "Percepción municipal",
            PerceptionKind::Other => "Otra percepción",
        }
    }
}

/// A perception line: `rate` percent of the tax-inclusive base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    #[serde(rename = "type")]
    pub kind: PerceptionKind,
    #[serde(default)]
    pub name: String,
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "crate::line_item::lenient::decimal"
    )]
    pub rate: Decimal,
}

impl Perception {
    pub fn new(kind: PerceptionKind, name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            kind,
            name: name.into(),
            rate,
        }
    }

    /// Amount owed for this perception, `None` on overflow.
    ///
    /// The base is `subtotal + total_taxes`, not the bare subtotal.
    pub fn amount_on(&self, subtotal: Decimal, total_taxes: Decimal) -> Option<Decimal> {
        subtotal
            .checked_add(total_taxes)?
            .checked_mul(self.rate)?
            .checked_div(Decimal::ONE_HUNDRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn applies_to_tax_inclusive_base() {
        let perception = Perception::new(PerceptionKind::Iibb, "IIBB CABA", dec!(3));
        assert_eq!(perception.amount_on(dec!(200), dec!(42)), Some(dec!(7.26)));
        assert_eq!(perception.amount_on(Decimal::MAX, dec!(1)), None);
    }

    #[test]
    fn decodes_type_field() {
        let perception: Perception =
            serde_json::from_str(r#"{"type":"iibb","name":"IIBB PBA","rate":"2.5"}"#).unwrap();
        assert_eq!(perception.kind, PerceptionKind::Iibb);
        assert_eq!(perception.rate, dec!(2.5));

        let unknown: Perception =
            serde_json::from_str(r#"{"type":"sellos","name":"Sellos","rate":1}"#).unwrap();
        assert_eq!(unknown.kind, PerceptionKind::Other);
    }
}
