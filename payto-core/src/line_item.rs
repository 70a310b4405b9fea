//! Line items as edited on the invoice and voucher forms.

use crate::tax::TaxRate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Line item of an invoice being drafted.
///
/// Values are not checked while the user types; see
/// [`crate::validation::validate_items`] for the submit-time rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::decimal"
    )]
    pub quantity: Decimal,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::decimal"
    )]
    pub unit_price: Decimal,
    /// `None` means "use the configured default rate".
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::tax_rate"
    )]
    pub tax_rate: Option<TaxRate>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            tax_rate: None,
        }
    }

    pub fn with_tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    /// `quantity * unit_price`, before tax. `None` on overflow.
    pub fn net_amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }

    pub fn effective_rate(&self, default_rate: TaxRate) -> TaxRate {
        self.tax_rate.unwrap_or(default_rate)
    }

    pub fn tax_amount(&self, default_rate: TaxRate) -> Option<Decimal> {
        self.effective_rate(default_rate).tax_on(self.net_amount()?)
    }
}

pub use lenient::parse_text as parse_decimal_input;

/// Decoding of numbers typed into HTML inputs.
///
/// Form encoders send every field as text: blanks decode as zero (so the
/// submit-time rules report them) and a decimal comma is accepted.
pub(crate) mod lenient {
    use crate::tax::TaxRate;
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    /// Parse a number typed into a form field. Blank input is `None`.
    pub fn parse_text(text: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
            trimmed.replace(',', ".")
        } else {
            trimmed.to_string()
        };
        Decimal::from_str(&normalized).map(Some)
    }

    fn optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Number(number) => Decimal::from_str(&number.to_string())
                .or_else(|_| Decimal::from_scientific(&number.to_string()))
                .map(Some)
                .map_err(D::Error::custom),
            Value::String(text) => parse_text(&text).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected a number, got {other}"))),
        }
    }

    pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        Ok(optional(deserializer)?.unwrap_or(Decimal::ZERO))
    }

    pub fn tax_rate<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TaxRate>, D::Error> {
        optional(deserializer)?
            .map(TaxRate::try_from)
            .transpose()
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_rate_falls_back_to_default() {
        let item = LineItem::new("Honorarios", dec!(2), dec!(100));
        assert_eq!(item.net_amount(), Some(dec!(200)));
        assert_eq!(item.tax_amount(TaxRate::default()), Some(dec!(42)));
    }

    #[test]
    fn explicit_rate_wins_over_default() {
        let item = LineItem::new("Libros", dec!(1), dec!(500)).with_tax_rate(TaxRate::Exempt);
        assert_eq!(item.tax_amount(TaxRate::default()), Some(Decimal::ZERO));
    }

    #[test]
    fn huge_amounts_do_not_overflow_silently() {
        let item = LineItem::new("x", dec!(100000000000000000000), dec!(100000000000000000000));
        assert_eq!(item.net_amount(), None);
        assert_eq!(item.tax_amount(TaxRate::default()), None);
    }

    #[test]
    fn decodes_form_payload_without_rate() {
        let item: LineItem = serde_json::from_str(
            r#"{"description":"Soporte","quantity":3,"unit_price":"12.5"}"#,
        )
        .unwrap();
        assert_eq!(item.quantity, dec!(3));
        assert_eq!(item.unit_price, dec!(12.5));
        assert!(item.tax_rate.is_none());
    }

    #[test]
    fn decodes_text_inputs_leniently() {
        let item: LineItem = serde_json::from_str(
            r#"{"description":"Flete","quantity":"","unit_price":"1500,75","tax_rate":"-1"}"#,
        )
        .unwrap();
        assert_eq!(item.quantity, Decimal::ZERO);
        assert_eq!(item.unit_price, dec!(1500.75));
        assert_eq!(item.tax_rate, Some(TaxRate::Exempt));
    }

    #[test]
    fn blank_rate_means_default() {
        let item: LineItem = serde_json::from_str(
            r#"{"description":"Flete","quantity":"1","unit_price":"1","tax_rate":""}"#,
        )
        .unwrap();
        assert!(item.tax_rate.is_none());
    }

    #[test]
    fn rejects_unknown_negative_rate() {
        let result = serde_json::from_str::<LineItem>(
            r#"{"description":"x","quantity":1,"unit_price":1,"tax_rate":-5}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn serializes_amounts_as_numbers() {
        let item = LineItem::new("Horas", dec!(2), dec!(100)).with_tax_rate(TaxRate::NotTaxed);
        let value = serde_json::to_value(&item).unwrap();
        assert!(value["quantity"].is_number());
        assert!(value["unit_price"].is_number());
        assert_eq!(value["tax_rate"], serde_json::json!(-2));
    }
}
