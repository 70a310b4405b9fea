//! IVA rates as carried by line items.
//!
//! On the wire a rate is a plain number. Two negative values are reserved:
//! `-1` marks an exempt item and `-2` an item outside the scope of IVA. Both
//! contribute no tax; they are never fed into the percentage formula.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const EXEMPT_SENTINEL: i64 = -1;
const NOT_TAXED_SENTINEL: i64 = -2;

/// Default IVA rate applied when a line item does not specify one.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(21, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxRate {
    /// A regular percentage, e.g. `21` for 21%.
    Percent(Decimal),
    /// Exento.
    Exempt,
    /// No gravado.
    NotTaxed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid tax rate {0}: only -1 (exempt) and -2 (not taxed) may be negative")]
pub struct InvalidTaxRate(pub Decimal);

impl TaxRate {
    pub fn percent(rate: Decimal) -> Result<Self, InvalidTaxRate> {
        Self::try_from(rate)
    }

    /// Tax owed on a net amount, `None` when it does not fit in a
    /// `Decimal`. Sentinel rates always yield zero.
    pub fn tax_on(&self, net: Decimal) -> Option<Decimal> {
        match self {
            TaxRate::Percent(rate) => net.checked_mul(*rate)?.checked_div(Decimal::ONE_HUNDRED),
            TaxRate::Exempt | TaxRate::NotTaxed => Some(Decimal::ZERO),
        }
    }

    /// Wire representation, sentinels included.
    pub fn as_decimal(&self) -> Decimal {
        match self {
            TaxRate::Percent(rate) => *rate,
            TaxRate::Exempt => Decimal::from(EXEMPT_SENTINEL),
            TaxRate::NotTaxed => Decimal::from(NOT_TAXED_SENTINEL),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, TaxRate::Percent(_))
    }

    /// AFIP "alícuota" identifier used in the IVA book, when one exists.
    pub fn afip_code(&self) -> Option<u8> {
        let TaxRate::Percent(rate) = self else {
            return None;
        };
        match rate.normalize().to_string().as_str() {
            "0" => Some(3),
            "10.5" => Some(4),
            "21" => Some(5),
            "27" => Some(6),
            "5" => Some(8),
            "2.5" => Some(9),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            TaxRate::Percent(rate) => crate::money::format_percent(*rate),
            TaxRate::Exempt => "Exento".to_string(),
            TaxRate::NotTaxed => "No gravado".to_string(),
        }
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::Percent(DEFAULT_TAX_RATE)
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = InvalidTaxRate;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if !value.is_sign_negative() || value.is_zero() {
            return Ok(TaxRate::Percent(value));
        }
        if value == Decimal::from(EXEMPT_SENTINEL) {
            Ok(TaxRate::Exempt)
        } else if value == Decimal::from(NOT_TAXED_SENTINEL) {
            Ok(TaxRate::NotTaxed)
        } else {
            Err(InvalidTaxRate(value))
        }
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for TaxRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TaxRate::Percent(rate) => match rate.to_f64() {
                Some(value) => serializer.serialize_f64(value),
                None => serializer.serialize_str(&rate.to_string()),
            },
            TaxRate::Exempt => serializer.serialize_i64(EXEMPT_SENTINEL),
            TaxRate::NotTaxed => serializer.serialize_i64(NOT_TAXED_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for TaxRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <Decimal as Deserialize>::deserialize(deserializer)?;
        TaxRate::try_from(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sentinels_are_decoded() {
        assert_eq!(TaxRate::try_from(dec!(-1)), Ok(TaxRate::Exempt));
        assert_eq!(TaxRate::try_from(dec!(-2)), Ok(TaxRate::NotTaxed));
        assert_eq!(TaxRate::try_from(dec!(10.5)), Ok(TaxRate::Percent(dec!(10.5))));
        assert_eq!(TaxRate::try_from(dec!(0)), Ok(TaxRate::Percent(dec!(0))));
    }

    #[test]
    fn other_negative_rates_are_rejected() {
        assert_eq!(TaxRate::try_from(dec!(-3)), Err(InvalidTaxRate(dec!(-3))));
        assert!(TaxRate::try_from(dec!(-0.5)).is_err());
    }

    #[test]
    fn sentinels_never_produce_tax() {
        assert_eq!(TaxRate::Exempt.tax_on(dec!(1000)), Some(Decimal::ZERO));
        assert_eq!(TaxRate::NotTaxed.tax_on(dec!(1000)), Some(Decimal::ZERO));
        assert_eq!(TaxRate::Percent(dec!(21)).tax_on(dec!(200)), Some(dec!(42)));
    }

    #[test]
    fn tax_beyond_decimal_range_is_none() {
        assert_eq!(TaxRate::Percent(dec!(21)).tax_on(Decimal::MAX), None);
        assert_eq!(TaxRate::Exempt.tax_on(Decimal::MAX), Some(Decimal::ZERO));
    }

    #[test]
    fn default_rate_is_twenty_one_percent() {
        assert_eq!(TaxRate::default(), TaxRate::Percent(dec!(21)));
    }

    #[test]
    fn serde_uses_plain_numbers() {
        let exempt: TaxRate = serde_json::from_str("-1").unwrap();
        assert_eq!(exempt, TaxRate::Exempt);
        let reduced: TaxRate = serde_json::from_str("10.5").unwrap();
        assert_eq!(reduced, TaxRate::Percent(dec!(10.5)));
        let from_string: TaxRate = serde_json::from_str("\"27\"").unwrap();
        assert_eq!(from_string, TaxRate::Percent(dec!(27)));

        assert_eq!(serde_json::to_string(&TaxRate::NotTaxed).unwrap(), "-2");
        assert_eq!(serde_json::to_string(&TaxRate::Percent(dec!(21))).unwrap(), "21.0");
        assert!(serde_json::from_str::<TaxRate>("-7").is_err());
    }

    #[test]
    fn afip_codes_follow_alicuota_table() {
        assert_eq!(TaxRate::Percent(dec!(21.00)).afip_code(), Some(5));
        assert_eq!(TaxRate::Percent(dec!(10.5)).afip_code(), Some(4));
        assert_eq!(TaxRate::Percent(dec!(0)).afip_code(), Some(3));
        assert_eq!(TaxRate::Percent(dec!(13)).afip_code(), None);
        assert_eq!(TaxRate::Exempt.afip_code(), None);
    }

    #[test]
    fn labels() {
        assert_eq!(TaxRate::Exempt.label(), "Exento");
        assert_eq!(TaxRate::Percent(dec!(10.50)).to_string(), "10.5%");
    }
}
