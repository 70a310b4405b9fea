//! AFIP voucher type selection for the emit-voucher page.

use crate::line_item::LineItem;
use crate::tax::TaxRate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// IVA registration of a taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCondition {
    ResponsableInscripto,
    Monotributo,
    Exento,
    ConsumidorFinal,
    #[serde(other)]
    NoCategorizado,
}

impl TaxCondition {
    pub const ALL: [TaxCondition; 5] = [
        TaxCondition::ResponsableInscripto,
        TaxCondition::Monotributo,
        TaxCondition::Exento,
        TaxCondition::ConsumidorFinal,
        TaxCondition::NoCategorizado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxCondition::ResponsableInscripto => "responsable_inscripto",
            TaxCondition::Monotributo => "monotributo",
            TaxCondition::Exento => "exento",
            TaxCondition::ConsumidorFinal => "consumidor_final",
            TaxCondition::NoCategorizado => "no_categorizado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxCondition::ResponsableInscripto => "Responsable Inscripto",
            TaxCondition::Monotributo => "Monotributo",
            TaxCondition::Exento => "Exento",
            TaxCondition::ConsumidorFinal => "Consumidor Final",
            TaxCondition::NoCategorizado => "No categorizado",
        }
    }
}

impl Default for TaxCondition {
    fn default() -> Self {
        TaxCondition::ResponsableInscripto
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("condición impositiva desconocida: {0}")]
pub struct UnknownTaxCondition(pub String);

impl FromStr for TaxCondition {
    type Err = UnknownTaxCondition;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        TaxCondition::ALL
            .into_iter()
            .find(|condition| condition.as_str() == raw)
            .ok_or_else(|| UnknownTaxCondition(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherLetter {
    A,
    B,
    C,
}

/// Issuer whose IVA registration does not allow emitting vouchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Una empresa con condición {} no puede emitir comprobantes", .0.label())]
pub struct IssuerCannotEmit(pub TaxCondition);

impl VoucherLetter {
    /// Letter for a voucher issued by `issuer` to `receiver`. Only
    /// registered taxpayers emit; final consumers and uncategorized
    /// issuers have no letter.
    pub fn select(issuer: TaxCondition, receiver: TaxCondition) -> Result<Self, IssuerCannotEmit> {
        match (issuer, receiver) {
            (TaxCondition::ResponsableInscripto, TaxCondition::ResponsableInscripto) => {
                Ok(VoucherLetter::A)
            }
            (TaxCondition::ResponsableInscripto, _) => Ok(VoucherLetter::B),
            (TaxCondition::Monotributo | TaxCondition::Exento, _) => Ok(VoucherLetter::C),
            (TaxCondition::ConsumidorFinal | TaxCondition::NoCategorizado, _) => {
                Err(IssuerCannotEmit(issuer))
            }
        }
    }

    /// Whether IVA is itemized on the voucher.
    pub fn discriminates_iva(&self) -> bool {
        !matches!(self, VoucherLetter::C)
    }
}

impl fmt::Display for VoucherLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            VoucherLetter::A => "A",
            VoucherLetter::B => "B",
            VoucherLetter::C => "C",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    Invoice,
    DebitNote,
    CreditNote,
}

impl VoucherKind {
    pub const ALL: [VoucherKind; 3] = [VoucherKind::Invoice, VoucherKind::DebitNote, VoucherKind::CreditNote];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherKind::Invoice => "invoice",
            VoucherKind::DebitNote => "debit_note",
            VoucherKind::CreditNote => "credit_note",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VoucherKind::Invoice => "Factura",
            VoucherKind::DebitNote => "Nota de débito",
            VoucherKind::CreditNote => "Nota de crédito",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tipo de comprobante desconocido: {0}")]
pub struct UnknownVoucherKind(pub String);

impl FromStr for VoucherKind {
    type Err = UnknownVoucherKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        VoucherKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| UnknownVoucherKind(raw.to_string()))
    }
}

/// Letter and kind together, e.g. "Factura A".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherType {
    pub letter: VoucherLetter,
    pub kind: VoucherKind,
}

impl VoucherType {
    pub fn new(letter: VoucherLetter, kind: VoucherKind) -> Self {
        Self { letter, kind }
    }

    pub fn for_parties(
        kind: VoucherKind,
        issuer: TaxCondition,
        receiver: TaxCondition,
    ) -> Result<Self, IssuerCannotEmit> {
        Ok(Self::new(VoucherLetter::select(issuer, receiver)?, kind))
    }

    /// AFIP "tipo de comprobante" code.
    pub fn afip_code(&self) -> u16 {
        let base = match self.letter {
            VoucherLetter::A => 1,
            VoucherLetter::B => 6,
            VoucherLetter::C => 11,
        };
        let offset = match self.kind {
            VoucherKind::Invoice => 0,
            VoucherKind::DebitNote => 1,
            VoucherKind::CreditNote => 2,
        };
        base + offset
    }

    /// Items as they must be submitted for this voucher type. `C` vouchers
    /// carry no itemized IVA, so every rate becomes "no gravado".
    pub fn prepare_items(&self, items: &[LineItem]) -> Vec<LineItem> {
        if self.letter.discriminates_iva() {
            return items.to_vec();
        }
        items
            .iter()
            .cloned()
            .map(|item| item.with_tax_rate(TaxRate::NotTaxed))
            .collect()
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.label(), self.letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use TaxCondition::*;

    #[test]
    fn letter_follows_both_conditions() {
        assert_eq!(VoucherLetter::select(ResponsableInscripto, ResponsableInscripto), Ok(VoucherLetter::A));
        assert_eq!(VoucherLetter::select(ResponsableInscripto, ConsumidorFinal), Ok(VoucherLetter::B));
        assert_eq!(VoucherLetter::select(ResponsableInscripto, Monotributo), Ok(VoucherLetter::B));
        assert_eq!(VoucherLetter::select(Monotributo, ResponsableInscripto), Ok(VoucherLetter::C));
        assert_eq!(VoucherLetter::select(Exento, ConsumidorFinal), Ok(VoucherLetter::C));
    }

    #[test]
    fn unregistered_issuers_cannot_emit() {
        for issuer in [ConsumidorFinal, NoCategorizado] {
            for receiver in TaxCondition::ALL {
                assert_eq!(VoucherLetter::select(issuer, receiver), Err(IssuerCannotEmit(issuer)));
            }
        }
        let err = VoucherType::for_parties(VoucherKind::Invoice, ConsumidorFinal, ResponsableInscripto).unwrap_err();
        assert_eq!(err.to_string(), "Una empresa con condición Consumidor Final no puede emitir comprobantes");
    }

    #[test]
    fn afip_codes() {
        let cases = [
            (VoucherLetter::A, VoucherKind::Invoice, 1),
            (VoucherLetter::A, VoucherKind::CreditNote, 3),
            (VoucherLetter::B, VoucherKind::Invoice, 6),
            (VoucherLetter::B, VoucherKind::DebitNote, 7),
            (VoucherLetter::C, VoucherKind::Invoice, 11),
            (VoucherLetter::C, VoucherKind::CreditNote, 13),
        ];
        for (letter, kind, code) in cases {
            assert_eq!(VoucherType::new(letter, kind).afip_code(), code);
        }
    }

    #[test]
    fn c_vouchers_submit_items_as_not_taxed() {
        let items = vec![LineItem::new("Clase", dec!(1), dec!(100))];
        let c = VoucherType::for_parties(VoucherKind::Invoice, Monotributo, ConsumidorFinal).unwrap();
        assert_eq!(c.prepare_items(&items)[0].tax_rate, Some(TaxRate::NotTaxed));

        let a = VoucherType::for_parties(VoucherKind::Invoice, ResponsableInscripto, ResponsableInscripto).unwrap();
        assert_eq!(a.prepare_items(&items), items);
        assert_eq!(a.to_string(), "Factura A");
    }

    #[test]
    fn tax_condition_parses_wire_names() {
        assert_eq!("monotributo".parse::<TaxCondition>(), Ok(Monotributo));
        assert!("otro".parse::<TaxCondition>().is_err());
        let unknown: TaxCondition = serde_json::from_str(r#""sujeto_no_alcanzado""#).unwrap();
        assert_eq!(unknown, NoCategorizado);
    }
}
