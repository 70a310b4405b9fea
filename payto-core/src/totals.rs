//! Invoice totals.
//!
//! Pure and synchronous: the same inputs always yield the same record, and
//! it is recomputed from scratch whenever items or perceptions change.
//!
//! Invariants:
//! - `subtotal == Σ quantity * unit_price`
//! - `total_taxes == Σ quantity * unit_price * rate / 100` (sentinel rates add 0)
//! - each perception is `rate% * (subtotal + total_taxes)`
//! - `total == subtotal + total_taxes + total_perceptions`

use crate::line_item::LineItem;
use crate::perception::{Perception, PerceptionKind};
use crate::tax::TaxRate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// The amounts typed do not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Los importes son demasiado grandes para calcular los totales")]
pub struct TotalsError;

fn sum(a: Decimal, b: Decimal) -> Result<Decimal, TotalsError> {
    a.checked_add(b).ok_or(TotalsError)
}

/// IVA totals for one percentage rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxBucket {
    pub rate: Decimal,
    pub taxable_base: Decimal,
    pub tax_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerceptionAmount {
    pub kind: PerceptionKind,
    pub name: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub total_taxes: Decimal,
    pub total_perceptions: Decimal,
    pub total: Decimal,
    /// Percentage buckets ordered by rate.
    pub tax_breakdown: Vec<TaxBucket>,
    /// Net amount of exempt items.
    pub exempt_amount: Decimal,
    /// Net amount of items outside the scope of IVA.
    pub not_taxed_amount: Decimal,
    /// One entry per perception, in input order.
    pub perceptions: Vec<PerceptionAmount>,
}

impl Totals {
    pub fn empty() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            total_taxes: Decimal::ZERO,
            total_perceptions: Decimal::ZERO,
            total: Decimal::ZERO,
            tax_breakdown: Vec::new(),
            exempt_amount: Decimal::ZERO,
            not_taxed_amount: Decimal::ZERO,
            perceptions: Vec::new(),
        }
    }
}

/// Computes [`Totals`] with a jurisdiction default rate for items that
/// carry none.
#[derive(Debug, Clone, Copy)]
pub struct TotalsCalculator {
    default_rate: TaxRate,
}

impl Default for TotalsCalculator {
    fn default() -> Self {
        Self::new(TaxRate::default())
    }
}

impl TotalsCalculator {
    pub fn new(default_rate: TaxRate) -> Self {
        Self { default_rate }
    }

    pub fn default_rate(&self) -> TaxRate {
        self.default_rate
    }

    pub fn compute(&self, items: &[LineItem], perceptions: &[Perception]) -> Result<Totals, TotalsError> {
        let mut subtotal = Decimal::ZERO;
        let mut total_taxes = Decimal::ZERO;
        let mut exempt_amount = Decimal::ZERO;
        let mut not_taxed_amount = Decimal::ZERO;
        let mut buckets: BTreeMap<Decimal, (Decimal, Decimal)> = BTreeMap::new();

        for item in items {
            let net = item.net_amount().ok_or(TotalsError)?;
            subtotal = sum(subtotal, net)?;

            match item.effective_rate(self.default_rate) {
                TaxRate::Percent(rate) => {
                    let tax = TaxRate::Percent(rate).tax_on(net).ok_or(TotalsError)?;
                    total_taxes = sum(total_taxes, tax)?;
                    let bucket = buckets.entry(rate.normalize()).or_default();
                    bucket.0 = sum(bucket.0, net)?;
                    bucket.1 = sum(bucket.1, tax)?;
                }
                TaxRate::Exempt => exempt_amount = sum(exempt_amount, net)?,
                TaxRate::NotTaxed => not_taxed_amount = sum(not_taxed_amount, net)?,
            }
        }

        let perceptions = perceptions
            .iter()
            .map(|perception| {
                Ok(PerceptionAmount {
                    kind: perception.kind,
                    name: perception.name.clone(),
                    rate: perception.rate,
                    amount: perception.amount_on(subtotal, total_taxes).ok_or(TotalsError)?,
                })
            })
            .collect::<Result<Vec<_>, TotalsError>>()?;
        let total_perceptions = perceptions
            .iter()
            .try_fold(Decimal::ZERO, |acc, perception| sum(acc, perception.amount))?;

        Ok(Totals {
            subtotal,
            total_taxes,
            total_perceptions,
            total: sum(sum(subtotal, total_taxes)?, total_perceptions)?,
            tax_breakdown: buckets
                .into_iter()
                .map(|(rate, (taxable_base, tax_amount))| TaxBucket {
                    rate,
                    taxable_base,
                    tax_amount,
                })
                .collect(),
            exempt_amount,
            not_taxed_amount,
            perceptions,
        })
    }
}
