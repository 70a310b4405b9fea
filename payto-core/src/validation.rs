//! Submit-time checks for invoice and voucher drafts.
//!
//! These run only when the user submits, never while typing. Any failure
//! blocks the request entirely; nothing is sent to the API.

use crate::line_item::LineItem;
use crate::perception::Perception;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemProblem {
    #[error("falta la descripción")]
    MissingDescription,
    #[error("la cantidad debe ser mayor a cero")]
    NonPositiveQuantity,
    #[error("el precio unitario debe ser mayor a cero")]
    NonPositiveUnitPrice,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Agregá al menos un ítem")]
    NoItems,
    /// `position` is 1-based, as shown on the form.
    #[error("Ítem {position}: {problem}")]
    Item { position: usize, problem: ItemProblem },
    #[error("Percepción {position}: la alícuota no puede ser negativa")]
    NegativePerceptionRate { position: usize },
}

/// Every problem found in a draft, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct DraftErrors(Vec<DraftError>);

impl DraftErrors {
    pub fn errors(&self) -> &[DraftError] {
        &self.0
    }

    /// Localized messages ready to display.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for DraftErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

fn item_problems(item: &LineItem) -> impl Iterator<Item = ItemProblem> {
    let checks = [
        (item.description.trim().is_empty(), ItemProblem::MissingDescription),
        (item.quantity <= Decimal::ZERO, ItemProblem::NonPositiveQuantity),
        (item.unit_price <= Decimal::ZERO, ItemProblem::NonPositiveUnitPrice),
    ];
    checks
        .into_iter()
        .filter_map(|(failed, problem)| failed.then_some(problem))
}

/// Check every item: non-blank description, quantity > 0, unit price > 0.
pub fn validate_items(items: &[LineItem]) -> Result<(), DraftErrors> {
    validate_draft(items, &[])
}

/// Check items and perceptions together, collecting all problems.
pub fn validate_draft(items: &[LineItem], perceptions: &[Perception]) -> Result<(), DraftErrors> {
    let mut errors = Vec::new();

    if items.is_empty() {
        errors.push(DraftError::NoItems);
    }

    for (index, item) in items.iter().enumerate() {
        errors.extend(item_problems(item).map(|problem| DraftError::Item {
            position: index + 1,
            problem,
        }));
    }

    for (index, perception) in perceptions.iter().enumerate() {
        if perception.rate.is_sign_negative() && !perception.rate.is_zero() {
            errors.push(DraftError::NegativePerceptionRate {
                position: index + 1,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DraftErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::PerceptionKind;
    use rust_decimal_macros::dec;

    #[test]
    fn accepts_complete_items() {
        let items = vec![LineItem::new("Consultoría", dec!(1), dec!(1500))];
        assert!(validate_items(&items).is_ok());
    }

    #[test]
    fn rejects_empty_draft() {
        let errors = validate_items(&[]).unwrap_err();
        assert_eq!(errors.errors(), &[DraftError::NoItems]);
    }

    #[test]
    fn reports_every_problem_with_position() {
        let items = vec![
            LineItem::new("Ok", dec!(1), dec!(1)),
            LineItem::new("   ", dec!(0), dec!(10)),
            LineItem::new("Precio cero", dec!(1), dec!(0)),
        ];
        let errors = validate_items(&items).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[
                DraftError::Item {
                    position: 2,
                    problem: ItemProblem::MissingDescription
                },
                DraftError::Item {
                    position: 2,
                    problem: ItemProblem::NonPositiveQuantity
                },
                DraftError::Item {
                    position: 3,
                    problem: ItemProblem::NonPositiveUnitPrice
                },
            ]
        );
        assert_eq!(errors.messages()[0], "Ítem 2: falta la descripción");
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let items = vec![LineItem::new("Devolución", dec!(-1), dec!(10))];
        assert!(validate_items(&items).is_err());
    }

    #[test]
    fn negative_perception_rate_is_rejected() {
        let items = vec![LineItem::new("Ok", dec!(1), dec!(1))];
        let perceptions = vec![Perception::new(PerceptionKind::Iibb, "IIBB", dec!(-3))];
        let errors = validate_draft(&items, &perceptions).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[DraftError::NegativePerceptionRate { position: 1 }]
        );
    }
}
