use askama::Template;
use payto_core::{format_currency, format_percent, Totals};

pub struct Line {
    pub label: String,
    pub base: String,
    pub amount: String,
}

/// Totals formatted for display.
pub struct TotalsView {
    pub subtotal: String,
    pub total_taxes: String,
    pub total_perceptions: String,
    pub total: String,
    pub taxes: Vec<Line>,
    pub perceptions: Vec<Line>,
    pub exempt: Option<String>,
    pub not_taxed: Option<String>,
    /// IVA lines are hidden on `C` vouchers.
    pub itemize_iva: bool,
}

impl TotalsView {
    pub fn new(totals: &Totals, itemize_iva: bool) -> Self {
        let nonzero = |amount: rust_decimal::Decimal| (!amount.is_zero()).then(|| format_currency(amount));

        Self {
            subtotal: format_currency(totals.subtotal),
            total_taxes: format_currency(totals.total_taxes),
            total_perceptions: format_currency(totals.total_perceptions),
            total: format_currency(totals.total),
            taxes: totals
                .tax_breakdown
                .iter()
                .map(|bucket| Line {
                    label: format!("IVA {}", format_percent(bucket.rate)),
                    base: format_currency(bucket.taxable_base),
                    amount: format_currency(bucket.tax_amount),
                })
                .collect(),
            perceptions: totals
                .perceptions
                .iter()
                .map(|perception| Line {
                    label: if perception.name.trim().is_empty() {
                        perception.kind.label().to_string()
                    } else {
                        perception.name.clone()
                    },
                    base: format_percent(perception.rate),
                    amount: format_currency(perception.amount),
                })
                .collect(),
            exempt: nonzero(totals.exempt_amount),
            not_taxed: nonzero(totals.not_taxed_amount),
            itemize_iva,
        }
    }
}

#[derive(Template)]
#[template(path = "fragments/totals.html")]
pub struct TotalsFragment {
    pub totals: TotalsView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use payto_core::{LineItem, Perception, PerceptionKind, TotalsCalculator};
    use rust_decimal_macros::dec;

    #[test]
    fn formats_worked_example() {
        let totals = TotalsCalculator::default().compute(
            &[LineItem::new("Servicio", dec!(2), dec!(100))],
            &[Perception::new(PerceptionKind::Iibb, "", dec!(3))],
        )
        .unwrap();
        let view = TotalsView::new(&totals, true);

        assert_eq!(view.subtotal, "$200.00");
        assert_eq!(view.total_taxes, "$42.00");
        assert_eq!(view.total, "$249.26");
        assert_eq!(view.taxes[0].label, "IVA 21%");
        assert_eq!(view.perceptions[0].label, "Percepción IIBB");
        assert!(view.exempt.is_none());
    }

    #[test]
    fn fragment_renders_total() {
        let totals = TotalsCalculator::default()
            .compute(&[LineItem::new("A", dec!(2), dec!(100))], &[])
            .unwrap();
        let html = TotalsFragment {
            totals: TotalsView::new(&totals, true),
        }
        .render()
        .unwrap();
        assert!(html.contains("$242.00"));
    }
}
