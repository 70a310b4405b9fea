//! Reading invoice and voucher drafts from the submitted HTML form.
//!
//! Item and perception rows repeat the same field names; the n-th value of
//! each field belongs to the n-th row. Rows left completely blank are
//! ignored.

use chrono::NaiveDate;
use payto_core::line_item::parse_decimal_input;
use payto_core::models::{InvoiceDirection, InvoiceDraft};
use payto_core::{LineItem, Perception, PerceptionKind, TaxRate, VoucherKind};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

const ITEM_FIELDS: [&str; 4] = ["item_description", "item_quantity", "item_unit_price", "item_tax_rate"];
const PERCEPTION_FIELDS: [&str; 3] = ["perception_type", "perception_name", "perception_rate"];

/// Raw urlencoded fields, in submission order.
#[derive(Debug, Clone, Default)]
pub struct DraftForm {
    fields: Vec<(String, String)>,
}

/// Everything read from the form, including values that could not be
/// parsed. Unparseable numbers count as zero so totals can still be
/// previewed; `problems` keeps them for submit time.
#[derive(Debug, Clone)]
pub struct ParsedDraft {
    pub counterparty_id: Option<Uuid>,
    pub direction: InvoiceDirection,
    pub kind: VoucherKind,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
    pub perceptions: Vec<Perception>,
    pub problems: Vec<String>,
}

impl DraftForm {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn column(&self, key: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.trim())
            .collect()
    }

    /// Rows of `keys`, padded with blanks, skipping rows with no value at all.
    fn rows<const N: usize>(&self, keys: [&str; N]) -> Vec<(usize, [&str; N])> {
        let columns = keys.map(|key| self.column(key));
        let count = columns.iter().map(Vec::len).max().unwrap_or(0);

        (0..count)
            .map(|index| (index, columns.each_ref().map(|column| column.get(index).copied().unwrap_or(""))))
            .filter(|(_, row)| row.iter().any(|value| !value.is_empty()))
            .enumerate()
            .map(|(position, (_, row))| (position + 1, row))
            .collect()
    }

    pub fn parse(&self) -> ParsedDraft {
        let mut problems = Vec::new();

        let counterparty_id = self.value("counterparty_id").and_then(|raw| {
            Uuid::from_str(raw)
                .map_err(|_| problems.push("El cliente o proveedor seleccionado no es válido".to_string()))
                .ok()
        });
        let direction = match self.value("direction") {
            Some("received") => InvoiceDirection::Received,
            _ => InvoiceDirection::Issued,
        };
        let kind = self
            .value("kind")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(VoucherKind::Invoice);
        let issue_date = parse_date(self.value("issue_date"), "Fecha de emisión inválida", &mut problems);
        let due_date = parse_date(self.value("due_date"), "Fecha de vencimiento inválida", &mut problems);

        let items = self
            .rows(ITEM_FIELDS)
            .into_iter()
            .map(|(position, [description, quantity, unit_price, tax_rate])| {
                let mut number = |raw: &str, what: &str| {
                    parse_decimal_input(raw).unwrap_or_else(|_| {
                        problems.push(format!("Ítem {position}: {what} no es un número válido"));
                        None
                    })
                };
                let quantity = number(quantity, "la cantidad").unwrap_or(Decimal::ZERO);
                let unit_price = number(unit_price, "el precio unitario").unwrap_or(Decimal::ZERO);
                let rate = number(tax_rate, "la alícuota");

                let mut item = LineItem::new(description, quantity, unit_price);
                if let Some(rate) = rate {
                    match TaxRate::try_from(rate) {
                        Ok(rate) => item = item.with_tax_rate(rate),
                        Err(_) => problems.push(format!("Ítem {position}: alícuota de IVA inválida")),
                    }
                }
                item
            })
            .collect();

        let perceptions = self
            .rows(PERCEPTION_FIELDS)
            .into_iter()
            .map(|(position, [kind, name, rate])| {
                let rate = parse_decimal_input(rate)
                    .unwrap_or_else(|_| {
                        problems.push(format!("Percepción {position}: la alícuota no es un número válido"));
                        None
                    })
                    .unwrap_or(Decimal::ZERO);
                Perception::new(perception_kind(kind), name, rate)
            })
            .collect();

        ParsedDraft {
            counterparty_id,
            direction,
            kind,
            issue_date,
            due_date,
            notes: self.value("notes").map(String::from),
            items,
            perceptions,
            problems,
        }
    }
}

fn parse_date(raw: Option<&str>, message: &str, problems: &mut Vec<String>) -> Option<NaiveDate> {
    raw.and_then(|raw| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| problems.push(message.to_string()))
            .ok()
    })
}

fn perception_kind(raw: &str) -> PerceptionKind {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).unwrap_or(PerceptionKind::Other)
}

impl ParsedDraft {
    /// Every reason this draft cannot be submitted, in form order.
    pub fn submit_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.counterparty_id.is_none() {
            problems.push("Seleccioná un cliente o proveedor".to_string());
        }
        problems.extend(self.problems.iter().cloned());
        if let Err(errors) = payto_core::validate_draft(&self.items, &self.perceptions) {
            problems.extend(errors.messages());
        }
        problems
    }

    /// The creation request, or the messages that block it.
    pub fn into_draft(self) -> Result<InvoiceDraft, Vec<String>> {
        let problems = self.submit_problems();
        match self.counterparty_id {
            Some(counterparty_id) if problems.is_empty() => Ok(InvoiceDraft {
                counterparty_id,
                direction: self.direction,
                kind: self.kind,
                letter: None,
                voucher_code: None,
                point_of_sale: None,
                issue_date: self.issue_date,
                due_date: self.due_date,
                items: self.items,
                perceptions: self.perceptions,
                notes: self.notes,
            }),
            _ => Err(problems),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form(fields: &[(&str, &str)]) -> DraftForm {
        DraftForm::new(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    const COUNTERPARTY: &str = "0b7e7a36-7d53-4bb4-8f6c-4d0f1e1f2a3b";

    #[test]
    fn zips_repeated_fields_into_rows() {
        let parsed = form(&[
            ("counterparty_id", COUNTERPARTY),
            ("item_description", "Servicio"),
            ("item_quantity", "2"),
            ("item_unit_price", "100"),
            ("item_tax_rate", ""),
            ("item_description", "Libros"),
            ("item_quantity", "1"),
            ("item_unit_price", "50,5"),
            ("item_tax_rate", "-1"),
        ])
        .parse();

        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].tax_rate, None);
        assert_eq!(parsed.items[1].unit_price, dec!(50.5));
        assert_eq!(parsed.items[1].tax_rate, Some(TaxRate::Exempt));
        assert!(parsed.problems.is_empty());
    }

    #[test]
    fn blank_rows_are_skipped() {
        let parsed = form(&[
            ("item_description", ""),
            ("item_quantity", ""),
            ("item_unit_price", ""),
            ("item_tax_rate", ""),
        ])
        .parse();
        assert!(parsed.items.is_empty());
        assert!(parsed
            .submit_problems()
            .contains(&"Agregá al menos un ítem".to_string()));
    }

    #[test]
    fn bad_numbers_preview_as_zero_but_block_submit() {
        let parsed = form(&[
            ("counterparty_id", COUNTERPARTY),
            ("item_description", "Servicio"),
            ("item_quantity", "dos"),
            ("item_unit_price", "100"),
        ])
        .parse();

        assert_eq!(parsed.items[0].quantity, Decimal::ZERO);
        let problems = parsed.into_draft().unwrap_err();
        assert_eq!(problems[0], "Ítem 1: la cantidad no es un número válido");
        assert!(problems.contains(&"Ítem 1: la cantidad debe ser mayor a cero".to_string()));
    }

    #[test]
    fn invalid_rate_sentinel_is_reported() {
        let parsed = form(&[
            ("item_description", "Servicio"),
            ("item_quantity", "1"),
            ("item_unit_price", "1"),
            ("item_tax_rate", "-5"),
        ])
        .parse();
        assert_eq!(parsed.problems, vec!["Ítem 1: alícuota de IVA inválida".to_string()]);
    }

    #[test]
    fn complete_form_becomes_draft() {
        let draft = form(&[
            ("counterparty_id", COUNTERPARTY),
            ("direction", "received"),
            ("issue_date", "2024-05-02"),
            ("item_description", "Servicio"),
            ("item_quantity", "2"),
            ("item_unit_price", "100"),
            ("perception_type", "iibb"),
            ("perception_name", "IIBB CABA"),
            ("perception_rate", "3"),
        ])
        .parse()
        .into_draft()
        .unwrap();

        assert_eq!(draft.direction, InvoiceDirection::Received);
        assert_eq!(draft.issue_date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(draft.perceptions[0].kind, PerceptionKind::Iibb);
        assert_eq!(draft.perceptions[0].rate, dec!(3));
    }

    #[test]
    fn missing_counterparty_blocks_submit() {
        let problems = form(&[
            ("item_description", "Servicio"),
            ("item_quantity", "1"),
            ("item_unit_price", "1"),
        ])
        .parse()
        .into_draft()
        .unwrap_err();
        assert_eq!(problems, vec!["Seleccioná un cliente o proveedor".to_string()]);
    }
}
