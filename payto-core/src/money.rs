//! Amount rounding and display.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render an amount as `$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let formatted = format!("{:.2}", rounded.abs());

    let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let grouped = group_thousands(integer);

    if negative {
        format!("-${grouped}.{fraction}")
    } else {
        format!("${grouped}.{fraction}")
    }
}

/// Render a percentage rate without trailing zeros: `21%`, `10.5%`.
pub fn format_percent(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
