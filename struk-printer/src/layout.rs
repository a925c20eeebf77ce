//! Column layout helpers
//!
//! Receipt lines are plain two-column rows: label on the left, a formatted
//! amount on the right, spaces in between. Text is never wrapped. When the
//! label and amount do not fit, a single space separates them and the row
//! runs past the paper width.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::encoding::cp437_width;
use crate::error::PrintResult;
use crate::receipt::SaleItem;

/// Currency prefix printed before every amount
pub const CURRENCY_PREFIX: &str = "Rp ";

/// Format an amount as Indonesian Rupiah
///
/// Whole units only, '.' as the thousands separator:
/// `1000000` -> `"Rp 1.000.000"`.
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{CURRENCY_PREFIX}{sign}{grouped}")
}

/// Spaces between label and amount, never less than one
pub fn padding(label: &str, amount: &str, width: usize) -> usize {
    width
        .saturating_sub(cp437_width(label))
        .saturating_sub(cp437_width(amount))
        .max(1)
}

/// Build a label/amount row for the given width
pub fn two_column(label: &str, amount: &str, width: usize) -> String {
    let spaces = padding(label, amount, width);
    format!("{label}{}{amount}", " ".repeat(spaces))
}

/// Label for a sale item row: `"<name> (x<qty>)"`
pub fn item_label(item: &SaleItem) -> String {
    format!("{} (x{})", item.name, item.qty)
}

/// Full row for a sale item, amount = qty x unit price
pub fn item_line(item: &SaleItem, width: usize) -> PrintResult<String> {
    Ok(two_column(&item_label(item), &format_rupiah(item.amount()?), width))
}
