//! Financial model shared by the totals renderer and any live-preview
//! caller: subtotal → discount → tax → total, plus the currency formatting
//! used everywhere an amount is printed.

use crate::config::CurrencyConfig;
use crate::model::{LineItem, Totals};

/// Compute the multi-step totals from the line items. Pure: same inputs,
/// same figures, no caching.
///
/// The discount applies only when both the flag is set and the percentage
/// is positive; tax is charged on the discounted subtotal.
pub fn compute_totals(
    items: &[LineItem],
    include_discount: bool,
    discount_percentage: f64,
    tax_rate: f64,
) -> Totals {
    let subtotal: f64 = items.iter().map(|item| item.price).sum();
    let discount_amount = if include_discount && discount_percentage > 0.0 {
        subtotal * discount_percentage / 100.0
    } else {
        0.0
    };
    let after_discount = subtotal - discount_amount;
    let tax = after_discount * tax_rate;
    Totals {
        subtotal,
        discount_amount,
        after_discount,
        tax,
        total: after_discount + tax,
    }
}

/// One row of the rendered totals column.
#[derive(Clone, Debug, PartialEq)]
pub struct TotalsRow {
    pub label: String,
    pub value: String,
    pub emphasize: bool,
}

/// Build the totals rows in render order. The discount row and the
/// post-discount subtotal appear only when a discount actually applies,
/// so a zero discount never prints a `- Q0.00` line. The grand total is
/// always last and always emphasized.
pub fn totals_rows(
    totals: &Totals,
    discount_percentage: f64,
    tax_rate: f64,
    currency: &CurrencyConfig,
) -> Vec<TotalsRow> {
    let mut rows = vec![TotalsRow {
        label: "Subtotal:".to_string(),
        value: format_amount(totals.subtotal, currency),
        emphasize: false,
    }];

    if totals.discount_amount > 0.0 {
        rows.push(TotalsRow {
            label: format!("Descuento ({}%):", format_percentage(discount_percentage)),
            value: format!("- {}", format_amount(totals.discount_amount, currency)),
            emphasize: false,
        });
        rows.push(TotalsRow {
            label: "Subtotal con descuento:".to_string(),
            value: format_amount(totals.after_discount, currency),
            emphasize: false,
        });
    }

    rows.push(TotalsRow {
        label: format!("IVA ({}%):", format_percentage(tax_rate * 100.0)),
        value: format_amount(totals.tax, currency),
        emphasize: false,
    });
    rows.push(TotalsRow {
        label: "TOTAL:".to_string(),
        value: format_amount(totals.total, currency),
        emphasize: true,
    });
    rows
}

/// Footnote printed under the totals when a discount applies.
pub fn discount_note(
    totals: &Totals,
    discount_percentage: f64,
    currency: &CurrencyConfig,
) -> Option<String> {
    if totals.discount_amount > 0.0 {
        Some(format!(
            "Descuento aplicado: {}% ({}).",
            format_percentage(discount_percentage),
            format_amount(totals.discount_amount, currency),
        ))
    } else {
        None
    }
}

/// Format an amount with the currency symbol, thousands grouping and a
/// fixed two decimals: `Q1,234.50`.
pub fn format_amount(amount: f64, currency: &CurrencyConfig) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(currency.thousands_sep);
        }
        grouped.push(ch);
    }

    format!(
        "{sign}{}{grouped}{}{frac:02}",
        currency.symbol, currency.decimal_sep
    )
}

/// Percentages print without a trailing `.0` for whole values: `10`, `12.5`.
fn format_percentage(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{pct}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(prices: &[f64]) -> Vec<LineItem> {
        prices
            .iter()
            .map(|&price| LineItem {
                description: "item".to_string(),
                price,
            })
            .collect()
    }

    #[test]
    fn totals_without_discount() {
        let totals = compute_totals(&items(&[100.0, 50.0]), false, 0.0, 0.12);
        assert_eq!(totals.subtotal, 150.0);
        assert_eq!(totals.discount_amount, 0.0);
        assert_eq!(totals.after_discount, 150.0);
        assert!((totals.tax - 18.0).abs() < 1e-9);
        assert!((totals.total - 168.0).abs() < 1e-9);
    }

    #[test]
    fn totals_with_discount() {
        let totals = compute_totals(&items(&[100.0, 50.0]), true, 10.0, 0.12);
        assert_eq!(totals.discount_amount, 15.0);
        assert_eq!(totals.after_discount, 135.0);
        assert!((totals.tax - 16.2).abs() < 1e-9);
        assert!((totals.total - 151.2).abs() < 1e-9);
    }

    #[test]
    fn discount_flag_without_percentage_is_ignored() {
        let totals = compute_totals(&items(&[100.0]), true, 0.0, 0.12);
        assert_eq!(totals.discount_amount, 0.0);
        assert_eq!(totals.after_discount, 100.0);
    }

    #[test]
    fn rows_include_discount_pair_only_when_discount_applies() {
        let currency = CurrencyConfig::gtq();

        let with = compute_totals(&items(&[100.0, 50.0]), true, 10.0, 0.12);
        let rows = totals_rows(&with, 10.0, 0.12, &currency);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Subtotal:",
                "Descuento (10%):",
                "Subtotal con descuento:",
                "IVA (12%):",
                "TOTAL:"
            ]
        );
        assert_eq!(rows[1].value, "- Q15.00");
        assert!(rows.last().unwrap().emphasize);
        assert!(rows[..rows.len() - 1].iter().all(|r| !r.emphasize));

        let without = compute_totals(&items(&[100.0, 50.0]), true, 0.0, 0.12);
        let rows = totals_rows(&without, 0.0, 0.12, &currency);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Subtotal:", "IVA (12%):", "TOTAL:"]);
    }

    #[test]
    fn amounts_group_thousands_and_keep_two_decimals() {
        let gtq = CurrencyConfig::gtq();
        assert_eq!(format_amount(0.0, &gtq), "Q0.00");
        assert_eq!(format_amount(1234.5, &gtq), "Q1,234.50");
        assert_eq!(format_amount(1_234_567.891, &gtq), "Q1,234,567.89");
        assert_eq!(format_amount(-42.0, &gtq), "-Q42.00");

        let mxn = CurrencyConfig::mxn();
        assert_eq!(format_amount(999.999, &mxn), "$1,000.00");
    }

    #[test]
    fn note_present_only_with_discount() {
        let currency = CurrencyConfig::gtq();
        let with = compute_totals(&items(&[200.0]), true, 12.5, 0.12);
        assert_eq!(
            discount_note(&with, 12.5, &currency).as_deref(),
            Some("Descuento aplicado: 12.5% (Q25.00).")
        );
        let without = compute_totals(&items(&[200.0]), false, 0.0, 0.12);
        assert_eq!(discount_note(&without, 0.0, &currency), None);
    }
}
