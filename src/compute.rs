use chrono::{Datelike, NaiveDate};

use crate::model::LineItem;

/// Advance-payment bookings bill 30% of the row amount upfront.
pub const ADVANCE_FRACTION: f64 = 0.3;

/// `quantity * rate`, reduced to the advance fraction when flagged.
/// Inputs are not range-checked; negative or zero values pass through.
pub fn line_item_total(quantity: i64, rate: f64, advance: bool) -> f64 {
    let total = quantity as f64 * rate;
    if advance { total * ADVANCE_FRACTION } else { total }
}

/// Sum of row totals in collection order. Empty collection yields 0.
pub fn invoice_total(items: &[LineItem]) -> f64 {
    items
        .iter()
        .map(|item| line_item_total(item.quantity, item.rate, item.advance))
        .sum()
}

/// US-locale currency: `$` prefix, thousands grouping, exactly two
/// fraction digits. Presentation only; the result never feeds back into
/// numeric state.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}.{:02}", grouped, frac)
    } else {
        format!("${}.{:02}", grouped, frac)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// "April 24, 2024" — invoice header dates.
    Long,
    /// "24th April 2024" — contract signature dates.
    Ordinal,
}

/// Formats a date per pattern. A missing date formats `fallback` instead —
/// the document must always render, so absent or unparsable input is a
/// recoverable condition, never an error. Callers pass today's date as the
/// fallback; keeping it a parameter keeps the core deterministic.
pub fn format_date(date: Option<NaiveDate>, pattern: DatePattern, fallback: NaiveDate) -> String {
    let date = date.unwrap_or(fallback);
    match pattern {
        DatePattern::Long => format!("{} {}, {}", date.format("%B"), date.day(), date.year()),
        DatePattern::Ordinal => format!(
            "{}{} {} {}",
            date.day(),
            ordinal_suffix(date.day()),
            date.format("%B"),
            date.year()
        ),
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, rate: f64, advance: bool) -> LineItem {
        LineItem::new("Photography Session", quantity, rate, advance)
    }

    #[test]
    fn line_item_total_is_quantity_times_rate() {
        assert_eq!(line_item_total(2, 150.0, false), 300.0);
        assert_eq!(line_item_total(1, 500.0, false), 500.0);
    }

    #[test]
    fn advance_rows_bill_thirty_percent() {
        assert_eq!(line_item_total(2, 100.0, true), 0.3 * 200.0);
        assert_eq!(line_item_total(1, 1000.0, true), 300.0);
    }

    #[test]
    fn negative_and_zero_inputs_pass_through() {
        assert_eq!(line_item_total(0, 500.0, false), 0.0);
        assert_eq!(line_item_total(-1, 500.0, false), -500.0);
    }

    #[test]
    fn invoice_total_sums_rows_in_order() {
        let items = vec![item(1, 500.0, false), item(2, 100.0, true)];
        assert_eq!(invoice_total(&items), 500.0 + 0.3 * 200.0);
    }

    #[test]
    fn empty_invoice_totals_zero() {
        assert_eq!(invoice_total(&[]), 0.0);
    }

    #[test]
    fn currency_shows_two_digits_and_grouping() {
        assert_eq!(format_currency(1000.0), "$1,000.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(560.0), "$560.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn negative_currency_keeps_grouping() {
        assert_eq!(format_currency(-1500.0), "-$1,500.00");
    }

    #[test]
    fn long_pattern_matches_invoice_header_style() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 24).unwrap();
        assert_eq!(format_date(Some(date), DatePattern::Long, date), "April 24, 2024");
    }

    #[test]
    fn ordinal_pattern_matches_signature_style() {
        let fallback = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let cases = [
            (NaiveDate::from_ymd_opt(2024, 4, 24).unwrap(), "24th April 2024"),
            (NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), "1st April 2024"),
            (NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(), "2nd April 2024"),
            (NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(), "3rd April 2024"),
            (NaiveDate::from_ymd_opt(2024, 4, 11).unwrap(), "11th April 2024"),
            (NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(), "12th April 2024"),
            (NaiveDate::from_ymd_opt(2024, 4, 13).unwrap(), "13th April 2024"),
            (NaiveDate::from_ymd_opt(2024, 4, 21).unwrap(), "21st April 2024"),
        ];
        for (date, expected) in cases {
            assert_eq!(format_date(Some(date), DatePattern::Ordinal, fallback), expected);
        }
    }

    #[test]
    fn missing_date_formats_fallback_instead_of_failing() {
        let fallback = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(format_date(None, DatePattern::Long, fallback), "June 2, 2025");
        assert_eq!(format_date(None, DatePattern::Ordinal, fallback), "2nd June 2025");
    }
}
