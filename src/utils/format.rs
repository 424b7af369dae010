use rust_decimal::{Decimal, RoundingStrategy};

const GROUPING_SEPARATOR: char = ',';

/// Renders an amount with two decimals and thousands grouping, e.g. `-1,234.50`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let body = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, group_digits(int_part), frac_part)
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, GROUPING_SEPARATOR);
        }
        grouped.insert(0, ch);
    }
    grouped
}
