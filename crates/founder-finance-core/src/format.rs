//! Display helpers shared by engine insights and the CLI.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Multiple, Rate, Runway};

/// Group an unsigned integer string with thousands separators.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole-dollar currency: `1234567.8` -> `"$1,234,568"`.
pub fn format_currency(amount: Money) -> String {
    let rounded = amount.round_dp(0);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().trunc().to_string();
    format!("{sign}${}", group_thousands(&digits))
}

/// Compact currency for insight text: `"$1.2M"`, `"$850K"`, `"$3.4B"`.
pub fn format_currency_compact(amount: Money) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = amount.abs();
    let body = if abs >= dec!(1_000_000_000) {
        format!("{}B", (abs / dec!(1_000_000_000)).round_dp(1).normalize())
    } else if abs >= dec!(1_000_000) {
        format!("{}M", (abs / dec!(1_000_000)).round_dp(1).normalize())
    } else if abs >= dec!(1_000) {
        format!("{}K", (abs / dec!(1_000)).round_dp(0).normalize())
    } else {
        abs.round_dp(0).normalize().to_string()
    };
    format!("{sign}${body}")
}

/// Decimal rate as a percentage: `(0.125, 1)` -> `"12.5%"`.
pub fn format_percent(rate: Rate, dp: u32) -> String {
    let pct = (rate * dec!(100)).round_dp(dp);
    format!("{:.*}%", dp as usize, pct)
}

/// Share counts with separators.
pub fn format_shares(shares: u64) -> String {
    group_thousands(&shares.to_string())
}

/// Multiples to one decimal: `"13.0x"`.
pub fn format_multiple(multiple: Multiple) -> String {
    format!("{:.1}x", multiple.round_dp(1))
}

pub fn format_runway(runway: &Runway) -> String {
    match runway {
        Runway::Months(m) => format!("{:.1} months", m.round_dp(1)),
        Runway::Infinite => "Infinite".to_string(),
    }
}

/// Months as a signed, one-decimal figure for deltas.
pub fn format_months(months: Decimal) -> String {
    format!("{:.1} months", months.round_dp(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(format_currency(dec!(1234567.8)), "$1,234,568");
        assert_eq!(format_currency(dec!(999)), "$999");
        assert_eq!(format_currency(dec!(0)), "$0");
        assert_eq!(format_currency(dec!(-50000)), "-$50,000");
    }

    #[test]
    fn test_currency_compact() {
        assert_eq!(format_currency_compact(dec!(7_800_000)), "$7.8M");
        assert_eq!(format_currency_compact(dec!(850_000)), "$850K");
        assert_eq!(format_currency_compact(dec!(3_400_000_000)), "$3.4B");
        assert_eq!(format_currency_compact(dec!(950)), "$950");
    }

    #[test]
    fn test_percent_and_multiple() {
        assert_eq!(format_percent(dec!(0.125), 1), "12.5%");
        assert_eq!(format_percent(dec!(0.1), 0), "10%");
        assert_eq!(format_multiple(dec!(13)), "13.0x");
        assert_eq!(format_shares(10_000_000), "10,000,000");
    }

    #[test]
    fn test_runway_text() {
        assert_eq!(format_runway(&Runway::Infinite), "Infinite");
        assert_eq!(format_runway(&Runway::Months(dec!(14.26))), "14.3 months");
    }
}
