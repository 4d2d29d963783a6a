//! Presentation helpers. No business logic: rounding here is for display only.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::DealCalcError;
use crate::types::{Money, Percent, ROUNDING};
use crate::DealCalcResult;

const CURRENCY_SYMBOL: &str = "$";
const NOT_AVAILABLE: &str = "N/A";

/// US-style currency: `$1,234.56`, `-$202.02`.
pub fn format_currency(value: Money) -> String {
    let mut rounded = value.round_dp_with_strategy(2, ROUNDING);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    rounded.set_sign_positive(true);
    rounded.rescale(2);

    let text = rounded.to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}{CURRENCY_SYMBOL}{}.{cents}", group_thousands(whole))
}

/// Two decimal places with a `%` suffix: `5.83%`.
pub fn format_percent(value: Percent) -> String {
    let mut rounded = value.round_dp_with_strategy(2, ROUNDING);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(2);
    format!("{rounded}%")
}

/// `N/A` for an undefined metric.
pub fn format_optional_percent(value: Option<Percent>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_percent)
}

/// Inverse of [`format_currency`]. Accepts an optional sign, symbol and
/// thousands separators.
pub fn parse_money(text: &str) -> DealCalcResult<Money> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let digits: String = rest
        .trim_start_matches(CURRENCY_SYMBOL)
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let value = Decimal::from_str(&digits)
        .map_err(|e| DealCalcError::Parse(format!("'{text}' is not a money amount: {e}")))?;
    Ok(if negative { -value } else { value })
}

/// Inverse of [`format_percent`].
pub fn parse_percent(text: &str) -> DealCalcResult<Percent> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    Decimal::from_str(number)
        .map_err(|e| DealCalcError::Parse(format!("'{text}' is not a percentage: {e}")))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(5)), "$5.00");
        assert_eq!(format_currency(dec!(999.999)), "$1,000.00");
        assert_eq!(format_currency(dec!(1538.27)), "$1,538.27");
        assert_eq!(format_currency(dec!(275000)), "$275,000.00");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(-202.02)), "-$202.02");
    }

    #[test]
    fn test_format_currency_half_up() {
        assert_eq!(format_currency(dec!(0.005)), "$0.01");
        assert_eq!(format_currency(dec!(-0.004)), "$0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(5.8309)), "5.83%");
        assert_eq!(format_percent(dec!(-3.8328)), "-3.83%");
        assert_eq!(format_percent(dec!(8)), "8.00%");
        assert_eq!(format_percent(dec!(0.125)), "0.13%");
        assert_eq!(format_percent(dec!(-0.001)), "0.00%");
    }

    #[test]
    fn test_format_optional_percent() {
        assert_eq!(format_optional_percent(None), "N/A");
        assert_eq!(format_optional_percent(Some(dec!(7.56))), "7.56%");
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$1,538.27").unwrap(), dec!(1538.27));
        assert_eq!(parse_money("-$202.02").unwrap(), dec!(-202.02));
        assert_eq!(parse_money(" 42 ").unwrap(), dec!(42));
        assert!(matches!(parse_money("abc"), Err(DealCalcError::Parse(_))));
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("5.83%").unwrap(), dec!(5.83));
        assert_eq!(parse_percent("-3.83 %").unwrap(), dec!(-3.83));
        assert!(parse_percent("N/A").is_err());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456789"), "123,456,789");
    }

    proptest! {
        /// Formatting then parsing recovers the value to the cent.
        #[test]
        fn currency_round_trip(cents in 0i64..100_000_000_000i64) {
            let value = Decimal::new(cents, 2);
            prop_assert_eq!(parse_money(&format_currency(value)).unwrap(), value);
        }

        /// Sub-cent input comes back within one cent.
        #[test]
        fn currency_round_trip_within_a_cent(mills in 0i64..1_000_000_000_000i64) {
            let value = Decimal::new(mills, 3);
            let parsed = parse_money(&format_currency(value)).unwrap();
            prop_assert!((parsed - value).abs() <= dec!(0.01));
        }

        #[test]
        fn percent_round_trip(hundredths in -100_000i64..100_000i64) {
            let value = Decimal::new(hundredths, 2);
            prop_assert_eq!(parse_percent(&format_percent(value)).unwrap(), value);
        }
    }
}
