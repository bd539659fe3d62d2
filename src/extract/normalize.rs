//! Lenient number parsing for hand-edited cells.
//!
//! Nothing here fails: text that does not read as the expected number
//! becomes zero (or `None` for token searches).
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use std::str::FromStr;
use std::sync::LazyLock;

static DECIMAL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d.]+").expect("Hardcode regex pattern"));
static INTEGER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Hardcode regex pattern"));

/// Parses a currency amount rounded half-up to cents.
///
/// Dollar signs, thousands separators and whitespace are ignored. Blank,
/// unparsable and negative amounts read as `0.00`.
pub fn currency(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO);
    if value.is_sign_negative() {
        return Decimal::ZERO;
    }
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Parses a plain number, ignoring thousands separators. Anything else is `0.0`.
pub fn float_or_zero(text: &str) -> f64 {
    text.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// First run of digits and dots, e.g. `0.5` in `$0.5/张`.
pub fn first_number(text: &str) -> Option<f64> {
    DECIMAL_TOKEN
        .find(text)
        .and_then(|token| token.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Last run of digits, e.g. `150` in `101-150 lbs`.
pub fn last_integer(text: &str) -> Option<f64> {
    INTEGER_TOKEN
        .find_iter(text)
        .last()
        .and_then(|token| token.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_strips_symbols_and_rounds_half_up() {
        assert_eq!(currency("$1,234.565"), dec!(1234.57));
        assert_eq!(currency(" 5 "), dec!(5.00));
        assert_eq!(currency("7.5"), dec!(7.50));
        assert_eq!(currency("0.005"), dec!(0.01));
        assert_eq!(currency("0.004"), dec!(0.00));
        assert_eq!(currency("2.675"), dec!(2.68));
        assert_eq!(currency("1.5E1"), dec!(15.00));
        assert_eq!(currency("7.5").to_string(), "7.50");
    }

    #[test]
    fn currency_degrades_to_zero() {
        for text in ["", "   ", "免费", "N/A", "-3.20", "NaN", "inf", "$"] {
            assert_eq!(currency(text), Decimal::ZERO, "{text:?}");
        }
    }

    #[test]
    fn plain_floats() {
        assert_eq!(float_or_zero("1,250.5"), 1250.5);
        assert_eq!(float_or_zero(" 0.35 "), 0.35);
        assert_eq!(float_or_zero(""), 0.0);
        assert_eq!(float_or_zero("abc"), 0.0);
        assert_eq!(float_or_zero("NaN"), 0.0);
        assert_eq!(float_or_zero("inf"), 0.0);
    }

    #[test]
    fn numeric_tokens() {
        assert_eq!(first_number("$0.5/张"), Some(0.5));
        assert_eq!(first_number("16oz"), Some(16.0));
        assert_eq!(first_number("lbs"), None);
        assert_eq!(first_number("1.2.3"), None);
        assert_eq!(last_integer("101-150 lbs"), Some(150.0));
        assert_eq!(last_integer("AH"), None);
    }
}
