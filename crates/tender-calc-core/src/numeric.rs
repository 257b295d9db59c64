//! Numeric normalization shared by every ingestion point.
//!
//! Row fields arrive from forms and scrapers as JSON numbers, ru-RU formatted
//! strings (`"1 234,50"`), empty strings or nulls. Everything passes through
//! [`parse_number`] so that a bad cell becomes zero at the edge instead of an
//! error deep inside a scheme waterfall.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{Money, Percent};

/// Parse any JSON value as a number, `None` when it carries no usable number.
pub fn parse_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                parse_decimal_literal(&n.to_string())
            }
        }
        Value::String(s) => parse_ru_str(s),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse-or-zero: the single coercion rule for row fields.
pub fn parse_or_zero(value: &Value) -> Decimal {
    parse_number(value).unwrap_or(Decimal::ZERO)
}

/// Parse a ru-RU formatted number. Group separators (spaces, NBSP, narrow
/// NBSP) are dropped and the first comma is read as the decimal point. Like
/// a browser `parseFloat`, trailing garbage after a numeric prefix is ignored.
pub fn parse_ru_str(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\u{a0}' | '\u{202f}'))
        .collect();
    let cleaned = cleaned.replacen(',', ".", 1);
    let prefix = numeric_prefix(&cleaned);
    if prefix.is_empty() {
        return None;
    }
    parse_decimal_literal(prefix)
}

/// Longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start || digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return "";
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    &s[..end]
}

fn parse_decimal_literal(s: &str) -> Option<Decimal> {
    let s = s.strip_prefix('+').unwrap_or(s);
    let s = s.strip_suffix('.').unwrap_or(s);
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// Clamp to zero from below. Row quantities are never negative.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Replace a zero with a multiplicative default (`count` → 1, `months` → term).
pub fn or_default_if_zero(value: Decimal, default: Decimal) -> Decimal {
    if value.is_zero() {
        default
    } else {
        value
    }
}

/// Division that resolves a zero denominator to zero instead of panicking.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Percent form to fraction: 13 -> 0.13
pub fn pct(rate: Percent) -> Decimal {
    rate / dec!(100)
}

/// Round to kopecks, half away from zero.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Serde adapters
// ---------------------------------------------------------------------------

/// `deserialize_with` adapter for row quantities: parse-or-zero, then clamp
/// negatives to zero.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(non_negative(parse_or_zero(&value)))
}

/// `deserialize_with` adapter for optional configuration leaves: an
/// unparseable value counts as absent.
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value))
}

/// `deserialize_with` adapter for free-text cells that may arrive as numbers
/// or nulls.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_numbers() {
        assert_eq!(parse_or_zero(&json!(730)), dec!(730));
        assert_eq!(parse_or_zero(&json!(534.25)), dec!(534.25));
        assert_eq!(parse_or_zero(&json!(0.13)), dec!(0.13));
        assert_eq!(parse_or_zero(&json!(-4)), dec!(-4));
    }

    #[test]
    fn test_ru_formatted_strings() {
        assert_eq!(parse_or_zero(&json!("534,25")), dec!(534.25));
        assert_eq!(parse_or_zero(&json!("1 234 567,89")), dec!(1234567.89));
        assert_eq!(parse_or_zero(&json!("27\u{a0}093")), dec!(27093));
        assert_eq!(parse_or_zero(&json!("  12  ")), dec!(12));
    }

    #[test]
    fn test_numeric_prefix_like_parse_float() {
        assert_eq!(parse_or_zero(&json!("720 ч")), dec!(720));
        assert_eq!(parse_or_zero(&json!("12.5abc")), dec!(12.5));
        assert_eq!(parse_or_zero(&json!("1e3")), dec!(1000));
        assert_eq!(parse_or_zero(&json!(".5")), dec!(0.5));
    }

    #[test]
    fn test_garbage_becomes_zero() {
        assert_eq!(parse_or_zero(&json!(null)), Decimal::ZERO);
        assert_eq!(parse_or_zero(&json!("")), Decimal::ZERO);
        assert_eq!(parse_or_zero(&json!("abc")), Decimal::ZERO);
        assert_eq!(parse_or_zero(&json!("-")), Decimal::ZERO);
        assert_eq!(parse_or_zero(&json!(true)), Decimal::ZERO);
        assert_eq!(parse_or_zero(&json!([1, 2])), Decimal::ZERO);
        assert_eq!(parse_or_zero(&json!({"v": 1})), Decimal::ZERO);
        assert!(parse_number(&json!("n/a")).is_none());
    }

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_defaults_and_clamps() {
        assert_eq!(or_default_if_zero(Decimal::ZERO, dec!(12)), dec!(12));
        assert_eq!(or_default_if_zero(dec!(3), dec!(12)), dec!(3));
        assert_eq!(non_negative(dec!(-1)), Decimal::ZERO);
        assert_eq!(pct(dec!(13)), dec!(0.13));
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_lenient_amount_adapter() {
        #[derive(Deserialize)]
        struct Cell {
            #[serde(default, deserialize_with = "lenient_amount")]
            v: Decimal,
        }
        let c: Cell = serde_json::from_value(json!({"v": "-5"})).unwrap();
        assert_eq!(c.v, Decimal::ZERO);
        let c: Cell = serde_json::from_value(json!({"v": "7,5"})).unwrap();
        assert_eq!(c.v, dec!(7.5));
        let c: Cell = serde_json::from_value(json!({})).unwrap();
        assert_eq!(c.v, Decimal::ZERO);
    }
}
