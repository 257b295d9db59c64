//! ru-RU number formatting for display surfaces.
//!
//! Matches what `Intl.NumberFormat('ru-RU')` prints: NBSP between thousands
//! groups and a comma before the fraction.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const GROUP_SEPARATOR: char = '\u{a0}';

/// Money with exactly two fraction digits: `1 234 567,89`.
pub fn fmt_num(value: Decimal) -> String {
    fmt_fixed(value, 2)
}

/// Whole number: `27 093`.
pub fn fmt_int(value: Decimal) -> String {
    fmt_fixed(value, 0)
}

/// Fraction shown as a percentage with one digit: 0.1234 -> `12,3%`.
pub fn fmt_percent(fraction: Decimal) -> String {
    format!("{}%", fmt_fixed(fraction * dec!(100), 1))
}

fn fmt_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let mut text = abs.to_string();
    let (int_part, frac_part) = match text.find('.') {
        Some(idx) => {
            let frac = text.split_off(idx + 1);
            text.pop();
            (text, frac)
        }
        None => (text, String::new()),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if dp > 0 {
        let mut frac = frac_part;
        while frac.len() < dp as usize {
            frac.push('0');
        }
        out.push(',');
        out.push_str(&frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num_groups_and_comma() {
        assert_eq!(fmt_num(dec!(1234567.891)), "1\u{a0}234\u{a0}567,89");
        assert_eq!(fmt_num(dec!(0)), "0,00");
        assert_eq!(fmt_num(dec!(999.5)), "999,50");
        assert_eq!(fmt_num(dec!(-1000)), "-1\u{a0}000,00");
    }

    #[test]
    fn test_fmt_int() {
        assert_eq!(fmt_int(dec!(27093)), "27\u{a0}093");
        assert_eq!(fmt_int(dec!(228124.5)), "228\u{a0}125");
        assert_eq!(fmt_int(dec!(12)), "12");
    }

    #[test]
    fn test_fmt_percent() {
        assert_eq!(fmt_percent(dec!(0.1234)), "12,3%");
        assert_eq!(fmt_percent(Decimal::ZERO), "0,0%");
        assert_eq!(fmt_percent(dec!(-0.05)), "-5,0%");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(fmt_num(dec!(-0.001)), "0,00");
    }
}
