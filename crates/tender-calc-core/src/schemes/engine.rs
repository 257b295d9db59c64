use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::aggregation::BaseTotals;
use crate::config::Constants;
use crate::error::TenderCalcError;
use crate::numeric::{pct, safe_div};
use crate::types::{Money, Rate};
use crate::TenderCalcResult;

use super::catalog::{SchemeDescriptor, VatMode};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Largest base amount (roubles, or heads) the waterfall accepts. Keeps every
/// intermediate product well inside `Decimal` range.
pub const MAX_BASE_AMOUNT: Decimal = dec!(1000000000000000000);

/// Smallest nonzero dividend net factor; extraction costs divide by it.
const MIN_DIVIDEND_NET_FACTOR: Decimal = dec!(0.01);

/// Full waterfall for one scheme. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeResult {
    pub scheme_code: String,
    /// Contract price including VAT where applicable
    pub revenue_total: Money,
    /// Contract price net of embedded VAT
    pub revenue_base: Money,
    /// Annual wages actually paid, official plus informal
    pub fot_real: Money,
    /// Annual payroll routed through official channels
    pub fot_official: Money,
    pub ndfl: Money,
    pub pension_contributions: Money,
    pub social_contributions: Money,
    pub payroll_taxes: Money,
    pub vat_out: Money,
    pub vat_in: Money,
    pub vat_deduction: Money,
    pub simplified_tax: Money,
    pub profit_tax: Money,
    pub net_salary: Money,
    /// Wages paid outside official payroll
    pub grey_amount: Money,
    pub cash_out_commission: Money,
    pub dividend_tax: Money,
    pub total_expenses: Money,
    pub profit_before_extraction: Money,
    pub profit_net: Money,
    /// `profit_net / revenue_total`, zero without revenue
    pub profitability: Rate,
}

/// Evaluate one scheme against base totals.
///
/// The order of the steps matters: official payroll depends on the grey flag,
/// net salary on official payroll, the informal gap on net salary, and every
/// extraction cost on the informal gap.
///
/// Every division resolves a zero denominator to zero, so an all-zero row set
/// gives an all-zero result.
pub fn calculate_scheme(
    base: &BaseTotals,
    constants: &Constants,
    scheme: &SchemeDescriptor,
) -> TenderCalcResult<SchemeResult> {
    validate_descriptor(scheme)?;
    validate_base(base)?;
    validate_constants(constants)?;
    let c = constants;

    // --- 1. Revenue split ---
    let revenue_total = base.total_contract_gross;
    let (revenue_base, vat_out) = match scheme.vat_mode {
        VatMode::InsideRevenue => {
            let net = safe_div(revenue_total, Decimal::ONE + pct(c.vat_rate));
            (net, revenue_total - net)
        }
        VatMode::OutsideRevenue => (revenue_total, Decimal::ZERO),
    };

    // --- 2. Payroll baseline ---
    let fot_real = base.total_salary_by_avg_rate_month * MONTHS_PER_YEAR;
    // Either raw figure only matters up to `fot_real`, so one too large to
    // represent is replaced by `fot_real` before the clamp.
    let fot_official_raw = if scheme.grey_salary {
        // The floor is per person per month
        c.official_salary_floor
            .checked_mul(MONTHS_PER_YEAR)
            .and_then(|annual| annual.checked_mul(base.people.max(Decimal::ONE)))
            .unwrap_or(fot_real)
    } else if c.payroll_net_factor.is_zero() {
        Decimal::ZERO
    } else {
        fot_real
            .checked_div(c.payroll_net_factor)
            .unwrap_or(fot_real)
    };
    let fot_official = fot_official_raw.min(fot_real);

    // --- 3. Payroll taxes ---
    let ndfl = fot_official * pct(c.ndfl_rate);
    let pension_contributions = fot_official * pct(c.pension_rate);
    let social_contributions = fot_official * pct(c.social_rate);
    let payroll_taxes = ndfl + pension_contributions + social_contributions;

    // --- 4. Net salary and informal gap ---
    let net_salary = fot_official - ndfl;
    let grey_amount = (fot_real - net_salary).max(Decimal::ZERO);

    // --- 5. Cash-extraction cost ---
    let (cash_out_commission, dividend_tax) = if scheme.sole_proprietor_cashout {
        let commission = grey_amount * pct(c.cash_out_commission_rate);
        let tax = safe_div(grey_amount + commission, c.dividend_net_factor)
            * pct(c.dividend_tax_rate);
        (commission, tax)
    } else if scheme.grey_salary {
        let tax = safe_div(grey_amount, c.dividend_net_factor) * pct(c.dividend_tax_rate);
        (Decimal::ZERO, tax)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    // --- 6-8. Regime taxes and total expenses ---
    let mut vat_in = Decimal::ZERO;
    let mut vat_deduction = Decimal::ZERO;
    let mut simplified_tax = Decimal::ZERO;
    let mut profit_tax = Decimal::ZERO;

    let total_expenses = match scheme.vat_mode {
        VatMode::OutsideRevenue => {
            let reduced = pct(c.reduced_vat_rate);
            vat_deduction = safe_div(revenue_total, Decimal::ONE + reduced) * reduced;
            simplified_tax = (revenue_total - vat_deduction) * pct(c.simplified_rate);
            vat_deduction
                + simplified_tax
                + payroll_taxes
                + net_salary
                + dividend_tax
                + cash_out_commission
        }
        VatMode::InsideRevenue => {
            if scheme.grey_salary {
                vat_in = vat_out * pct(c.vat_risk_commission_rate);
            }
            // NOTE: suspect formula kept as shipped. The base deducts payroll
            // taxes plus *net* salary rather than gross official payroll, so
            // NDFL is not treated as a deductible expense. Do not change
            // without sign-off from the business owner of these formulas.
            let taxable_income = (revenue_base - payroll_taxes - net_salary).max(Decimal::ZERO);
            profit_tax = taxable_income * pct(c.profit_tax_rate);
            vat_out - vat_in
                + payroll_taxes
                + net_salary
                + dividend_tax
                + profit_tax
                + cash_out_commission
        }
    };

    // --- 9. Profit and profitability ---
    let profit_before_extraction = revenue_total - total_expenses;
    let profit_net = profit_before_extraction * c.dividend_net_factor;
    let profitability = if revenue_total > Decimal::ZERO {
        profit_net / revenue_total
    } else {
        Decimal::ZERO
    };

    tracing::debug!(
        scheme = %scheme.code,
        %revenue_total,
        %profit_net,
        %profitability,
        "scheme evaluated"
    );

    Ok(SchemeResult {
        scheme_code: scheme.code.clone(),
        revenue_total,
        revenue_base,
        fot_real,
        fot_official,
        ndfl,
        pension_contributions,
        social_contributions,
        payroll_taxes,
        vat_out,
        vat_in,
        vat_deduction,
        simplified_tax,
        profit_tax,
        net_salary,
        grey_amount,
        cash_out_commission,
        dividend_tax,
        total_expenses,
        profit_before_extraction,
        profit_net,
        profitability,
    })
}

fn validate_base(base: &BaseTotals) -> TenderCalcResult<()> {
    let amounts = [
        ("total_contract_gross", base.total_contract_gross),
        ("total_salary_by_avg_rate_month", base.total_salary_by_avg_rate_month),
        ("people", base.people),
    ];
    for (field, value) in amounts {
        if value.abs() > MAX_BASE_AMOUNT {
            return Err(TenderCalcError::InvalidInput {
                field: field.into(),
                reason: format!("{value} exceeds the supported maximum {MAX_BASE_AMOUNT}"),
            });
        }
    }
    Ok(())
}

/// Percent rates must lie in 0..=100, net factors in 0..=1.
fn validate_constants(c: &Constants) -> TenderCalcResult<()> {
    let rates = [
        ("ndfl_rate", c.ndfl_rate),
        ("simplified_rate", c.simplified_rate),
        ("vat_rate", c.vat_rate),
        ("reduced_vat_rate", c.reduced_vat_rate),
        ("profit_tax_rate", c.profit_tax_rate),
        ("dividend_tax_rate", c.dividend_tax_rate),
        ("pension_rate", c.pension_rate),
        ("social_rate", c.social_rate),
        ("cash_out_commission_rate", c.cash_out_commission_rate),
        ("vat_risk_commission_rate", c.vat_risk_commission_rate),
    ];
    for (field, rate) in rates {
        if rate < Decimal::ZERO || rate > dec!(100) {
            return Err(TenderCalcError::InvalidInput {
                field: field.into(),
                reason: format!("Rate {rate}% is outside 0..100%"),
            });
        }
    }
    let factors = [
        ("payroll_net_factor", c.payroll_net_factor),
        ("dividend_net_factor", c.dividend_net_factor),
    ];
    for (field, factor) in factors {
        if factor < Decimal::ZERO || factor > Decimal::ONE {
            return Err(TenderCalcError::InvalidInput {
                field: field.into(),
                reason: format!("Factor {factor} is outside 0..1"),
            });
        }
    }
    let dnf = c.dividend_net_factor;
    if !dnf.is_zero() && dnf < MIN_DIVIDEND_NET_FACTOR {
        return Err(TenderCalcError::InvalidInput {
            field: "dividend_net_factor".into(),
            reason: format!("Factor {dnf} is below {MIN_DIVIDEND_NET_FACTOR}"),
        });
    }
    if c.official_salary_floor.abs() > MAX_BASE_AMOUNT {
        return Err(TenderCalcError::InvalidInput {
            field: "official_salary_floor".into(),
            reason: format!("{} exceeds the supported maximum", c.official_salary_floor),
        });
    }
    Ok(())
}

fn validate_descriptor(scheme: &SchemeDescriptor) -> TenderCalcResult<()> {
    if scheme.code.trim().is_empty() {
        return Err(TenderCalcError::ContractViolation(
            "scheme descriptor has an empty code".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{compute_base_totals, StaffingRow};
    use crate::schemes::catalog::{find_scheme, standard_schemes};
    use crate::schemes::compare::Metric;

    fn single_post_base() -> BaseTotals {
        let row = StaffingRow::new(dec!(730), dec!(534.25))
            .with_months(dec!(12))
            .with_shift(dec!(24), dec!(7500));
        compute_base_totals(&[row], &[], dec!(12)).unwrap()
    }

    fn scheme(code: &str) -> SchemeDescriptor {
        find_scheme(code).unwrap()
    }

    fn assert_close(actual: Decimal, expected: Decimal, what: &str) {
        assert!(
            (actual - expected).abs() < dec!(0.01),
            "{what}: expected ~{expected}, got {actual}"
        );
    }

    #[test]
    fn test_white_simplified_single_post() {
        let r = calculate_scheme(&single_post_base(), &Constants::fallback(), &scheme("BELUSN"))
            .unwrap();
        assert_eq!(r.revenue_total, dec!(4680030));
        assert_eq!(r.revenue_base, dec!(4680030));
        assert_eq!(r.fot_real, dec!(2737500));
        // Gross-up exceeds real wages, so the clamp holds official = real
        assert_eq!(r.fot_official, dec!(2737500));
        assert_eq!(r.ndfl, dec!(355875));
        assert_eq!(r.payroll_taxes, dec!(1037512.5));
        assert_eq!(r.net_salary, dec!(2381625));
        assert_close(r.vat_deduction, dec!(306170.19), "vat deduction");
        assert_close(r.simplified_tax, dec!(262431.59), "simplified tax");
        assert_eq!(r.dividend_tax, Decimal::ZERO);
        assert_eq!(r.cash_out_commission, Decimal::ZERO);
        assert_close(r.total_expenses, dec!(3987739.28), "total expenses");
        assert_close(r.profit_net, dec!(602292.93), "profit net");
    }

    #[test]
    fn test_grey_vat_single_post() {
        let r = calculate_scheme(&single_post_base(), &Constants::fallback(), &scheme("SERNDS"))
            .unwrap();
        // Floor 27 093 × 12 × 1 person
        assert_eq!(r.fot_official, dec!(325116));
        assert_eq!(r.ndfl, dec!(42265.08));
        assert_eq!(r.net_salary, dec!(282850.92));
        assert_eq!(r.grey_amount, dec!(2454649.08));
        assert_close(r.vat_out, dec!(780005.00), "vat out");
        assert_close(r.vat_in, dec!(93600.60), "vat in");
        assert_close(r.dividend_tax, dec!(366786.64), "dividend tax");
        assert_close(r.profit_tax, dec!(698791.02), "profit tax");
        assert_eq!(r.cash_out_commission, Decimal::ZERO);
    }

    #[test]
    fn test_sole_proprietor_adds_commission_to_dividend_base() {
        let r = calculate_scheme(&single_post_base(), &Constants::fallback(), &scheme("IPNDS"))
            .unwrap();
        assert_close(r.cash_out_commission, dec!(368197.36), "commission");
        let expected_tax =
            (r.grey_amount + r.cash_out_commission) / dec!(0.87) * dec!(0.13);
        assert_close(r.dividend_tax, expected_tax, "dividend tax");
    }

    #[test]
    fn test_grey_floor_scales_with_headcount() {
        let row = StaffingRow::new(dec!(720), dec!(300))
            .with_count(dec!(3))
            .with_shift(dec!(24), dec!(4000));
        let base = compute_base_totals(&[row], &[], dec!(12)).unwrap();
        let r = calculate_scheme(&base, &Constants::fallback(), &scheme("SERUSN")).unwrap();
        assert_eq!(r.fot_official, dec!(27093) * dec!(12) * dec!(3));
        assert!(r.fot_official < r.fot_real);
    }

    #[test]
    fn test_official_payroll_clamped_to_real() {
        // Real wages far below the floor
        let row = StaffingRow::new(dec!(24), dec!(300)).with_shift(dec!(24), dec!(1000));
        let base = compute_base_totals(&[row], &[], dec!(12)).unwrap();
        for s in standard_schemes() {
            let r = calculate_scheme(&base, &Constants::fallback(), &s).unwrap();
            assert!(r.fot_official <= r.fot_real, "{}: clamp violated", s.code);
            assert_eq!(r.fot_official, dec!(12000), "{}", s.code);
        }
    }

    #[test]
    fn test_grey_amount_never_negative() {
        let mut constants = Constants::fallback();
        for ndfl in [Decimal::ZERO, dec!(13), dec!(100)] {
            constants.ndfl_rate = ndfl;
            for s in standard_schemes() {
                let r = calculate_scheme(&single_post_base(), &constants, &s).unwrap();
                assert!(r.grey_amount >= Decimal::ZERO, "{} at {ndfl}%", s.code);
            }
        }
    }

    #[test]
    fn test_out_of_range_constants_are_invalid_input() {
        let mut constants = Constants::fallback();
        constants.ndfl_rate = dec!(-5);
        match calculate_scheme(&single_post_base(), &constants, &scheme("BELUSN")) {
            Err(TenderCalcError::InvalidInput { field, .. }) => assert_eq!(field, "ndfl_rate"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let mut constants = Constants::fallback();
        constants.vat_rate = dec!(10000000000000000000000000000);
        assert!(calculate_scheme(&single_post_base(), &constants, &scheme("SERNDS")).is_err());

        let mut constants = Constants::fallback();
        constants.dividend_net_factor = dec!(0.0000001);
        assert!(calculate_scheme(&single_post_base(), &constants, &scheme("IPNDS")).is_err());
    }

    #[test]
    fn test_oversized_base_is_invalid_input() {
        let mut base = single_post_base();
        base.total_salary_by_avg_rate_month = dec!(70000000000000000000000000000);
        for s in standard_schemes() {
            match calculate_scheme(&base, &Constants::fallback(), &s) {
                Err(TenderCalcError::InvalidInput { field, .. }) => {
                    assert_eq!(field, "total_salary_by_avg_rate_month")
                }
                other => panic!("Expected InvalidInput, got {other:?}"),
            }
        }
        // At the ceiling the waterfall still completes
        base.total_salary_by_avg_rate_month = MAX_BASE_AMOUNT;
        base.total_contract_gross = MAX_BASE_AMOUNT;
        base.people = MAX_BASE_AMOUNT;
        for s in standard_schemes() {
            let r = calculate_scheme(&base, &Constants::fallback(), &s).unwrap();
            assert!(r.fot_official <= r.fot_real, "{}", s.code);
        }
    }

    #[test]
    fn test_zero_input_gives_zero_result() {
        let base = compute_base_totals(&[], &[], dec!(12)).unwrap();
        let mut schemes = standard_schemes();
        schemes.push(SchemeDescriptor::new(
            "SYNTH",
            "Synthetic",
            VatMode::OutsideRevenue,
            false,
            true,
        ));
        for s in schemes {
            let r = calculate_scheme(&base, &Constants::fallback(), &s).unwrap();
            for m in Metric::ALL {
                assert_eq!(m.value(&r), Decimal::ZERO, "{}: {}", s.code, m.name());
            }
        }
    }

    #[test]
    fn test_zero_factors_do_not_panic() {
        let mut constants = Constants::fallback();
        constants.payroll_net_factor = Decimal::ZERO;
        constants.dividend_net_factor = Decimal::ZERO;
        let r = calculate_scheme(&single_post_base(), &constants, &scheme("IPNDS")).unwrap();
        assert_eq!(r.dividend_tax, Decimal::ZERO);
        assert_eq!(r.profit_net, Decimal::ZERO);

        let r = calculate_scheme(&single_post_base(), &constants, &scheme("BELNDS")).unwrap();
        assert_eq!(r.fot_official, Decimal::ZERO);
    }

    #[test]
    fn test_revenue_conservation_on_white_schemes() {
        for code in ["BELUSN", "BELNDS"] {
            let r = calculate_scheme(&single_post_base(), &Constants::fallback(), &scheme(code))
                .unwrap();
            let diff = (r.total_expenses + r.profit_before_extraction - r.revenue_total).abs();
            assert!(diff < dec!(0.0000001), "{code}: off by {diff}");
        }
    }

    #[test]
    fn test_synthetic_outside_sole_proprietor_combination() {
        let synth =
            SchemeDescriptor::new("USNIP", "USN + IP", VatMode::OutsideRevenue, false, true);
        let r = calculate_scheme(&single_post_base(), &Constants::fallback(), &synth).unwrap();
        // White payroll, but the SP channel still charges on the gap
        assert_eq!(r.fot_official, dec!(2737500));
        assert_eq!(r.grey_amount, dec!(355875));
        assert_eq!(r.cash_out_commission, dec!(53381.25));
        assert_eq!(r.vat_in, Decimal::ZERO);
        assert_eq!(r.vat_out, Decimal::ZERO);
        assert!(r.vat_deduction > Decimal::ZERO);
        assert!(r.simplified_tax > Decimal::ZERO);
    }

    #[test]
    fn test_empty_code_is_contract_violation() {
        let bad = SchemeDescriptor::new("  ", "Broken", VatMode::InsideRevenue, false, false);
        match calculate_scheme(&single_post_base(), &Constants::fallback(), &bad) {
            Err(TenderCalcError::ContractViolation(msg)) => assert!(msg.contains("code")),
            other => panic!("Expected ContractViolation, got {other:?}"),
        }
    }
}
