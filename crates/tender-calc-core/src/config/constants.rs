use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::numeric::lenient_opt;
use crate::types::{Factor, Money, Months, Percent};

// ---------------------------------------------------------------------------
// Resolved constants
// ---------------------------------------------------------------------------

/// Flat, read-only record consumed by the scheme engine.
///
/// Every `*_rate` is in percent form (13 = 13%). Factors are plain
/// multipliers. Built once per session by the resolver and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    /// Contract length used when a session carries neither a duration nor a term
    pub default_service_months: Months,
    /// Personal income tax withheld from official payroll (NDFL)
    pub ndfl_rate: Percent,
    /// Simplified-regime (USN "income") tax
    pub simplified_rate: Percent,
    /// General-regime VAT embedded in the contract price
    pub vat_rate: Percent,
    /// Reduced VAT used as the simplified-regime deduction basis
    pub reduced_vat_rate: Percent,
    pub profit_tax_rate: Percent,
    pub dividend_tax_rate: Percent,
    /// Employer pension contribution (PFR)
    pub pension_rate: Percent,
    /// Employer social insurance contribution (FSS)
    pub social_rate: Percent,
    /// Net-to-gross payroll factor, `1 - ndfl`
    pub payroll_net_factor: Factor,
    /// Share of profit left after dividend extraction
    pub dividend_net_factor: Factor,
    /// Sole-proprietor cash-out commission
    pub cash_out_commission_rate: Percent,
    /// Risk commission paid for offset input VAT on grey general-regime schemes
    pub vat_risk_commission_rate: Percent,
    /// Statutory minimum monthly wage (MROT)
    pub mrot: Money,
    /// Per-person monthly official salary used by grey schemes
    pub official_salary_floor: Money,
    pub bid_guarantee_rate: Percent,
    pub contract_guarantee_rate: Percent,
}

impl Constants {
    /// The hard-coded in-engine fallback, used when no document is usable.
    pub fn fallback() -> Self {
        Self::from_document(&ConfigDocument::default())
    }

    /// Scale a (possibly partial) document into constants. Missing leaves fall
    /// back one by one to the hard-coded values.
    pub fn from_document(doc: &ConfigDocument) -> Self {
        let d = doc.clone().overlay(ConfigDocument::builtin());
        // Saturates on absurd leaves; the engine rejects rates outside 0..100%
        let percent =
            |leaf: Option<Decimal>| leaf.unwrap_or(Decimal::ZERO).saturating_mul(dec!(100));
        let ndfl = d.taxes.ndfl.unwrap_or(Decimal::ZERO);
        let mrot = d.salary.mrot.unwrap_or(Decimal::ZERO);

        Constants {
            default_service_months: d.core.default_service_months.unwrap_or(dec!(12)),
            ndfl_rate: percent(d.taxes.ndfl),
            simplified_rate: percent(d.taxes.simplified),
            vat_rate: percent(d.taxes.vat),
            reduced_vat_rate: percent(d.taxes.vat_reduced),
            profit_tax_rate: percent(d.taxes.profit),
            dividend_tax_rate: percent(d.taxes.dividend),
            pension_rate: percent(d.payroll.pension),
            social_rate: percent(d.payroll.social),
            payroll_net_factor: Decimal::ONE.saturating_sub(ndfl),
            dividend_net_factor: d.cashout.dividend_net_factor.unwrap_or(Decimal::ONE),
            cash_out_commission_rate: percent(d.cashout.commission),
            vat_risk_commission_rate: percent(d.cashout.vat_risk_commission),
            mrot,
            official_salary_floor: d.salary.official_default.unwrap_or(mrot),
            bid_guarantee_rate: percent(d.guarantee.bid),
            contract_guarantee_rate: percent(d.guarantee.contract),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration document (fractions, every leaf optional)
// ---------------------------------------------------------------------------

/// Nested configuration as stored by the settings screen or shipped with the
/// package. Rates are fractions (0.13). Unknown keys are ignored; a leaf that
/// does not parse as a number is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    pub core: CoreSection,
    pub taxes: TaxSection,
    pub payroll: PayrollSection,
    pub cashout: CashoutSection,
    pub salary: SalarySection,
    pub guarantee: GuaranteeSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSection {
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub default_service_months: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxSection {
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub ndfl: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub simplified: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub vat: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub vat_reduced: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub profit: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub dividend: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollSection {
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub pension: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub social: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashoutSection {
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub dividend_net_factor: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub commission: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub vat_risk_commission: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalarySection {
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub mrot: Option<Decimal>,
    /// Absent in every layer means the floor is MROT.
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub official_default: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuaranteeSection {
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,
    #[serde(deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub contract: Option<Decimal>,
}

impl ConfigDocument {
    /// Hard-coded leaves. `official_default` is deliberately left unset so the
    /// floor tracks MROT unless a document names it.
    pub fn builtin() -> Self {
        ConfigDocument {
            core: CoreSection {
                default_service_months: Some(dec!(12)),
            },
            taxes: TaxSection {
                ndfl: Some(dec!(0.13)),
                simplified: Some(dec!(0.06)),
                vat: Some(dec!(0.20)),
                vat_reduced: Some(dec!(0.07)),
                profit: Some(dec!(0.20)),
                dividend: Some(dec!(0.13)),
            },
            payroll: PayrollSection {
                pension: Some(dec!(0.22)),
                social: Some(dec!(0.029)),
            },
            cashout: CashoutSection {
                dividend_net_factor: Some(dec!(0.87)),
                commission: Some(dec!(0.15)),
                vat_risk_commission: Some(dec!(0.12)),
            },
            salary: SalarySection {
                mrot: Some(dec!(27093)),
                official_default: None,
            },
            guarantee: GuaranteeSection {
                bid: Some(dec!(0.015)),
                contract: Some(dec!(0.03)),
            },
        }
    }

    /// Field-level merge: every leaf set in `self` wins, the rest come from
    /// `lower`.
    pub fn overlay(self, lower: ConfigDocument) -> ConfigDocument {
        ConfigDocument {
            core: CoreSection {
                default_service_months: self
                    .core
                    .default_service_months
                    .or(lower.core.default_service_months),
            },
            taxes: TaxSection {
                ndfl: self.taxes.ndfl.or(lower.taxes.ndfl),
                simplified: self.taxes.simplified.or(lower.taxes.simplified),
                vat: self.taxes.vat.or(lower.taxes.vat),
                vat_reduced: self.taxes.vat_reduced.or(lower.taxes.vat_reduced),
                profit: self.taxes.profit.or(lower.taxes.profit),
                dividend: self.taxes.dividend.or(lower.taxes.dividend),
            },
            payroll: PayrollSection {
                pension: self.payroll.pension.or(lower.payroll.pension),
                social: self.payroll.social.or(lower.payroll.social),
            },
            cashout: CashoutSection {
                dividend_net_factor: self
                    .cashout
                    .dividend_net_factor
                    .or(lower.cashout.dividend_net_factor),
                commission: self.cashout.commission.or(lower.cashout.commission),
                vat_risk_commission: self
                    .cashout
                    .vat_risk_commission
                    .or(lower.cashout.vat_risk_commission),
            },
            salary: SalarySection {
                mrot: self.salary.mrot.or(lower.salary.mrot),
                official_default: self.salary.official_default.or(lower.salary.official_default),
            },
            guarantee: GuaranteeSection {
                bid: self.guarantee.bid.or(lower.guarantee.bid),
                contract: self.guarantee.contract.or(lower.guarantee.contract),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_scales_fractions_to_percent() {
        let c = Constants::fallback();
        assert_eq!(c.ndfl_rate, dec!(13));
        assert_eq!(c.simplified_rate, dec!(6));
        assert_eq!(c.vat_rate, dec!(20));
        assert_eq!(c.reduced_vat_rate, dec!(7));
        assert_eq!(c.social_rate, dec!(2.9));
        assert_eq!(c.cash_out_commission_rate, dec!(15));
        assert_eq!(c.vat_risk_commission_rate, dec!(12));
        assert_eq!(c.bid_guarantee_rate, dec!(1.5));
    }

    #[test]
    fn test_payroll_net_factor_derived_from_ndfl() {
        let c = Constants::fallback();
        assert_eq!(c.payroll_net_factor, dec!(0.87));

        let doc: ConfigDocument = serde_json::from_value(json!({"taxes": {"ndfl": 0.15}})).unwrap();
        let c = Constants::from_document(&doc);
        assert_eq!(c.ndfl_rate, dec!(15));
        assert_eq!(c.payroll_net_factor, dec!(0.85));
    }

    #[test]
    fn test_dividend_factor_is_not_scaled() {
        let doc: ConfigDocument =
            serde_json::from_value(json!({"cashout": {"dividend_net_factor": 0.85}})).unwrap();
        assert_eq!(Constants::from_document(&doc).dividend_net_factor, dec!(0.85));
    }

    #[test]
    fn test_official_floor_tracks_mrot_when_unset() {
        let doc: ConfigDocument =
            serde_json::from_value(json!({"salary": {"mrot": 30000}})).unwrap();
        let c = Constants::from_document(&doc);
        assert_eq!(c.mrot, dec!(30000));
        assert_eq!(c.official_salary_floor, dec!(30000));

        let doc: ConfigDocument =
            serde_json::from_value(json!({"salary": {"official_default": "45 000"}})).unwrap();
        let c = Constants::from_document(&doc);
        assert_eq!(c.mrot, dec!(27093));
        assert_eq!(c.official_salary_floor, dec!(45000));
    }

    #[test]
    fn test_unparseable_leaf_falls_back_individually() {
        let doc: ConfigDocument = serde_json::from_value(json!({
            "taxes": {"vat": "twenty", "profit": 0.25}
        }))
        .unwrap();
        let c = Constants::from_document(&doc);
        assert_eq!(c.vat_rate, dec!(20));
        assert_eq!(c.profit_tax_rate, dec!(25));
    }

    #[test]
    fn test_overlay_prefers_upper_layer() {
        let upper: ConfigDocument =
            serde_json::from_value(json!({"taxes": {"vat": 0.22}})).unwrap();
        let lower: ConfigDocument =
            serde_json::from_value(json!({"taxes": {"vat": 0.10, "profit": 0.25}})).unwrap();
        let merged = upper.overlay(lower);
        assert_eq!(merged.taxes.vat, Some(dec!(0.22)));
        assert_eq!(merged.taxes.profit, Some(dec!(0.25)));
        assert_eq!(merged.taxes.ndfl, None);
    }

    #[test]
    fn test_huge_leaf_saturates_instead_of_overflowing() {
        let doc: ConfigDocument = serde_json::from_value(json!({
            "taxes": {
                "vat": "70000000000000000000000000000",
                "ndfl": "-70000000000000000000000000000"
            }
        }))
        .unwrap();
        let c = Constants::from_document(&doc);
        assert_eq!(c.vat_rate, Decimal::MAX);
        assert_eq!(c.ndfl_rate, Decimal::MIN);
        assert_eq!(c.payroll_net_factor, dec!(70000000000000000000000000001));
    }
}
