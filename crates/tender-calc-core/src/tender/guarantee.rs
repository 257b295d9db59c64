use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::Constants;
use crate::error::TenderCalcError;
use crate::numeric::pct;
use crate::types::{Money, Percent};
use crate::TenderCalcResult;

/// Which bank guarantee the tender requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeKind {
    /// Secures the bid during the auction
    #[default]
    Bid,
    /// Secures performance of the signed contract
    Contract,
}

impl GuaranteeKind {
    pub fn rate(&self, constants: &Constants) -> Percent {
        match self {
            GuaranteeKind::Bid => constants.bid_guarantee_rate,
            GuaranteeKind::Contract => constants.contract_guarantee_rate,
        }
    }
}

impl FromStr for GuaranteeKind {
    type Err = TenderCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bid" | "application" | "заявка" => Ok(GuaranteeKind::Bid),
            "contract" | "performance" | "контракт" => Ok(GuaranteeKind::Contract),
            other => Err(TenderCalcError::InvalidInput {
                field: "kind".into(),
                reason: format!("Unknown guarantee kind '{other}' (expected bid or contract)"),
            }),
        }
    }
}

/// Bank fee for issuing a guarantee on `amount`, rounded to whole roubles.
/// Negative amounts cost nothing.
pub fn guarantee_cost(
    amount: Money,
    kind: GuaranteeKind,
    constants: &Constants,
) -> TenderCalcResult<Money> {
    let amount = amount.max(Decimal::ZERO);
    let fee = amount
        .checked_mul(pct(kind.rate(constants)))
        .ok_or_else(|| TenderCalcError::InvalidInput {
            field: "amount".into(),
            reason: format!("Fee on {amount} exceeds the representable range"),
        })?;
    Ok(fee.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cost(amount: Money, kind: GuaranteeKind) -> Money {
        guarantee_cost(amount, kind, &Constants::fallback()).unwrap()
    }

    #[test]
    fn test_bid_and_contract_rates() {
        assert_eq!(cost(dec!(1000000), GuaranteeKind::Bid), dec!(15000));
        assert_eq!(cost(dec!(1000000), GuaranteeKind::Contract), dec!(30000));
    }

    #[test]
    fn test_rounds_to_whole_roubles() {
        // 1.5% of 4 680 030 = 70 200.45
        assert_eq!(cost(dec!(4680030), GuaranteeKind::Bid), dec!(70200));
        // 1.5% of 100 = 1.5, half rounds up
        assert_eq!(cost(dec!(100), GuaranteeKind::Bid), dec!(2));
    }

    #[test]
    fn test_negative_amount_is_free() {
        assert_eq!(cost(dec!(-500), GuaranteeKind::Contract), Decimal::ZERO);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Bid".parse::<GuaranteeKind>().unwrap(), GuaranteeKind::Bid);
        assert_eq!("контракт".parse::<GuaranteeKind>().unwrap(), GuaranteeKind::Contract);
        assert!("lease".parse::<GuaranteeKind>().is_err());
    }

    #[test]
    fn test_overflowing_fee_is_invalid_input() {
        let mut c = Constants::fallback();
        c.contract_guarantee_rate = dec!(70000000000000000000000000000);
        assert!(matches!(
            guarantee_cost(dec!(1000000), GuaranteeKind::Contract, &c),
            Err(TenderCalcError::InvalidInput { .. })
        ));
    }
}
