use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TenderCalcError;
use crate::numeric::safe_div;
use crate::types::{Money, Months};
use crate::TenderCalcResult;

use super::rows::{ExpenseRow, Periodicity, StaffingRow};

/// Shift length assumed when a row leaves `shift_hours` empty.
pub const DEFAULT_SHIFT_HOURS: Decimal = dec!(12);

/// Derived snapshot of a row set. Never cached: recompute after any edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseTotals {
    /// Headcount across all posts
    pub people: Decimal,
    pub total_hours_month: Decimal,
    /// `total_month_gross / total_hours_month`, zero without hours
    pub avg_rate_hour: Money,
    /// Billed revenue for one month, staffing plus monthly expenses
    pub total_month_gross: Money,
    /// Billed revenue over the contract, per-row durations respected
    pub total_contract_gross: Money,
    /// Wages actually paid per month, independent of billed rates
    pub total_salary_by_avg_rate_month: Money,
    pub extra_monthly: Money,
    pub extra_once: Money,
    pub service_months: Months,
}

/// Reduce staffing and expense rows into [`BaseTotals`].
///
/// Staffing revenue is `rate_hour × hours_month × count`, projected over
/// each row's own `months` (or `service_months` when unset). Monthly expenses
/// are projected over `service_months`; one-off expenses are added once.
///
/// Fails with `InvalidInput` naming the offending row when an amount leaves
/// the `Decimal` range.
pub fn compute_base_totals(
    staffing: &[StaffingRow],
    expenses: &[ExpenseRow],
    service_months: Months,
) -> TenderCalcResult<BaseTotals> {
    let service_months = service_months.max(Decimal::ZERO);

    let mut people = Decimal::ZERO;
    let mut total_hours_month = Decimal::ZERO;
    let mut staffing_month = Decimal::ZERO;
    let mut staffing_contract = Decimal::ZERO;
    let mut wages_month = Decimal::ZERO;

    for (i, row) in staffing.iter().enumerate() {
        let field = || format!("staffing[{i}]");
        people = checked_sum(people, Some(row.effective_count()), field)?;
        total_hours_month = checked_sum(total_hours_month, row.hours_total(), field)?;
        staffing_month = checked_sum(staffing_month, row.monthly_revenue(), field)?;
        staffing_contract = checked_sum(
            staffing_contract,
            row.contract_revenue(service_months),
            field,
        )?;
        wages_month = checked_sum(wages_month, row.monthly_wage(), field)?;
    }

    let mut extra_monthly = Decimal::ZERO;
    let mut extra_once = Decimal::ZERO;
    for (i, row) in expenses.iter().enumerate() {
        let field = || format!("expenses[{i}]");
        match row.periodicity {
            Periodicity::Monthly => {
                extra_monthly = checked_sum(extra_monthly, row.line_total(), field)?
            }
            Periodicity::Once => extra_once = checked_sum(extra_once, row.line_total(), field)?,
        }
    }

    let totals = || "totals".to_string();
    let total_month_gross = checked_sum(staffing_month, Some(extra_monthly), totals)?;
    let total_contract_gross = checked_sum(
        staffing_contract,
        extra_monthly.checked_mul(service_months),
        totals,
    )?;
    let total_contract_gross = checked_sum(total_contract_gross, Some(extra_once), totals)?;

    Ok(BaseTotals {
        people,
        total_hours_month,
        avg_rate_hour: safe_div(total_month_gross, total_hours_month),
        total_month_gross,
        total_contract_gross,
        total_salary_by_avg_rate_month: wages_month,
        extra_monthly,
        extra_once,
        service_months,
    })
}

/// `acc + term`, where a `None` term is an overflow upstream.
fn checked_sum(
    acc: Decimal,
    term: Option<Decimal>,
    field: impl Fn() -> String,
) -> TenderCalcResult<Decimal> {
    term.and_then(|t| acc.checked_add(t))
        .ok_or_else(|| TenderCalcError::InvalidInput {
            field: field(),
            reason: "Amount exceeds the representable range".into(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
