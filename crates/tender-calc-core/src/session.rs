use serde::{Deserialize, Serialize};

use crate::aggregation::{compute_base_totals, BaseTotals, ExpenseRow, StaffingRow};
use crate::config::Constants;
use crate::error::TenderCalcError;
use crate::numeric::lenient_amount;
use crate::schemes::{
    calculate_scheme, compare_schemes, SchemeComparison, SchemeDescriptor, SchemeEvaluation,
    ViewMode,
};
use crate::types::{ComputationOutput, Months};
use crate::TenderCalcResult;

#[cfg(feature = "tender")]
use crate::tender::{ContractTerm, PriceListEntry};

/// Caller-owned working state for one tender: the row sets and the contract
/// duration. Nothing derived is stored; totals are recomputed on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationSession {
    /// Zero means "derive from the term, else the configured default"
    #[serde(alias = "serviceMonths", deserialize_with = "lenient_amount")]
    pub service_months: Months,
    #[cfg(feature = "tender")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<ContractTerm>,
    #[serde(alias = "rows")]
    pub staffing: Vec<StaffingRow>,
    #[serde(alias = "extraRows")]
    pub expenses: Vec<ExpenseRow>,
}

impl CalculationSession {
    pub fn new(service_months: Months) -> Self {
        CalculationSession {
            service_months,
            ..Default::default()
        }
    }

    // --- Staffing rows ---

    /// Append a row and return its index.
    pub fn add_row(&mut self, row: StaffingRow) -> usize {
        self.staffing.push(row);
        self.staffing.len() - 1
    }

    pub fn update_row(&mut self, index: usize, row: StaffingRow) -> TenderCalcResult<()> {
        let len = self.staffing.len();
        let slot = self
            .staffing
            .get_mut(index)
            .ok_or_else(|| out_of_range("staffing", index, len))?;
        *slot = row;
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> TenderCalcResult<StaffingRow> {
        if index >= self.staffing.len() {
            return Err(out_of_range("staffing", index, self.staffing.len()));
        }
        Ok(self.staffing.remove(index))
    }

    /// Add a single-guard row from a price-list preset. `price_id` of `None`
    /// picks the first entry.
    #[cfg(feature = "tender")]
    pub fn add_row_from_price(
        &mut self,
        price_list: &[PriceListEntry],
        price_id: Option<u32>,
    ) -> TenderCalcResult<usize> {
        let entry = match price_id {
            None => price_list.first().ok_or_else(|| {
                TenderCalcError::ContractViolation("price list is empty".into())
            })?,
            Some(id) => price_list.iter().find(|e| e.id == id).ok_or_else(|| {
                TenderCalcError::InvalidInput {
                    field: "price_id".into(),
                    reason: format!("No price-list entry with id {id}"),
                }
            })?,
        };
        // Zero months: the row follows the contract duration
        Ok(self.add_row(entry.to_row(Months::ZERO)))
    }

    // --- Expense rows ---

    pub fn add_expense(&mut self, row: ExpenseRow) -> usize {
        self.expenses.push(row);
        self.expenses.len() - 1
    }

    pub fn update_expense(&mut self, index: usize, row: ExpenseRow) -> TenderCalcResult<()> {
        let len = self.expenses.len();
        let slot = self
            .expenses
            .get_mut(index)
            .ok_or_else(|| out_of_range("expenses", index, len))?;
        *slot = row;
        Ok(())
    }

    pub fn remove_expense(&mut self, index: usize) -> TenderCalcResult<ExpenseRow> {
        if index >= self.expenses.len() {
            return Err(out_of_range("expenses", index, self.expenses.len()));
        }
        Ok(self.expenses.remove(index))
    }

    // --- Evaluation ---

    /// Explicit duration, else the term, else the configured default.
    pub fn effective_service_months(&self, constants: &Constants) -> TenderCalcResult<Months> {
        let from_term = self.term_months()?;
        if !self.service_months.is_zero() {
            return Ok(self.service_months);
        }
        Ok(from_term.unwrap_or(constants.default_service_months))
    }

    #[cfg(feature = "tender")]
    fn term_months(&self) -> TenderCalcResult<Option<Months>> {
        self.term.as_ref().map(ContractTerm::service_months).transpose()
    }

    #[cfg(not(feature = "tender"))]
    fn term_months(&self) -> TenderCalcResult<Option<Months>> {
        Ok(None)
    }

    pub fn base_totals(&self, constants: &Constants) -> TenderCalcResult<BaseTotals> {
        let months = self.effective_service_months(constants)?;
        compute_base_totals(&self.staffing, &self.expenses, months)
    }

    /// Evaluate each scheme on the current rows, in the given order.
    pub fn evaluate(
        &self,
        constants: &Constants,
        schemes: &[SchemeDescriptor],
    ) -> TenderCalcResult<Vec<SchemeEvaluation>> {
        let base = self.base_totals(constants)?;
        schemes
            .iter()
            .map(|descriptor| {
                calculate_scheme(&base, constants, descriptor).map(|result| SchemeEvaluation {
                    descriptor: descriptor.clone(),
                    result,
                })
            })
            .collect()
    }

    pub fn compare(
        &self,
        constants: &Constants,
        schemes: &[SchemeDescriptor],
        view: ViewMode,
    ) -> TenderCalcResult<ComputationOutput<SchemeComparison>> {
        let base = self.base_totals(constants)?;
        compare_schemes(&base, constants, schemes, view)
    }
}

fn out_of_range(table: &str, index: usize, len: usize) -> TenderCalcError {
    TenderCalcError::ContractViolation(format!(
        "{table} row index {index} out of range (have {len} rows)"
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
