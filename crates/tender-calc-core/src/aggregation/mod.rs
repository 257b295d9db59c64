//! Row sets and their reduction into base totals.

pub mod rows;
pub mod totals;

pub use rows::{ExpenseRow, Periodicity, StaffingRow};
pub use totals::{compute_base_totals, BaseTotals, DEFAULT_SHIFT_HOURS};
