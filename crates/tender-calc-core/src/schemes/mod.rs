//! Tax/payroll structuring schemes.
//!
//! Five schemes ship as data ([`catalog`]); one formula set ([`engine`])
//! evaluates any of them by branching on the descriptor flags, and
//! [`compare`] lays results side by side.

pub mod catalog;
pub mod compare;
pub mod engine;

pub use catalog::{find_scheme, standard_schemes, SchemeDescriptor, VatMode};
pub use compare::{
    build_matrix, compare_schemes, rank_by_profitability, ComparisonMatrix, Metric, MetricRow,
    ProfitabilityBand, RankedScheme, SchemeComparison, SchemeEvaluation, ViewMode,
};
pub use engine::{calculate_scheme, SchemeResult, MAX_BASE_AMOUNT};
