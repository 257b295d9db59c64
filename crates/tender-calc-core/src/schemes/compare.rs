use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::time::Instant;

use crate::aggregation::BaseTotals;
use crate::config::Constants;
use crate::error::TenderCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::TenderCalcResult;

use super::catalog::{code_key, same_code, SchemeDescriptor};
use super::engine::{calculate_scheme, SchemeResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of the comparison matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RevenueTotal,
    RevenueBase,
    FotReal,
    FotOfficial,
    Ndfl,
    PensionContributions,
    SocialContributions,
    PayrollTaxes,
    VatOut,
    VatIn,
    VatDeduction,
    SimplifiedTax,
    ProfitTax,
    NetSalary,
    GreyAmount,
    CashOutCommission,
    DividendTax,
    TotalExpenses,
    ProfitBeforeExtraction,
    ProfitNet,
    Profitability,
}

impl Metric {
    /// Every metric in waterfall order.
    pub const ALL: [Metric; 21] = [
        Metric::RevenueTotal,
        Metric::RevenueBase,
        Metric::FotReal,
        Metric::FotOfficial,
        Metric::Ndfl,
        Metric::PensionContributions,
        Metric::SocialContributions,
        Metric::PayrollTaxes,
        Metric::VatOut,
        Metric::VatIn,
        Metric::VatDeduction,
        Metric::SimplifiedTax,
        Metric::ProfitTax,
        Metric::NetSalary,
        Metric::GreyAmount,
        Metric::CashOutCommission,
        Metric::DividendTax,
        Metric::TotalExpenses,
        Metric::ProfitBeforeExtraction,
        Metric::ProfitNet,
        Metric::Profitability,
    ];

    /// The collapsed-card view: what a salesperson looks at first.
    pub const HEADLINE: [Metric; 5] = [
        Metric::RevenueTotal,
        Metric::FotReal,
        Metric::TotalExpenses,
        Metric::ProfitNet,
        Metric::Profitability,
    ];

    /// Stable machine name, matching the `SchemeResult` field.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::RevenueTotal => "revenue_total",
            Metric::RevenueBase => "revenue_base",
            Metric::FotReal => "fot_real",
            Metric::FotOfficial => "fot_official",
            Metric::Ndfl => "ndfl",
            Metric::PensionContributions => "pension_contributions",
            Metric::SocialContributions => "social_contributions",
            Metric::PayrollTaxes => "payroll_taxes",
            Metric::VatOut => "vat_out",
            Metric::VatIn => "vat_in",
            Metric::VatDeduction => "vat_deduction",
            Metric::SimplifiedTax => "simplified_tax",
            Metric::ProfitTax => "profit_tax",
            Metric::NetSalary => "net_salary",
            Metric::GreyAmount => "grey_amount",
            Metric::CashOutCommission => "cash_out_commission",
            Metric::DividendTax => "dividend_tax",
            Metric::TotalExpenses => "total_expenses",
            Metric::ProfitBeforeExtraction => "profit_before_extraction",
            Metric::ProfitNet => "profit_net",
            Metric::Profitability => "profitability",
        }
    }

    /// Row label as shown in the comparison table.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::RevenueTotal => "Выручка",
            Metric::RevenueBase => "Выручка без НДС",
            Metric::FotReal => "ФОТ реальный",
            Metric::FotOfficial => "ФОТ официальный",
            Metric::Ndfl => "НДФЛ",
            Metric::PensionContributions => "ПФР",
            Metric::SocialContributions => "ФСС",
            Metric::PayrollTaxes => "Налоги на ФОТ",
            Metric::VatOut => "НДС исходящий",
            Metric::VatIn => "НДС входящий",
            Metric::VatDeduction => "НДС (УСН)",
            Metric::SimplifiedTax => "Налог УСН",
            Metric::ProfitTax => "Налог на прибыль",
            Metric::NetSalary => "Зарплата на руки (офиц.)",
            Metric::GreyAmount => "Серая часть",
            Metric::CashOutCommission => "Комиссия за обнал",
            Metric::DividendTax => "Налог на дивиденды",
            Metric::TotalExpenses => "Итого расходы",
            Metric::ProfitBeforeExtraction => "Прибыль до вывода",
            Metric::ProfitNet => "Чистая прибыль",
            Metric::Profitability => "Рентабельность",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Whether the value is a fraction rather than an amount of money.
    pub fn is_ratio(&self) -> bool {
        matches!(self, Metric::Profitability)
    }

    /// Read the metric off a result. Never recomputes anything.
    pub fn value(&self, r: &SchemeResult) -> Decimal {
        match self {
            Metric::RevenueTotal => r.revenue_total,
            Metric::RevenueBase => r.revenue_base,
            Metric::FotReal => r.fot_real,
            Metric::FotOfficial => r.fot_official,
            Metric::Ndfl => r.ndfl,
            Metric::PensionContributions => r.pension_contributions,
            Metric::SocialContributions => r.social_contributions,
            Metric::PayrollTaxes => r.payroll_taxes,
            Metric::VatOut => r.vat_out,
            Metric::VatIn => r.vat_in,
            Metric::VatDeduction => r.vat_deduction,
            Metric::SimplifiedTax => r.simplified_tax,
            Metric::ProfitTax => r.profit_tax,
            Metric::NetSalary => r.net_salary,
            Metric::GreyAmount => r.grey_amount,
            Metric::CashOutCommission => r.cash_out_commission,
            Metric::DividendTax => r.dividend_tax,
            Metric::TotalExpenses => r.total_expenses,
            Metric::ProfitBeforeExtraction => r.profit_before_extraction,
            Metric::ProfitNet => r.profit_net,
            Metric::Profitability => r.profitability,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Headline (collapsed) or full (expanded) matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Headline,
    Full,
}

impl ViewMode {
    pub fn metrics(&self) -> &'static [Metric] {
        match self {
            ViewMode::Headline => &Metric::HEADLINE,
            ViewMode::Full => &Metric::ALL,
        }
    }
}

/// Coarse profitability grade used to colour the scheme cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitabilityBand {
    /// Above 15 %
    High,
    /// Above 10 %
    Moderate,
    Low,
}

impl ProfitabilityBand {
    pub fn from_profitability(profitability: Rate) -> Self {
        if profitability > dec!(0.15) {
            ProfitabilityBand::High
        } else if profitability > dec!(0.10) {
            ProfitabilityBand::Moderate
        } else {
            ProfitabilityBand::Low
        }
    }
}

/// A descriptor paired with its result, in catalog order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeEvaluation {
    pub descriptor: SchemeDescriptor,
    pub result: SchemeResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: Metric,
    pub label: String,
    /// One value per scheme column, in column order
    pub values: Vec<Decimal>,
}

/// Metric rows × scheme columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    pub view: ViewMode,
    pub scheme_codes: Vec<String>,
    pub scheme_names: Vec<String>,
    pub rows: Vec<MetricRow>,
}

impl ComparisonMatrix {
    /// Look up one cell by metric name and scheme code (case-insensitive).
    pub fn cell(&self, metric: &str, scheme_code: &str) -> Option<Decimal> {
        let column = self
            .scheme_codes
            .iter()
            .position(|c| same_code(c, scheme_code))?;
        self.rows
            .iter()
            .find(|row| row.metric.name() == metric)
            .and_then(|row| row.values.get(column).copied())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedScheme {
    /// 1-based
    pub rank: usize,
    pub code: String,
    pub name: String,
    pub profit_net: Money,
    pub profitability: Rate,
    pub band: ProfitabilityBand,
}

/// Everything the comparison screen needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeComparison {
    pub base_totals: BaseTotals,
    pub matrix: ComparisonMatrix,
    pub ranking: Vec<RankedScheme>,
    /// Code of the top-ranked scheme
    pub best_scheme: Option<String>,
    pub evaluations: Vec<SchemeEvaluation>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lay evaluations out as a matrix, columns in input order.
pub fn build_matrix(evaluations: &[SchemeEvaluation], view: ViewMode) -> ComparisonMatrix {
    let rows = view
        .metrics()
        .iter()
        .map(|metric| MetricRow {
            metric: *metric,
            label: metric.label().to_string(),
            values: evaluations.iter().map(|e| metric.value(&e.result)).collect(),
        })
        .collect();

    ComparisonMatrix {
        view,
        scheme_codes: evaluations.iter().map(|e| e.descriptor.code.clone()).collect(),
        scheme_names: evaluations.iter().map(|e| e.descriptor.name.clone()).collect(),
        rows,
    }
}

/// Rank by profitability, highest first. Ties keep input order.
pub fn rank_by_profitability(evaluations: &[SchemeEvaluation]) -> Vec<RankedScheme> {
    let mut order: Vec<&SchemeEvaluation> = evaluations.iter().collect();
    // sort_by is stable
    order.sort_by(|a, b| b.result.profitability.cmp(&a.result.profitability));

    order
        .into_iter()
        .enumerate()
        .map(|(i, e)| RankedScheme {
            rank: i + 1,
            code: e.descriptor.code.clone(),
            name: e.descriptor.name.clone(),
            profit_net: e.result.profit_net,
            profitability: e.result.profitability,
            band: ProfitabilityBand::from_profitability(e.result.profitability),
        })
        .collect()
}

/// Evaluate every scheme on the same totals and build the comparison.
pub fn compare_schemes(
    base: &BaseTotals,
    constants: &Constants,
    schemes: &[SchemeDescriptor],
    view: ViewMode,
) -> TenderCalcResult<ComputationOutput<SchemeComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validate ---
    if schemes.is_empty() {
        return Err(TenderCalcError::InvalidInput {
            field: "schemes".into(),
            reason: "At least one scheme must be supplied".into(),
        });
    }
    let mut seen = HashSet::new();
    for s in schemes {
        if !seen.insert(code_key(&s.code)) {
            return Err(TenderCalcError::InvalidInput {
                field: "schemes".into(),
                reason: format!("Duplicate scheme code {}", s.code),
            });
        }
    }

    // --- Evaluate ---
    let evaluations = schemes
        .iter()
        .map(|descriptor| {
            calculate_scheme(base, constants, descriptor).map(|result| SchemeEvaluation {
                descriptor: descriptor.clone(),
                result,
            })
        })
        .collect::<TenderCalcResult<Vec<_>>>()?;

    // --- Warnings ---
    if base.total_contract_gross.is_zero() {
        warnings.push("Contract revenue is zero; every scheme reports zero".into());
    }
    if base.total_salary_by_avg_rate_month.is_zero() && !base.total_contract_gross.is_zero() {
        warnings.push("No shift wages entered; payroll is zero in every scheme".into());
    }
    for e in &evaluations {
        if e.result.profit_net < Decimal::ZERO {
            warnings.push(format!(
                "{} is loss-making: net profit {}",
                e.descriptor.code,
                e.result.profit_net.round_dp(2)
            ));
        }
    }

    let matrix = build_matrix(&evaluations, view);
    let ranking = rank_by_profitability(&evaluations);
    let best_scheme = ranking.first().map(|r| r.code.clone());

    let output = SchemeComparison {
        base_totals: base.clone(),
        matrix,
        ranking,
        best_scheme,
        evaluations,
    };

    let assumptions = json!({
        "service_months": base.service_months.to_string(),
        "vat_rate_pct": constants.vat_rate.to_string(),
        "reduced_vat_rate_pct": constants.reduced_vat_rate.to_string(),
        "simplified_rate_pct": constants.simplified_rate.to_string(),
        "profit_tax_rate_pct": constants.profit_tax_rate.to_string(),
        "official_salary_floor": constants.official_salary_floor.to_string(),
        "dividend_net_factor": constants.dividend_net_factor.to_string(),
        "schemes": schemes.iter().map(|s| s.code.as_str()).collect::<Vec<_>>(),
    });

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Multi-scheme tax waterfall comparison",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
