use serde::{Deserialize, Serialize};

/// How VAT relates to the contract price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// General regime: VAT is embedded in the price and extracted from it
    InsideRevenue,
    /// Simplified regime: no VAT charged, a reduced-rate extraction is used
    /// only as the tax-base deduction
    OutsideRevenue,
}

impl std::fmt::Display for VatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VatMode::InsideRevenue => write!(f, "VAT inside revenue"),
            VatMode::OutsideRevenue => write!(f, "No VAT (simplified)"),
        }
    }
}

/// Static description of one structuring scheme. Pure data; the engine
/// branches on the three flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDescriptor {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub vat_mode: VatMode,
    /// Official payroll at the salary floor, the remainder paid informally
    pub grey_salary: bool,
    /// Informal cash routed through a sole proprietor for a commission
    pub sole_proprietor_cashout: bool,
}

impl SchemeDescriptor {
    pub fn new(
        code: &str,
        name: &str,
        vat_mode: VatMode,
        grey_salary: bool,
        sole_proprietor_cashout: bool,
    ) -> Self {
        SchemeDescriptor {
            code: code.to_string(),
            name: name.to_string(),
            description: String::new(),
            vat_mode,
            grey_salary,
            sole_proprietor_cashout,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Fully official: no informal payroll and no cash-out channel.
    pub fn is_white(&self) -> bool {
        !self.grey_salary && !self.sole_proprietor_cashout
    }
}

/// The five schemes evaluated side by side, in display order.
pub fn standard_schemes() -> Vec<SchemeDescriptor> {
    vec![
        SchemeDescriptor::new("BELUSN", "Бел УСН", VatMode::OutsideRevenue, false, false)
            .with_description("Fully official payroll on the simplified regime (6% of income)"),
        SchemeDescriptor::new("SERUSN", "Сер УСН", VatMode::OutsideRevenue, true, false)
            .with_description(
                "Simplified regime, official salary at the floor, remainder via dividends",
            ),
        SchemeDescriptor::new("BELNDS", "Бел НДС", VatMode::InsideRevenue, false, false)
            .with_description(
                "Fully official payroll on the general regime with VAT and profit tax",
            ),
        SchemeDescriptor::new("SERNDS", "Сер НДС", VatMode::InsideRevenue, true, false)
            .with_description(
                "General regime, floor salary, input VAT offset for a risk commission",
            ),
        SchemeDescriptor::new("IPNDS", "ИП НДС", VatMode::InsideRevenue, true, true)
            .with_description(
                "General regime, floor salary, informal cash through a sole proprietor",
            ),
    ]
}

/// Whether two scheme codes name the same scheme: surrounding whitespace is
/// ignored and letters compare case-insensitively, Cyrillic included.
pub fn same_code(a: &str, b: &str) -> bool {
    code_key(a) == code_key(b)
}

/// Canonical form used for every code comparison.
pub(crate) fn code_key(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Case-insensitive lookup in the standard catalog.
pub fn find_scheme(code: &str) -> Option<SchemeDescriptor> {
    standard_schemes().into_iter().find(|s| same_code(&s.code, code))
}
