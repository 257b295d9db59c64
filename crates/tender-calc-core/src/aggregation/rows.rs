use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::numeric::{lenient_amount, lenient_text, non_negative, or_default_if_zero, parse_number};
use crate::types::{Money, Months};

use super::totals::DEFAULT_SHIFT_HOURS;

// ---------------------------------------------------------------------------
// Staffing
// ---------------------------------------------------------------------------

/// One guard post line. Numeric cells are normalized on ingestion and in the
/// builder methods: anything unparseable or negative becomes zero.
///
/// `rate_hour` is what the customer is billed; `shift_rate` per
/// `shift_hours` is what the guard is actually paid. The two are independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingRow {
    /// Preset the row was created from, if any
    #[serde(
        alias = "priceId",
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_id: Option<u32>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub address: String,
    /// Headcount on this post; zero means 1
    #[serde(deserialize_with = "lenient_amount")]
    pub count: Decimal,
    #[serde(alias = "hoursMonth", deserialize_with = "lenient_amount")]
    pub hours_month: Decimal,
    #[serde(alias = "rateHour", deserialize_with = "lenient_amount")]
    pub rate_hour: Money,
    /// Per-row duration; zero means the whole contract
    #[serde(deserialize_with = "lenient_amount")]
    pub months: Months,
    /// Zero means a 12-hour shift
    #[serde(alias = "shiftHours", deserialize_with = "lenient_amount")]
    pub shift_hours: Decimal,
    /// Wage paid per shift
    #[serde(alias = "shiftRate", deserialize_with = "lenient_amount")]
    pub shift_rate: Money,
}

impl StaffingRow {
    /// A single-guard post billed at `rate_hour` for `hours_month`.
    pub fn new(hours_month: Decimal, rate_hour: Money) -> Self {
        StaffingRow {
            count: Decimal::ONE,
            hours_month: non_negative(hours_month),
            rate_hour: non_negative(rate_hour),
            ..Default::default()
        }
    }

    pub fn with_count(mut self, count: Decimal) -> Self {
        self.count = non_negative(count);
        self
    }

    pub fn with_months(mut self, months: Months) -> Self {
        self.months = non_negative(months);
        self
    }

    pub fn with_shift(mut self, shift_hours: Decimal, shift_rate: Money) -> Self {
        self.shift_hours = non_negative(shift_hours);
        self.shift_rate = non_negative(shift_rate);
        self
    }

    pub fn effective_count(&self) -> Decimal {
        or_default_if_zero(self.count, Decimal::ONE)
    }

    pub fn effective_months(&self, service_months: Months) -> Months {
        or_default_if_zero(self.months, service_months)
    }

    pub fn effective_shift_hours(&self) -> Decimal {
        or_default_if_zero(self.shift_hours, DEFAULT_SHIFT_HOURS)
    }

    // The products below can exceed `Decimal` range for absurd cells, so
    // they return `None` on overflow instead of panicking.

    /// Staffed hours per month across the whole headcount
    pub fn hours_total(&self) -> Option<Decimal> {
        self.hours_month.checked_mul(self.effective_count())
    }

    /// Billed revenue for one month
    pub fn monthly_revenue(&self) -> Option<Money> {
        self.rate_hour
            .checked_mul(self.hours_month)?
            .checked_mul(self.effective_count())
    }

    /// Billed revenue over this row's own duration
    pub fn contract_revenue(&self, service_months: Months) -> Option<Money> {
        self.monthly_revenue()?
            .checked_mul(self.effective_months(service_months))
    }

    /// Wages actually paid per month: `shift_rate × shifts × count`, with
    /// `shifts = hours_month / shift_hours`. Multiplied before dividing so
    /// whole-number inputs stay exact.
    pub fn monthly_wage(&self) -> Option<Money> {
        self.shift_rate
            .checked_mul(self.hours_month)?
            .checked_mul(self.effective_count())?
            .checked_div(self.effective_shift_hours())
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value).and_then(|d| d.trunc().to_u32()))
}

// ---------------------------------------------------------------------------
// Ancillary expenses
// ---------------------------------------------------------------------------

/// Whether an expense repeats every month of the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Once,
    #[default]
    Monthly,
}

impl Periodicity {
    /// Accepts the API names and the popup's Russian labels. Anything else is
    /// monthly, the row editor's default.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "once" | "one_off" | "разово" | "разовый" => Periodicity::Once,
            _ => Periodicity::Monthly,
        }
    }
}

impl<'de> Deserialize<'de> for Periodicity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Periodicity::from_label(&s),
            _ => Periodicity::Monthly,
        })
    }
}

/// One ancillary cost line (consumables, fuel, communications, equipment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseRow {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(alias = "price", alias = "unitPrice", deserialize_with = "lenient_amount")]
    pub unit_price: Money,
    /// Zero means 1
    #[serde(deserialize_with = "lenient_amount")]
    pub quantity: Decimal,
    #[serde(alias = "type")]
    pub periodicity: Periodicity,
}

impl ExpenseRow {
    pub fn monthly(name: impl Into<String>, unit_price: Money, quantity: Decimal) -> Self {
        ExpenseRow {
            name: name.into(),
            unit_price: non_negative(unit_price),
            quantity: non_negative(quantity),
            periodicity: Periodicity::Monthly,
        }
    }

    pub fn once(name: impl Into<String>, unit_price: Money, quantity: Decimal) -> Self {
        ExpenseRow {
            name: name.into(),
            unit_price: non_negative(unit_price),
            quantity: non_negative(quantity),
            periodicity: Periodicity::Once,
        }
    }

    pub fn effective_quantity(&self) -> Decimal {
        or_default_if_zero(self.quantity, Decimal::ONE)
    }

    /// `None` when the product overflows
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.effective_quantity())
    }
}
