use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TenderCalcError;
use crate::types::Months;
use crate::TenderCalcResult;

/// Service period of a contract. Both dates are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerm {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ContractTerm {
    pub fn new(start: NaiveDate, end: NaiveDate) -> TenderCalcResult<Self> {
        let term = ContractTerm { start, end };
        term.validate()?;
        Ok(term)
    }

    pub fn validate(&self) -> TenderCalcResult<()> {
        if self.end < self.start {
            return Err(TenderCalcError::DateError(format!(
                "Contract term ends ({}) before it starts ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }

    /// Months of service, counting a started month as a whole one. Never
    /// less than one.
    ///
    /// 2025-01-01..2025-12-31 is 12 months; 2025-01-15..2025-02-14 is 1;
    /// 2025-01-15..2025-02-20 is 2.
    pub fn service_months(&self) -> TenderCalcResult<Months> {
        self.validate()?;
        let mut months = (self.end.year() - self.start.year()) * 12
            + self.end.month() as i32
            - self.start.month() as i32;
        if self.end.day() >= self.start.day() {
            months += 1;
        }
        Ok(Decimal::from(months.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_year_is_twelve_months() {
        let term = ContractTerm::new(date(2025, 1, 1), date(2025, 12, 31)).unwrap();
        assert_eq!(term.service_months().unwrap(), dec!(12));
    }

    #[test]
    fn test_partial_month_rounds_up() {
        let exact = ContractTerm::new(date(2025, 1, 15), date(2025, 2, 14)).unwrap();
        assert_eq!(exact.service_months().unwrap(), dec!(1));
        let over = ContractTerm::new(date(2025, 1, 15), date(2025, 2, 20)).unwrap();
        assert_eq!(over.service_months().unwrap(), dec!(2));
    }

    #[test]
    fn test_single_day_is_one_month() {
        let term = ContractTerm::new(date(2025, 3, 10), date(2025, 3, 10)).unwrap();
        assert_eq!(term.service_months().unwrap(), dec!(1));
    }

    #[test]
    fn test_across_year_boundary() {
        let term = ContractTerm::new(date(2024, 11, 1), date(2025, 4, 30)).unwrap();
        assert_eq!(term.service_months().unwrap(), dec!(6));
    }

    #[test]
    fn test_reversed_term_is_rejected() {
        match ContractTerm::new(date(2025, 5, 1), date(2025, 4, 1)) {
            Err(TenderCalcError::DateError(msg)) => assert!(msg.contains("before")),
            other => panic!("Expected DateError, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_iso_dates() {
        let term: ContractTerm =
            serde_json::from_str(r#"{"start": "2025-01-01", "end": "2025-06-30"}"#).unwrap();
        assert_eq!(term.service_months().unwrap(), dec!(6));
    }
}
