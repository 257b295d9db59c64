use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::aggregation::{ExpenseRow, StaffingRow};
use crate::types::{Money, Months};

/// A post type the salesperson can add with one click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListEntry {
    pub id: u32,
    pub name: String,
    pub region: String,
    pub armed: bool,
    /// Duty pattern, e.g. "1/3" (one day on, three off)
    pub shift: String,
    pub hours_month: Decimal,
    pub rate_hour: Money,
}

impl PriceListEntry {
    /// A fresh single-guard row billed at this entry's rate.
    pub fn to_row(&self, months: Months) -> StaffingRow {
        StaffingRow {
            price_id: Some(self.id),
            description: self.name.clone(),
            ..StaffingRow::new(self.hours_month, self.rate_hour).with_months(months)
        }
    }
}

/// Ancillary cost preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPreset {
    pub id: u32,
    pub name: String,
    pub amount: Money,
}

impl ExtraPreset {
    pub fn to_row(&self) -> ExpenseRow {
        ExpenseRow::monthly(self.name.clone(), self.amount, Decimal::ONE)
    }
}

fn entry(
    id: u32,
    name: &str,
    armed: bool,
    shift: &str,
    hours: Decimal,
    rate: Money,
) -> PriceListEntry {
    PriceListEntry {
        id,
        name: name.to_string(),
        region: "Москва".to_string(),
        armed,
        shift: shift.to_string(),
        hours_month: hours,
        rate_hour: rate,
    }
}

/// Built-in post presets.
pub fn default_price_list() -> Vec<PriceListEntry> {
    vec![
        entry(1, "Охранник 4 разряд (сутки)", false, "1/3", dec!(720), dec!(240)),
        entry(2, "Охранник 6 разряд (сутки)", true, "1/3", dec!(720), dec!(280)),
        entry(3, "Охранник 4 разряд (день)", false, "5/2", dec!(176), dec!(260)),
        entry(4, "Старший смены", false, "1/1", dec!(360), dec!(300)),
    ]
}

/// Built-in monthly expense presets.
pub fn default_extra_price_list() -> Vec<ExtraPreset> {
    [
        (1, "Расходные материалы", dec!(5000)),
        (2, "ГСМ", dec!(10000)),
        (3, "Связь", dec!(1000)),
    ]
    .into_iter()
    .map(|(id, name, amount)| ExtraPreset {
        id,
        name: name.to_string(),
        amount,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Periodicity;

    #[test]
    fn test_default_price_list_ids_unique() {
        let list = default_price_list();
        assert_eq!(list.len(), 4);
        let mut ids: Vec<u32> = list.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(list.iter().filter(|e| e.armed).count() == 1);
    }

    #[test]
    fn test_entry_to_row() {
        let row = default_price_list()[1].to_row(dec!(12));
        assert_eq!(row.price_id, Some(2));
        assert_eq!(row.hours_month, dec!(720));
        assert_eq!(row.rate_hour, dec!(280));
        assert_eq!(row.count, Decimal::ONE);
        assert_eq!(row.months, dec!(12));
        assert_eq!(row.monthly_revenue(), Some(dec!(201600)));
    }

    #[test]
    fn test_extra_presets_are_monthly() {
        let rows: Vec<ExpenseRow> = default_extra_price_list().iter().map(|p| p.to_row()).collect();
        assert!(rows.iter().all(|r| r.periodicity == Periodicity::Monthly));
        let total: Decimal = rows.iter().filter_map(|r| r.line_total()).sum();
        assert_eq!(total, dec!(16000));
    }
}
