//! Tender paperwork that sits beside the scheme engine: bank guarantees,
//! contract terms and the price-list presets rows are created from.

pub mod guarantee;
pub mod price_list;
pub mod term;

pub use guarantee::{guarantee_cost, GuaranteeKind};
pub use price_list::{default_extra_price_list, default_price_list, ExtraPreset, PriceListEntry};
pub use term::ContractTerm;
