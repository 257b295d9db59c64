pub mod catalog;
pub mod compare;
pub mod config;
pub mod guarantee;
pub mod totals;
