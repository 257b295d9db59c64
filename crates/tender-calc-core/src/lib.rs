pub mod error;
pub mod format;
pub mod numeric;
pub mod types;

pub mod aggregation;
pub mod config;
pub mod schemes;
pub mod session;

#[cfg(feature = "tender")]
pub mod tender;

pub use error::TenderCalcError;
pub use types::*;

/// Standard result type for all tender-calc operations
pub type TenderCalcResult<T> = Result<T, TenderCalcError>;
