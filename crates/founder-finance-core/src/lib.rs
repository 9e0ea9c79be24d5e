pub mod bands;
pub mod error;
pub mod format;
pub mod types;

#[cfg(all(feature = "runway", feature = "growth"))]
pub mod context;

#[cfg(feature = "runway")]
pub mod runway;

#[cfg(feature = "growth")]
pub mod growth;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "dilution")]
pub mod dilution;

#[cfg(feature = "tax_credit")]
pub mod tax_credit;

pub use error::FounderFinanceError;
pub use types::*;

/// Standard result type for all founder-finance operations
pub type FounderFinanceResult<T> = Result<T, FounderFinanceError>;
