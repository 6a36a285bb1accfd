pub mod error;
pub mod tax_tables;
pub mod types;

#[cfg(feature = "dividend_policy")]
pub mod dividend_policy;

#[cfg(feature = "succession")]
pub mod succession;

#[cfg(feature = "estate_tax")]
pub mod estate_tax;

pub use error::FamilyOfficeError;
pub use types::*;

/// Standard result type for all family-office operations
pub type FamilyOfficeResult<T> = Result<T, FamilyOfficeError>;
