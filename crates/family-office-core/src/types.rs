use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Reject a negative monetary amount.
pub(crate) fn require_non_negative(field: &str, value: Money) -> crate::FamilyOfficeResult<()> {
    if value < Decimal::ZERO {
        return Err(crate::FamilyOfficeError::InvalidInput {
            field: field.into(),
            reason: "cannot be negative".into(),
        });
    }
    Ok(())
}

/// Reject a rate outside [0, 1].
pub(crate) fn require_unit_rate(field: &str, value: Rate) -> crate::FamilyOfficeResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(crate::FamilyOfficeError::InvalidInput {
            field: field.into(),
            reason: "must be between 0 and 1".into(),
        });
    }
    Ok(())
}
