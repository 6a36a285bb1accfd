//! Heir lists, share normalisation and per-heir allocation of outcomes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::scenarios::{ScenarioOutcome, TransferStrategy};
use crate::types::{Money, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heir {
    pub name: String,
    /// Relative share. Shares are normalised by their sum before use.
    pub share: Rate,
}

impl Heir {
    pub fn new(name: impl Into<String>, share: Rate) -> Self {
        Self {
            name: name.into(),
            share,
        }
    }
}

/// One heir's slice of one scenario's net outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeirAllocation {
    pub strategy: TransferStrategy,
    pub heir: String,
    pub share: Rate,
    pub amount: Money,
}

/// Two equal heirs, used when none are supplied.
pub fn default_heirs() -> Vec<Heir> {
    vec![Heir::new("A", dec!(0.5)), Heir::new("B", dec!(0.5))]
}

/// Scale shares so they sum to one. An empty list becomes the default pair.
/// A list whose shares sum to zero is returned unscaled.
pub fn normalize_heirs(heirs: &[Heir]) -> Vec<Heir> {
    if heirs.is_empty() {
        return default_heirs();
    }

    let total: Rate = heirs.iter().map(|h| h.share).sum();
    let divisor = if total.is_zero() { Decimal::ONE } else { total };

    heirs
        .iter()
        .map(|h| Heir::new(h.name.clone(), h.share / divisor))
        .collect()
}

/// Cross product of scenarios and heirs, in scenario-major order.
pub fn allocate(scenarios: &[ScenarioOutcome], heirs: &[Heir]) -> Vec<HeirAllocation> {
    scenarios
        .iter()
        .flat_map(|scenario| {
            heirs.iter().map(move |heir| HeirAllocation {
                strategy: scenario.strategy,
                heir: heir.name.clone(),
                share: heir.share,
                amount: scenario.net_to_heirs * heir.share,
            })
        })
        .collect()
}
