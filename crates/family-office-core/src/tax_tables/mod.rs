//! Tax tables and the rate constants that configure every engine.
//!
//! `TaxTables` is the configuration aggregate: each section falls back to the
//! built-in presets when omitted, so a partial YAML/JSON override is enough.

pub mod brackets;
pub mod presets;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{require_non_negative, require_unit_rate, Money, Rate};
use crate::FamilyOfficeResult;

pub use brackets::{evaluate, evaluate_checked, Bracket, BracketTable};

// ---------------------------------------------------------------------------
// Shareholder-level dividend taxation
// ---------------------------------------------------------------------------

/// Rules for taxing dividends received by resident individuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareholderTaxRules {
    /// Flat rate of the separate-taxation mode.
    pub flat_rate: Rate,
    /// Dividend credit rate of the integrated mode.
    pub credit_rate: Rate,
    /// Ceiling on the dividend credit.
    pub credit_cap: Money,
    /// Consolidated income tax table.
    pub income_brackets: BracketTable,
}

impl Default for ShareholderTaxRules {
    fn default() -> Self {
        Self {
            flat_rate: dec!(0.28),
            credit_rate: dec!(0.085),
            credit_cap: dec!(80_000),
            income_brackets: presets::individual_income_brackets(),
        }
    }
}

// ---------------------------------------------------------------------------
// Estate and gift transfer tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferTaxTables {
    pub estate: BracketTable,
    pub gift: BracketTable,
}

impl Default for TransferTaxTables {
    fn default() -> Self {
        Self {
            estate: presets::estate_brackets(),
            gift: presets::gift_brackets(),
        }
    }
}

// ---------------------------------------------------------------------------
// Single-jurisdiction estate tax constants
// ---------------------------------------------------------------------------

/// Deduction constants and brackets of the single-jurisdiction estate tax
/// calculator. Amounts are in ten-thousand units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstateTaxConstants {
    pub exemption: Money,
    pub funeral_expense: Money,
    pub spouse_deduction: Money,
    pub child_deduction: Money,
    pub parent_deduction: Money,
    pub disabled_deduction: Money,
    pub other_dependent_deduction: Money,
    /// Maximum number of parents eligible for the parent deduction.
    pub max_parents: u32,
    /// Annual gift exemption used by the gifting what-if.
    pub annual_gift_exemption: Money,
    pub brackets: BracketTable,
}

impl Default for EstateTaxConstants {
    fn default() -> Self {
        Self {
            exemption: dec!(1333),
            funeral_expense: dec!(138),
            spouse_deduction: dec!(553),
            child_deduction: dec!(56),
            parent_deduction: dec!(138),
            disabled_deduction: dec!(693),
            other_dependent_deduction: dec!(56),
            max_parents: 2,
            annual_gift_exemption: dec!(244),
            brackets: presets::estate_tax_calculator_brackets(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxTables {
    pub shareholder: ShareholderTaxRules,
    pub transfer: TransferTaxTables,
    pub estate: EstateTaxConstants,
}

impl TaxTables {
    /// Check the scalar rates and amounts. Bracket tables are already
    /// validated when they are constructed or deserialised.
    pub fn validate(&self) -> FamilyOfficeResult<()> {
        let sh = &self.shareholder;
        require_unit_rate("shareholder.flat_rate", sh.flat_rate)?;
        require_unit_rate("shareholder.credit_rate", sh.credit_rate)?;
        require_non_negative("shareholder.credit_cap", sh.credit_cap)?;

        let e = &self.estate;
        for (field, value) in [
            ("estate.exemption", e.exemption),
            ("estate.funeral_expense", e.funeral_expense),
            ("estate.spouse_deduction", e.spouse_deduction),
            ("estate.child_deduction", e.child_deduction),
            ("estate.parent_deduction", e.parent_deduction),
            ("estate.disabled_deduction", e.disabled_deduction),
            ("estate.other_dependent_deduction", e.other_dependent_deduction),
            ("estate.annual_gift_exemption", e.annual_gift_exemption),
        ] {
            require_non_negative(field, value)?;
        }

        Ok(())
    }
}
