//! Shareholder-level tax on distributed dividends.
//!
//! Three taxpayer kinds are supported:
//! - **Corporate resident**: dividends are exempt (participation exemption).
//! - **Nonresident**: flat withholding at a treaty rate.
//! - **Individual resident**: either a flat separate rate, or progressive
//!   integration with other income less a capped dividend credit.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::tax_tables::{evaluate, ShareholderTaxRules};
use crate::types::{
    require_non_negative, require_unit_rate, with_metadata, ComputationOutput, Money, Rate,
};
use crate::FamilyOfficeResult;

/// Statutory ceiling on treaty withholding.
pub const MAX_TREATY_WITHHOLDING: Rate = dec!(0.30);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareholderKind {
    #[default]
    IndividualResident,
    CorporateResident,
    Nonresident,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndividualTaxMode {
    /// Fixed rate on the dividend alone.
    #[default]
    FlatSeparate,
    /// Dividend added to other income and taxed progressively, less credit.
    ProgressiveIntegrated,
}

/// Who receives the dividend and how they elect to be taxed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareholderProfile {
    pub kind: ShareholderKind,
    /// Only consulted for individual residents.
    pub mode: IndividualTaxMode,
    /// Other ordinary income, for progressive integration.
    pub other_income: Money,
    /// Only consulted for nonresidents.
    pub nonresident_withholding_rate: Rate,
}

impl Default for ShareholderProfile {
    fn default() -> Self {
        Self {
            kind: ShareholderKind::IndividualResident,
            mode: IndividualTaxMode::FlatSeparate,
            other_income: Decimal::ZERO,
            nonresident_withholding_rate: dec!(0.21),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareholderTaxInput {
    pub amount: Money,
    #[serde(default)]
    pub shareholder: ShareholderProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareholderTaxOutput {
    pub dividend: Money,
    /// Progressive tax caused by the dividend before credit (integrated mode).
    pub incremental_tax: Money,
    /// Dividend credit applied (integrated mode).
    pub dividend_credit: Money,
    pub shareholder_tax: Money,
    pub effective_rate: Rate,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Shareholder-level tax on a distributed `amount`. Never negative.
pub fn resolve_shareholder_tax(
    amount: Money,
    profile: &ShareholderProfile,
    rules: &ShareholderTaxRules,
) -> Money {
    if amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match profile.kind {
        ShareholderKind::CorporateResident => Decimal::ZERO,
        ShareholderKind::Nonresident => amount * profile.nonresident_withholding_rate,
        ShareholderKind::IndividualResident => match profile.mode {
            IndividualTaxMode::FlatSeparate => amount * rules.flat_rate,
            IndividualTaxMode::ProgressiveIntegrated => {
                let (incremental, credit) =
                    integrated_components(amount, profile.other_income, rules);
                (incremental - credit).max(Decimal::ZERO)
            }
        },
    }
}

/// Incremental progressive tax from stacking the dividend on other income,
/// and the capped credit that offsets it.
fn integrated_components(
    amount: Money,
    other_income: Money,
    rules: &ShareholderTaxRules,
) -> (Money, Money) {
    let with_dividend = evaluate(other_income + amount, &rules.income_brackets);
    let without_dividend = evaluate(other_income, &rules.income_brackets);
    let incremental = (with_dividend - without_dividend).max(Decimal::ZERO);
    let credit = (amount * rules.credit_rate).min(rules.credit_cap);
    (incremental, credit)
}

/// Validated shareholder tax with a breakdown of the integrated computation.
pub fn run_shareholder_tax(
    input: &ShareholderTaxInput,
    rules: &ShareholderTaxRules,
) -> FamilyOfficeResult<ComputationOutput<ShareholderTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("amount", input.amount)?;
    validate_profile(&input.shareholder, &mut warnings)?;

    let shareholder_tax = resolve_shareholder_tax(input.amount, &input.shareholder, rules);
    let profile = &input.shareholder;
    let (incremental_tax, dividend_credit) = match (profile.kind, profile.mode) {
        (ShareholderKind::IndividualResident, IndividualTaxMode::ProgressiveIntegrated)
            if input.amount > Decimal::ZERO =>
        {
            integrated_components(input.amount, profile.other_income, rules)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    };
    let effective_rate = if input.amount > Decimal::ZERO {
        shareholder_tax / input.amount
    } else {
        Decimal::ZERO
    };

    let output = ShareholderTaxOutput {
        dividend: input.amount,
        incremental_tax,
        dividend_credit,
        shareholder_tax,
        effective_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Shareholder dividend tax: participation exemption, treaty withholding, \
         or individual flat/progressive-integrated taxation with capped credit",
        &serde_json::json!({
            "kind": input.shareholder.kind,
            "mode": input.shareholder.mode,
            "flat_rate": rules.flat_rate.to_string(),
            "credit_rate": rules.credit_rate.to_string(),
            "credit_cap": rules.credit_cap.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Shared by every envelope that carries a shareholder profile.
pub(crate) fn validate_profile(
    profile: &ShareholderProfile,
    warnings: &mut Vec<String>,
) -> FamilyOfficeResult<()> {
    require_non_negative("shareholder.other_income", profile.other_income)?;
    require_unit_rate(
        "shareholder.nonresident_withholding_rate",
        profile.nonresident_withholding_rate,
    )?;
    if profile.kind == ShareholderKind::Nonresident
        && profile.nonresident_withholding_rate > MAX_TREATY_WITHHOLDING
    {
        warnings.push(format!(
            "Nonresident withholding rate {} exceeds the usual treaty ceiling of {}.",
            profile.nonresident_withholding_rate, MAX_TREATY_WITHHOLDING
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
