//! Estate and gift transfer strategy comparison.
//!
//! Four mutually exclusive strategies are computed against shared exemption
//! and bracket tables:
//! - **A. Retain until death**: everything passes through the estate.
//! - **B. Multi-year gifting**: annual gifts leave the estate and bear gift tax.
//! - **C. Insurance offset**: scenario A with insurance as a replacement tool.
//! - **D. Trust transfer**: gifted assets deemed fully outside the estate,
//!   with no insurance add-back; without the trust election it equals B.
//!
//! Each scenario's net-to-heirs is then allocated across heirs by share.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::heirs::{allocate, normalize_heirs, Heir, HeirAllocation};
use crate::error::FamilyOfficeError;
use crate::tax_tables::{evaluate, TransferTaxTables};
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money};
use crate::FamilyOfficeResult;

/// Longest gifting programme the comparison accepts.
pub const MAX_GIFTING_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStrategy {
    RetainUntilDeath,
    MultiYearGifting,
    InsuranceOffset,
    TrustTransfer,
}

impl TransferStrategy {
    pub const ALL: [TransferStrategy; 4] = [
        TransferStrategy::RetainUntilDeath,
        TransferStrategy::MultiYearGifting,
        TransferStrategy::InsuranceOffset,
        TransferStrategy::TrustTransfer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransferStrategy::RetainUntilDeath => "A: retain until death",
            TransferStrategy::MultiYearGifting => "B: multi-year gifting",
            TransferStrategy::InsuranceOffset => "C: insurance offset",
            TransferStrategy::TrustTransfer => "D: trust transfer (illustrative)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstateComparisonInput {
    /// Value of the family company shares.
    pub equity_value: Money,
    pub personal_assets: Money,
    pub personal_liabilities: Money,
    pub estate_exemption: Money,
    /// Per-year gift amount excluded from gift tax.
    pub annual_exclusion: Money,
    /// Life insurance death benefit.
    pub insurance_sum: Money,
    /// Benefit paid directly to beneficiaries outside the estate.
    pub insurance_bypasses_estate: bool,
    pub years_of_gifting: u32,
    pub annual_gift: Money,
    /// Empty means two equal heirs.
    pub heirs: Vec<Heir>,
    /// Treat gifted assets as transferred early into trust.
    pub trust_transfer: bool,
}

impl Default for EstateComparisonInput {
    fn default() -> Self {
        Self {
            equity_value: dec!(500_000_000),
            personal_assets: dec!(50_000_000),
            personal_liabilities: Decimal::ZERO,
            estate_exemption: dec!(13_330_000),
            annual_exclusion: Decimal::ZERO,
            insurance_sum: Decimal::ZERO,
            insurance_bypasses_estate: true,
            years_of_gifting: 5,
            annual_gift: dec!(10_000_000),
            heirs: Vec::new(),
            trust_transfer: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub strategy: TransferStrategy,
    pub label: String,
    pub gross_estate: Money,
    pub taxable_estate: Money,
    pub estate_tax: Money,
    /// Zero unless the strategy gifts.
    pub gift_tax: Money,
    pub net_to_heirs: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstateComparisonOutput {
    /// One row per strategy, in A..D order.
    pub scenarios: Vec<ScenarioOutcome>,
    pub allocations: Vec<HeirAllocation>,
    /// Heirs after share normalisation.
    pub heirs: Vec<Heir>,
    pub total_gifted: Money,
    /// Strategy with the highest net-to-heirs; ties go to the earliest.
    pub best_strategy: TransferStrategy,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compare the four transfer strategies and allocate each across heirs.
pub fn compare_transfer_strategies(
    input: &EstateComparisonInput,
    tables: &TransferTaxTables,
) -> EstateComparisonOutput {
    let heirs = normalize_heirs(&input.heirs);

    let net_worth = input.equity_value + input.personal_assets - input.personal_liabilities;
    let (insurance_in_estate, insurance_direct) = if input.insurance_bypasses_estate {
        (Decimal::ZERO, input.insurance_sum)
    } else {
        (input.insurance_sum, Decimal::ZERO)
    };

    let years = Decimal::from(input.years_of_gifting);
    let taxable_gift = (input.annual_gift - input.annual_exclusion).max(Decimal::ZERO);
    let gift_tax = evaluate(taxable_gift, &tables.gift) * years;
    let total_gifted = input.annual_gift * years;
    let remaining_after_gifts = (net_worth - total_gifted).max(Decimal::ZERO);

    let outcome = |strategy: TransferStrategy,
                   gross_estate: Money,
                   scenario_gift_tax: Money,
                   net_adjustment: Money| {
        let taxable_estate = (gross_estate - input.estate_exemption).max(Decimal::ZERO);
        let estate_tax = evaluate(taxable_estate, &tables.estate);
        let net_to_heirs = gross_estate - estate_tax + net_adjustment;
        log::debug!(
            "{:?}: gross={} taxable={} estate_tax={} gift_tax={} net={}",
            strategy,
            gross_estate,
            taxable_estate,
            estate_tax,
            scenario_gift_tax,
            net_to_heirs
        );
        ScenarioOutcome {
            strategy,
            label: strategy.label().to_string(),
            gross_estate,
            taxable_estate,
            estate_tax,
            gift_tax: scenario_gift_tax,
            net_to_heirs,
        }
    };

    let retain = outcome(
        TransferStrategy::RetainUntilDeath,
        net_worth + insurance_in_estate,
        Decimal::ZERO,
        insurance_direct,
    );
    let gifting_gross = remaining_after_gifts + insurance_in_estate;
    let gifting = outcome(
        TransferStrategy::MultiYearGifting,
        gifting_gross,
        gift_tax,
        total_gifted + insurance_direct - gift_tax,
    );
    let insurance = outcome(
        TransferStrategy::InsuranceOffset,
        net_worth + insurance_in_estate,
        Decimal::ZERO,
        insurance_direct,
    );
    let trust_gross = if input.trust_transfer {
        remaining_after_gifts
    } else {
        gifting_gross
    };
    let trust = outcome(
        TransferStrategy::TrustTransfer,
        trust_gross,
        gift_tax,
        total_gifted - gift_tax + insurance_direct,
    );

    let scenarios = vec![retain, gifting, insurance, trust];
    let allocations = allocate(&scenarios, &heirs);
    let best_strategy = best_of(&scenarios);

    EstateComparisonOutput {
        scenarios,
        allocations,
        heirs,
        total_gifted,
        best_strategy,
    }
}

fn best_of(scenarios: &[ScenarioOutcome]) -> TransferStrategy {
    let mut best = &scenarios[0];
    for s in &scenarios[1..] {
        if s.net_to_heirs > best.net_to_heirs {
            best = s;
        }
    }
    best.strategy
}

/// Validate the input, run the comparison and wrap it with metadata.
pub fn run_estate_comparison(
    input: &EstateComparisonInput,
    tables: &TransferTaxTables,
) -> FamilyOfficeResult<ComputationOutput<EstateComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let output = compare_transfer_strategies(input, tables);

    let gross_assets = input.equity_value + input.personal_assets;
    if input.years_of_gifting > 0 && output.total_gifted > gross_assets {
        warnings.push(format!(
            "Total gifts of {} exceed the estate; the gifting scenarios floor the \
             remaining estate at zero.",
            output.total_gifted
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Estate and gift strategy comparison: retain, multi-year gifting, insurance \
         offset, and trust transfer, with per-heir allocation",
        &serde_json::json!({
            "estate_exemption": input.estate_exemption.to_string(),
            "annual_exclusion": input.annual_exclusion.to_string(),
            "insurance_bypasses_estate": input.insurance_bypasses_estate,
            "years_of_gifting": input.years_of_gifting,
            "annual_gift": input.annual_gift.to_string(),
            "trust_transfer": input.trust_transfer,
            "num_heirs": output.heirs.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_input(
    input: &EstateComparisonInput,
    warnings: &mut Vec<String>,
) -> FamilyOfficeResult<()> {
    for (field, value) in [
        ("equity_value", input.equity_value),
        ("personal_assets", input.personal_assets),
        ("personal_liabilities", input.personal_liabilities),
        ("estate_exemption", input.estate_exemption),
        ("annual_exclusion", input.annual_exclusion),
        ("insurance_sum", input.insurance_sum),
        ("annual_gift", input.annual_gift),
    ] {
        require_non_negative(field, value)?;
    }

    if input.years_of_gifting > MAX_GIFTING_YEARS {
        return Err(FamilyOfficeError::InvalidInput {
            field: "years_of_gifting".into(),
            reason: format!("must be at most {MAX_GIFTING_YEARS}"),
        });
    }

    // Every intermediate amount is bounded by the sum of these magnitudes.
    let total_gifted = input
        .annual_gift
        .checked_mul(Decimal::from(input.years_of_gifting))
        .ok_or_else(|| FamilyOfficeError::InvalidInput {
            field: "annual_gift".into(),
            reason: "total gifts over the horizon are too large to represent".into(),
        })?;
    [
        input.personal_assets,
        input.personal_liabilities,
        input.estate_exemption,
        input.insurance_sum,
        total_gifted,
    ]
    .iter()
    .try_fold(input.equity_value, |acc, v| acc.checked_add(*v))
    .ok_or_else(|| FamilyOfficeError::InvalidInput {
        field: "equity_value".into(),
        reason: "combined amounts are too large to represent".into(),
    })?;

    if input.heirs.is_empty() {
        warnings.push("No heirs supplied; allocating to two equal heirs A and B.".into());
    } else {
        if input.heirs.iter().any(|h| h.share < Decimal::ZERO) {
            return Err(FamilyOfficeError::InvalidInput {
                field: "heirs.share".into(),
                reason: "cannot be negative".into(),
            });
        }
        if input.heirs.iter().all(|h| h.share.is_zero()) {
            return Err(FamilyOfficeError::InvalidInput {
                field: "heirs.share".into(),
                reason: "at least one share must be positive".into(),
            });
        }
    }

    if input.personal_liabilities > input.equity_value + input.personal_assets {
        warnings.push("Liabilities exceed assets; the retained estate is negative.".into());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
