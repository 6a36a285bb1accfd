//! Single-jurisdiction estate tax with household deductions.
//!
//! Total deductions are the exemption, the funeral expense allowance and
//! per-person deductions for spouse, children, parents, disabled persons and
//! other dependents. The taxable base is what remains of the estate after
//! those deductions, and the tax is rounded to whole units.
//!
//! Amounts are in the units of [`EstateTaxConstants`] (ten-thousands by
//! default).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::tax_tables::{evaluate, EstateTaxConstants};
use crate::error::FamilyOfficeError;
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money};
use crate::FamilyOfficeResult;

/// Most children a household may declare.
pub const MAX_CHILDREN: u32 = 10;
/// Most siblings or grandparents a household may declare.
pub const MAX_OTHER_DEPENDENTS: u32 = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Household composition claimed against the estate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Household {
    pub spouse: bool,
    pub children: u32,
    pub parents: u32,
    /// Severely disabled persons among the household.
    pub disabled: u32,
    /// Dependent siblings or grandparents.
    pub other_dependents: u32,
}

impl Household {
    /// Counts limited to what the household may claim: at most
    /// `max_parents` parents, and no more disabled persons than spouse,
    /// children and parents together.
    pub fn eligible(&self, max_parents: u32) -> Household {
        let parents = self.parents.min(max_parents);
        let disabled_ceiling = u32::from(self.spouse)
            .saturating_add(self.children)
            .saturating_add(parents);
        Household {
            parents,
            disabled: self.disabled.min(disabled_ceiling),
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    pub exemption: Money,
    pub funeral_expense: Money,
    pub spouse: Money,
    pub children: Money,
    pub parents: Money,
    pub disabled: Money,
    pub other_dependents: Money,
}

impl DeductionBreakdown {
    pub fn total(&self) -> Money {
        self.exemption
            + self.funeral_expense
            + self.spouse
            + self.children
            + self.parents
            + self.disabled
            + self.other_dependents
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstateTaxAssessment {
    pub taxable_base: Money,
    /// Rounded to whole units, half to even.
    pub tax_due: Money,
    /// Exemption plus every deduction line.
    pub total_deductions: Money,
    pub breakdown: DeductionBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstateTaxInput {
    pub total_assets: Money,
    #[serde(default)]
    pub household: Household,
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Anything that can assess estate tax for a household.
///
/// Implemented by the plain calculator and by caller-owned caches in front
/// of it. Implementations must return identical results for identical input.
pub trait EstateTaxAssessor {
    fn constants(&self) -> &EstateTaxConstants;

    fn assess(&self, total_assets: Money, household: &Household) -> EstateTaxAssessment;
}

#[derive(Debug, Clone, Default)]
pub struct EstateTaxCalculator {
    constants: EstateTaxConstants,
}

impl EstateTaxCalculator {
    pub fn new(constants: EstateTaxConstants) -> Self {
        Self { constants }
    }

    /// Deduction lines for the eligible part of `household`.
    pub fn deductions(&self, household: &Household) -> DeductionBreakdown {
        let c = &self.constants;
        let h = household.eligible(c.max_parents);
        DeductionBreakdown {
            exemption: c.exemption,
            funeral_expense: c.funeral_expense,
            spouse: if h.spouse {
                c.spouse_deduction
            } else {
                Decimal::ZERO
            },
            children: c.child_deduction * Decimal::from(h.children),
            parents: c.parent_deduction * Decimal::from(h.parents),
            disabled: c.disabled_deduction * Decimal::from(h.disabled),
            other_dependents: c.other_dependent_deduction * Decimal::from(h.other_dependents),
        }
    }
}

impl EstateTaxAssessor for EstateTaxCalculator {
    fn constants(&self) -> &EstateTaxConstants {
        &self.constants
    }

    fn assess(&self, total_assets: Money, household: &Household) -> EstateTaxAssessment {
        let breakdown = self.deductions(household);
        let total_deductions = breakdown.total();

        if total_assets < total_deductions {
            return EstateTaxAssessment {
                taxable_base: Decimal::ZERO,
                tax_due: Decimal::ZERO,
                total_deductions,
                breakdown,
            };
        }

        let taxable_base = total_assets - total_deductions;
        let tax_due = round_whole(evaluate(taxable_base, &self.constants.brackets));

        EstateTaxAssessment {
            taxable_base,
            tax_due,
            total_deductions,
            breakdown,
        }
    }
}

/// Round to whole currency units, ties to even.
pub(crate) fn round_whole(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Validate the input, assess the estate and wrap it with metadata.
pub fn run_estate_tax(
    input: &EstateTaxInput,
    calculator: &EstateTaxCalculator,
) -> FamilyOfficeResult<ComputationOutput<EstateTaxAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("total_assets", input.total_assets)?;
    validate_household(&input.household)?;
    household_warnings(&input.household, calculator.constants(), &mut warnings);

    let output = calculator.assess(input.total_assets, &input.household);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Estate tax: exemption, funeral and household deductions, then progressive \
         brackets on the remaining base, rounded to whole units",
        &serde_json::json!({
            "total_assets": input.total_assets.to_string(),
            "household": input.household,
            "exemption": calculator.constants().exemption.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Reject household counts beyond what may be declared at all.
pub(crate) fn validate_household(household: &Household) -> FamilyOfficeResult<()> {
    if household.children > MAX_CHILDREN {
        return Err(FamilyOfficeError::InvalidInput {
            field: "household.children".into(),
            reason: format!("at most {MAX_CHILDREN} children may be declared"),
        });
    }
    if household.other_dependents > MAX_OTHER_DEPENDENTS {
        return Err(FamilyOfficeError::InvalidInput {
            field: "household.other_dependents".into(),
            reason: format!("at most {MAX_OTHER_DEPENDENTS} other dependents may be declared"),
        });
    }
    Ok(())
}

/// Report counts that exceed what the household may claim.
pub(crate) fn household_warnings(
    household: &Household,
    constants: &EstateTaxConstants,
    warnings: &mut Vec<String>,
) {
    let eligible = household.eligible(constants.max_parents);
    if eligible.parents < household.parents {
        log::warn!(
            "parents clamped from {} to {}",
            household.parents,
            eligible.parents
        );
        warnings.push(format!(
            "Only {} parents may be claimed; {} supplied.",
            eligible.parents, household.parents
        ));
    }
    if eligible.disabled < household.disabled {
        log::warn!(
            "disabled persons clamped from {} to {}",
            household.disabled,
            eligible.disabled
        );
        warnings.push(format!(
            "Disabled persons limited to spouse, children and parents ({}); {} supplied.",
            eligible.disabled, household.disabled
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn calculator() -> EstateTaxCalculator {
        EstateTaxCalculator::default()
    }

    #[test]
    fn test_no_household_first_bracket() {
        let out = calculator().assess(dec!(5000), &Household::default());
        assert_eq!(out.total_deductions, dec!(1471));
        assert_eq!(out.taxable_base, dec!(3529));
        // 352.9 rounds to 353
        assert_eq!(out.tax_due, dec!(353));
    }

    #[test]
    fn test_below_deductions_no_tax() {
        let out = calculator().assess(dec!(1400), &Household::default());
        assert_eq!(out.taxable_base, Decimal::ZERO);
        assert_eq!(out.tax_due, Decimal::ZERO);
        assert_eq!(out.total_deductions, dec!(1471));
    }

    #[test]
    fn test_spouse_and_children_reach_top_bracket() {
        let household = Household {
            spouse: true,
            children: 2,
            ..Household::default()
        };
        let out = calculator().assess(dec!(20000), &household);
        assert_eq!(out.total_deductions, dec!(2136));
        assert_eq!(out.taxable_base, dec!(17864));
        // 562.1 + 843.15 + 1324.4 = 2729.65
        assert_eq!(out.tax_due, dec!(2730));
    }

    #[test]
    fn test_tax_rounds_half_to_even() {
        // taxable 3525 -> 352.5 -> 352
        let out = calculator().assess(dec!(4996), &Household::default());
        assert_eq!(out.taxable_base, dec!(3525));
        assert_eq!(out.tax_due, dec!(352));
    }

    #[test]
    fn test_parents_and_disabled_clamped() {
        let household = Household {
            spouse: false,
            children: 1,
            parents: 4,
            disabled: 9,
            other_dependents: 0,
        };
        let eligible = household.eligible(2);
        assert_eq!(eligible.parents, 2);
        assert_eq!(eligible.disabled, 3);

        let d = calculator().deductions(&household);
        assert_eq!(d.parents, dec!(276));
        assert_eq!(d.disabled, dec!(2079));
    }

    #[test]
    fn test_run_reports_clamp_warnings() {
        let input = EstateTaxInput {
            total_assets: dec!(8000),
            household: Household {
                parents: 3,
                ..Household::default()
            },
        };
        let result = run_estate_tax(&input, &calculator()).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("parents"));
    }

    #[test]
    fn test_run_rejects_negative_assets() {
        let input = EstateTaxInput {
            total_assets: dec!(-1),
            household: Household::default(),
        };
        assert!(run_estate_tax(&input, &calculator()).is_err());
    }

    #[test]
    fn test_eligible_saturates_on_huge_counts() {
        let household = Household {
            spouse: true,
            children: u32::MAX,
            parents: 2,
            disabled: 7,
            other_dependents: 0,
        };
        let eligible = household.eligible(2);
        assert_eq!(eligible.disabled, 7);
        assert_eq!(eligible.children, u32::MAX);
    }

    #[test]
    fn test_run_rejects_oversized_household() {
        let huge = EstateTaxInput {
            total_assets: dec!(5000),
            household: Household {
                spouse: true,
                children: u32::MAX,
                disabled: 1,
                ..Household::default()
            },
        };
        match run_estate_tax(&huge, &calculator()) {
            Err(FamilyOfficeError::InvalidInput { field, .. }) => {
                assert_eq!(field, "household.children")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let eleven = EstateTaxInput {
            total_assets: dec!(5000),
            household: Household {
                children: MAX_CHILDREN + 1,
                ..Household::default()
            },
        };
        assert!(run_estate_tax(&eleven, &calculator()).is_err());

        let dependents = EstateTaxInput {
            total_assets: dec!(5000),
            household: Household {
                other_dependents: MAX_OTHER_DEPENDENTS + 1,
                ..Household::default()
            },
        };
        assert!(run_estate_tax(&dependents, &calculator()).is_err());
    }

    #[test]
    fn test_run_accepts_household_at_limits() {
        let input = EstateTaxInput {
            total_assets: dec!(5000),
            household: Household {
                children: MAX_CHILDREN,
                other_dependents: MAX_OTHER_DEPENDENTS,
                ..Household::default()
            },
        };
        assert!(run_estate_tax(&input, &calculator()).is_ok());
    }
}
