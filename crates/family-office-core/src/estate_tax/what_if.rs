//! Baseline-versus-planned estate tax what-ifs.
//!
//! - **Insurance**: the premium leaves the estate and a claim is paid out.
//!   The claim is either received outside the estate or, in the stricter
//!   variant, added back and taxed with it.
//! - **Gifting**: the annual gift exemption is used for a number of years,
//!   shrinking the estate by the total gifted.
//! - **Planning cases**: one gift and one policy combined five ways, each
//!   row measured against doing nothing.
//!
//! All are pure in their inputs and generic over [`EstateTaxAssessor`], so a
//! caller can share one memoised assessor across them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::calculator::{
    household_warnings, round_whole, validate_household, EstateTaxAssessor, Household,
};
use crate::error::FamilyOfficeError;
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money};
use crate::FamilyOfficeResult;

/// Upper bound on the gifting horizon.
pub const MAX_GIFT_YEARS: u32 = 100;
/// Claim paid per unit of premium when the caller gives no claim.
pub const DEFAULT_CLAIM_MULTIPLE: Decimal = dec!(1.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome with no planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub total_assets: Money,
    pub estate_tax: Money,
    pub net_to_family: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedOutcome {
    pub estate_tax: Money,
    pub net_to_family: Money,
    /// Planned net minus baseline net.
    pub effect: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceStrategyInput {
    pub total_assets: Money,
    #[serde(default)]
    pub household: Household,
    /// Premium paid out of the estate.
    pub premium: Money,
    /// Death benefit paid on the policy.
    pub claim_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceStrategyOutput {
    pub baseline: Baseline,
    /// Claim received outside the estate.
    pub claim_outside_estate: PlannedOutcome,
    /// Claim added back to the taxable estate.
    pub claim_taxed_in_estate: PlannedOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftStrategyInput {
    pub total_assets: Money,
    #[serde(default)]
    pub household: Household,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftedOutcome {
    /// Estate left after gifting.
    pub total_assets: Money,
    pub estate_tax: Money,
    pub total_gift: Money,
    pub net_to_family: Money,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftStrategyOutput {
    pub baseline: Baseline,
    pub after_gifting: GiftedOutcome,
    pub effect: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningCase {
    NoPlan,
    Gift,
    Insurance,
    GiftAndInsurance,
    /// Gift plus insurance with the claim added back to the estate.
    GiftAndInsuranceClaimTaxed,
}

impl PlanningCase {
    pub const ALL: [PlanningCase; 5] = [
        PlanningCase::NoPlan,
        PlanningCase::Gift,
        PlanningCase::Insurance,
        PlanningCase::GiftAndInsurance,
        PlanningCase::GiftAndInsuranceClaimTaxed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlanningCase::NoPlan => "no planning",
            PlanningCase::Gift => "gift",
            PlanningCase::Insurance => "insurance",
            PlanningCase::GiftAndInsurance => "gift + insurance",
            PlanningCase::GiftAndInsuranceClaimTaxed => "gift + insurance (claim taxed)",
        }
    }
}

/// Omitted amounts are derived from the no-plan estate tax; see
/// [`resolve_case_terms`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningCasesInput {
    pub total_assets: Money,
    #[serde(default)]
    pub household: Household,
    #[serde(default)]
    pub gift_amount: Option<Money>,
    #[serde(default)]
    pub premium: Option<Money>,
    #[serde(default)]
    pub claim_amount: Option<Money>,
}

/// Gift and policy applied across every planning case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseTerms {
    pub gift_amount: Money,
    pub premium: Money,
    pub claim_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub case: PlanningCase,
    pub label: String,
    /// Estate left to assess after the case's transfers.
    pub estate: Money,
    pub estate_tax: Money,
    pub net_to_family: Money,
    /// Net to family minus the no-plan net.
    pub planning_benefit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningCasesOutput {
    pub terms: CaseTerms,
    /// One row per case, no-plan first.
    pub cases: Vec<CaseOutcome>,
    /// Case with the highest net to family; ties go to the earliest.
    pub best_case: PlanningCase,
}

// ---------------------------------------------------------------------------
// Simulators
// ---------------------------------------------------------------------------

fn baseline<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    total_assets: Money,
    household: &Household,
) -> Baseline {
    let estate_tax = assessor.assess(total_assets, household).tax_due;
    Baseline {
        total_assets,
        estate_tax,
        net_to_family: total_assets - estate_tax,
    }
}

/// Compare no planning against buying a policy with the premium.
pub fn simulate_insurance_strategy<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    input: &InsuranceStrategyInput,
) -> InsuranceStrategyOutput {
    let base = baseline(assessor, input.total_assets, &input.household);

    let after_premium = input.total_assets - input.premium;
    let tax_outside = assessor.assess(after_premium, &input.household).tax_due;
    let net_outside = round_whole(after_premium - tax_outside + input.claim_amount);

    let with_claim = after_premium + input.claim_amount;
    let tax_inside = assessor.assess(with_claim, &input.household).tax_due;
    let net_inside = round_whole(with_claim - tax_inside);

    InsuranceStrategyOutput {
        claim_outside_estate: PlannedOutcome {
            estate_tax: tax_outside,
            net_to_family: net_outside,
            effect: net_outside - base.net_to_family,
        },
        claim_taxed_in_estate: PlannedOutcome {
            estate_tax: tax_inside,
            net_to_family: net_inside,
            effect: net_inside - base.net_to_family,
        },
        baseline: base,
    }
}

/// Compare no planning against gifting the annual exemption for `years`.
pub fn simulate_gift_strategy<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    input: &GiftStrategyInput,
) -> GiftStrategyOutput {
    let base = baseline(assessor, input.total_assets, &input.household);

    let total_gift = assessor.constants().annual_gift_exemption * Decimal::from(input.years);
    let remaining = (input.total_assets - total_gift).max(Decimal::ZERO);
    let estate_tax = assessor.assess(remaining, &input.household).tax_due;
    let net_to_family = round_whole(remaining - estate_tax + total_gift);

    GiftStrategyOutput {
        effect: net_to_family - base.net_to_family,
        after_gifting: GiftedOutcome {
            total_assets: remaining,
            estate_tax,
            total_gift,
            net_to_family,
            years: input.years,
        },
        baseline: base,
    }
}

/// Premium covering the no-plan estate tax, rounded up to a multiple of ten
/// and never more than the estate.
pub fn default_premium(tax_due: Money, total_assets: Money) -> Money {
    ((tax_due / dec!(10)).ceil() * dec!(10)).min(total_assets)
}

/// Fill in omitted terms.
///
/// - premium: [`default_premium`] of the no-plan tax
/// - claim: premium × [`DEFAULT_CLAIM_MULTIPLE`], truncated to whole units
/// - gift: one year's annual exemption if what is left after the premium
///   covers it, otherwise nothing
pub fn resolve_case_terms<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    input: &PlanningCasesInput,
) -> CaseTerms {
    let premium = input.premium.unwrap_or_else(|| {
        let tax_due = assessor.assess(input.total_assets, &input.household).tax_due;
        default_premium(tax_due, input.total_assets)
    });
    let claim_amount = input
        .claim_amount
        .unwrap_or_else(|| (premium * DEFAULT_CLAIM_MULTIPLE).trunc());
    let gift_amount = input.gift_amount.unwrap_or_else(|| {
        let exemption = assessor.constants().annual_gift_exemption;
        if input.total_assets - premium >= exemption {
            exemption
        } else {
            Decimal::ZERO
        }
    });
    CaseTerms {
        gift_amount,
        premium,
        claim_amount,
    }
}

/// Run the five planning cases for one household with fixed terms.
pub fn simulate_planning_cases<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    total_assets: Money,
    household: &Household,
    terms: &CaseTerms,
) -> PlanningCasesOutput {
    let CaseTerms {
        gift_amount: gift,
        premium,
        claim_amount: claim,
    } = *terms;

    // (estate assessed, amounts received outside the estate)
    let shape = |case: PlanningCase| -> (Money, Money) {
        match case {
            PlanningCase::NoPlan => (total_assets, Decimal::ZERO),
            PlanningCase::Gift => (total_assets - gift, gift),
            PlanningCase::Insurance => (total_assets - premium, claim),
            PlanningCase::GiftAndInsurance => (total_assets - gift - premium, gift + claim),
            PlanningCase::GiftAndInsuranceClaimTaxed => {
                (total_assets - gift - premium + claim, gift)
            }
        }
    };

    let mut cases: Vec<CaseOutcome> = Vec::with_capacity(PlanningCase::ALL.len());
    let mut baseline_net = Decimal::ZERO;
    for case in PlanningCase::ALL {
        let (estate, outside) = shape(case);
        let estate_tax = assessor.assess(estate, household).tax_due;
        let net_to_family = estate - estate_tax + outside;
        if case == PlanningCase::NoPlan {
            baseline_net = net_to_family;
        }
        cases.push(CaseOutcome {
            case,
            label: case.label().to_string(),
            estate,
            estate_tax,
            net_to_family,
            planning_benefit: net_to_family - baseline_net,
        });
    }

    let mut best = &cases[0];
    for c in &cases[1..] {
        if c.net_to_family > best.net_to_family {
            best = c;
        }
    }
    let best_case = best.case;

    PlanningCasesOutput {
        terms: *terms,
        cases,
        best_case,
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

pub fn run_insurance_strategy<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    input: &InsuranceStrategyInput,
) -> FamilyOfficeResult<ComputationOutput<InsuranceStrategyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("total_assets", input.total_assets)?;
    require_non_negative("premium", input.premium)?;
    require_non_negative("claim_amount", input.claim_amount)?;
    if input.premium > input.total_assets {
        return Err(FamilyOfficeError::InvalidInput {
            field: "premium".into(),
            reason: "cannot exceed total assets".into(),
        });
    }
    require_representable("claim_amount", &[input.total_assets, input.claim_amount])?;
    validate_household(&input.household)?;
    household_warnings(&input.household, assessor.constants(), &mut warnings);
    if input.claim_amount < input.premium {
        warnings.push("Claim is smaller than the premium; the policy loses value.".into());
    }

    let output = simulate_insurance_strategy(assessor, input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Insurance what-if: premium removed from the estate, claim paid outside the \
         estate or added back and taxed, compared against no planning",
        &serde_json::json!({
            "total_assets": input.total_assets.to_string(),
            "premium": input.premium.to_string(),
            "claim_amount": input.claim_amount.to_string(),
            "household": input.household,
        }),
        warnings,
        elapsed,
        output,
    ))
}

pub fn run_gift_strategy<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    input: &GiftStrategyInput,
) -> FamilyOfficeResult<ComputationOutput<GiftStrategyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("total_assets", input.total_assets)?;
    if input.years > MAX_GIFT_YEARS {
        return Err(FamilyOfficeError::InvalidInput {
            field: "years".into(),
            reason: format!("must be at most {}", MAX_GIFT_YEARS),
        });
    }
    validate_household(&input.household)?;
    household_warnings(&input.household, assessor.constants(), &mut warnings);

    let output = simulate_gift_strategy(assessor, input);

    if output.after_gifting.total_gift > input.total_assets {
        warnings.push(format!(
            "Gifts of {} exceed total assets of {}; the remaining estate is floored at zero.",
            output.after_gifting.total_gift, input.total_assets
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Gift what-if: annual gift exemption used each year to shrink the estate, \
         compared against no planning",
        &serde_json::json!({
            "total_assets": input.total_assets.to_string(),
            "years": input.years,
            "annual_gift_exemption": assessor.constants().annual_gift_exemption.to_string(),
            "household": input.household,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Resolve the case terms, validate them and run the planning cases.
pub fn run_planning_cases<A: EstateTaxAssessor + ?Sized>(
    assessor: &A,
    input: &PlanningCasesInput,
) -> FamilyOfficeResult<ComputationOutput<PlanningCasesOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("total_assets", input.total_assets)?;
    for (field, value) in [
        ("gift_amount", input.gift_amount),
        ("premium", input.premium),
        ("claim_amount", input.claim_amount),
    ] {
        if let Some(value) = value {
            require_non_negative(field, value)?;
        }
    }
    validate_household(&input.household)?;
    household_warnings(&input.household, assessor.constants(), &mut warnings);

    let terms = resolve_case_terms(assessor, input);
    if terms.premium > input.total_assets {
        return Err(FamilyOfficeError::InvalidInput {
            field: "premium".into(),
            reason: "cannot exceed total assets".into(),
        });
    }
    if terms.gift_amount > input.total_assets - terms.premium {
        return Err(FamilyOfficeError::InvalidInput {
            field: "gift_amount".into(),
            reason: "cannot exceed what is left after the premium".into(),
        });
    }
    require_representable("claim_amount", &[input.total_assets, terms.claim_amount])?;
    if terms.claim_amount < terms.premium {
        warnings.push("Claim is smaller than the premium; the policy loses value.".into());
    }

    let output = simulate_planning_cases(assessor, input.total_assets, &input.household, &terms);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Estate planning cases: no planning, gift, insurance, gift plus insurance, and \
         gift plus insurance with the claim taxed, each against no planning",
        &serde_json::json!({
            "total_assets": input.total_assets.to_string(),
            "gift_amount": terms.gift_amount.to_string(),
            "premium": terms.premium.to_string(),
            "claim_amount": terms.claim_amount.to_string(),
            "household": input.household,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn require_representable(field: &str, amounts: &[Money]) -> FamilyOfficeResult<()> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .map(|_| ())
        .ok_or_else(|| FamilyOfficeError::InvalidInput {
            field: field.into(),
            reason: "too large to combine with total assets".into(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estate_tax::calculator::EstateTaxCalculator;
    use crate::estate_tax::memo::MemoizedAssessor;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn insurance_input() -> InsuranceStrategyInput {
        InsuranceStrategyInput {
            total_assets: dec!(5000),
            household: Household::default(),
            premium: dec!(1000),
            claim_amount: dec!(1500),
        }
    }

    #[test]
    fn test_insurance_claim_outside_estate() {
        let out = simulate_insurance_strategy(&EstateTaxCalculator::default(), &insurance_input());
        assert_eq!(out.baseline.estate_tax, dec!(353));
        assert_eq!(out.baseline.net_to_family, dec!(4647));
        // 4000 left: taxable 2529 -> 253; 4000 − 253 + 1500
        assert_eq!(out.claim_outside_estate.estate_tax, dec!(253));
        assert_eq!(out.claim_outside_estate.net_to_family, dec!(5247));
        assert_eq!(out.claim_outside_estate.effect, dec!(600));
    }

    #[test]
    fn test_insurance_claim_taxed_in_estate() {
        let out = simulate_insurance_strategy(&EstateTaxCalculator::default(), &insurance_input());
        // 5500 estate: taxable 4029 -> 403
        assert_eq!(out.claim_taxed_in_estate.estate_tax, dec!(403));
        assert_eq!(out.claim_taxed_in_estate.net_to_family, dec!(5097));
        assert_eq!(out.claim_taxed_in_estate.effect, dec!(450));
    }

    #[test]
    fn test_gift_strategy_ten_years() {
        let input = GiftStrategyInput {
            total_assets: dec!(5000),
            household: Household::default(),
            years: 10,
        };
        let out = simulate_gift_strategy(&EstateTaxCalculator::default(), &input);
        assert_eq!(out.after_gifting.total_gift, dec!(2440));
        assert_eq!(out.after_gifting.total_assets, dec!(2560));
        // taxable 1089 -> 108.9 -> 109
        assert_eq!(out.after_gifting.estate_tax, dec!(109));
        assert_eq!(out.after_gifting.net_to_family, dec!(4891));
        assert_eq!(out.effect, dec!(244));
    }

    #[test]
    fn test_gift_strategy_zero_years_has_no_effect() {
        let input = GiftStrategyInput {
            total_assets: dec!(9000),
            household: Household::default(),
            years: 0,
        };
        let out = simulate_gift_strategy(&EstateTaxCalculator::default(), &input);
        assert_eq!(out.effect, Decimal::ZERO);
        assert_eq!(out.after_gifting.estate_tax, out.baseline.estate_tax);
    }

    #[test]
    fn test_memoized_assessor_gives_same_outcomes() {
        let calc = EstateTaxCalculator::default();
        let memo = MemoizedAssessor::new(&calc);
        let gift = GiftStrategyInput {
            total_assets: dec!(5000),
            household: Household::default(),
            years: 3,
        };

        let plain_insurance = simulate_insurance_strategy(&calc, &insurance_input());
        let cached_insurance = simulate_insurance_strategy(&memo, &insurance_input());
        let cached_gift = simulate_gift_strategy(&memo, &gift);

        assert_eq!(plain_insurance, cached_insurance);
        assert_eq!(cached_gift, simulate_gift_strategy(&calc, &gift));
        // baseline of the gift run reuses the insurance baseline
        assert_eq!(memo.hits(), 1);
    }

    #[test]
    fn test_run_insurance_rejects_premium_above_assets() {
        let input = InsuranceStrategyInput {
            premium: dec!(6000),
            ..insurance_input()
        };
        assert!(run_insurance_strategy(&EstateTaxCalculator::default(), &input).is_err());
    }

    #[test]
    fn test_run_gift_warns_when_gifts_exceed_assets() {
        let input = GiftStrategyInput {
            total_assets: dec!(1000),
            household: Household::default(),
            years: 10,
        };
        let result = run_gift_strategy(&EstateTaxCalculator::default(), &input).unwrap();
        assert_eq!(result.result.after_gifting.total_assets, Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("floored at zero")));
    }

    fn case<'a>(out: &'a PlanningCasesOutput, case: PlanningCase) -> &'a CaseOutcome {
        out.cases.iter().find(|c| c.case == case).unwrap()
    }

    #[test]
    fn test_default_premium_rounds_up_to_tens() {
        assert_eq!(default_premium(dec!(353), dec!(5000)), dec!(360));
        assert_eq!(default_premium(dec!(350), dec!(5000)), dec!(350));
        assert_eq!(default_premium(dec!(353), dec!(300)), dec!(300));
    }

    #[test]
    fn test_resolve_case_terms_defaults() {
        let input = PlanningCasesInput {
            total_assets: dec!(5000),
            household: Household::default(),
            gift_amount: None,
            premium: None,
            claim_amount: None,
        };
        let terms = resolve_case_terms(&EstateTaxCalculator::default(), &input);
        assert_eq!(terms.premium, dec!(360));
        assert_eq!(terms.claim_amount, dec!(540));
        assert_eq!(terms.gift_amount, dec!(244));
    }

    #[test]
    fn test_planning_cases_hand_computed_rows() {
        let terms = CaseTerms {
            gift_amount: dec!(244),
            premium: dec!(360),
            claim_amount: dec!(540),
        };
        let out = simulate_planning_cases(
            &EstateTaxCalculator::default(),
            dec!(5000),
            &Household::default(),
            &terms,
        );
        assert_eq!(out.cases.len(), 5);

        let none = case(&out, PlanningCase::NoPlan);
        assert_eq!(none.estate_tax, dec!(353));
        assert_eq!(none.net_to_family, dec!(4647));
        assert_eq!(none.planning_benefit, Decimal::ZERO);

        // 4756 -> taxable 3285 -> 328.5 -> 328
        let gift = case(&out, PlanningCase::Gift);
        assert_eq!(gift.estate, dec!(4756));
        assert_eq!(gift.estate_tax, dec!(328));
        assert_eq!(gift.net_to_family, dec!(4672));
        assert_eq!(gift.planning_benefit, dec!(25));

        // 4640 -> taxable 3169 -> 316.9 -> 317
        let insurance = case(&out, PlanningCase::Insurance);
        assert_eq!(insurance.estate_tax, dec!(317));
        assert_eq!(insurance.net_to_family, dec!(4863));
        assert_eq!(insurance.planning_benefit, dec!(216));

        // 4396 -> taxable 2925 -> 292.5 -> 292
        let both = case(&out, PlanningCase::GiftAndInsurance);
        assert_eq!(both.estate, dec!(4396));
        assert_eq!(both.estate_tax, dec!(292));
        assert_eq!(both.net_to_family, dec!(4888));
        assert_eq!(both.planning_benefit, dec!(241));

        // 4936 -> taxable 3465 -> 346.5 -> 346
        let taxed = case(&out, PlanningCase::GiftAndInsuranceClaimTaxed);
        assert_eq!(taxed.estate, dec!(4936));
        assert_eq!(taxed.estate_tax, dec!(346));
        assert_eq!(taxed.net_to_family, dec!(4834));
        assert_eq!(taxed.planning_benefit, dec!(187));

        assert_eq!(out.best_case, PlanningCase::GiftAndInsurance);
    }

    #[test]
    fn test_planning_cases_match_insurance_what_if() {
        let terms = CaseTerms {
            gift_amount: Decimal::ZERO,
            premium: dec!(1000),
            claim_amount: dec!(1500),
        };
        let out = simulate_planning_cases(
            &EstateTaxCalculator::default(),
            dec!(5000),
            &Household::default(),
            &terms,
        );
        let insurance = case(&out, PlanningCase::Insurance);
        assert_eq!(insurance.net_to_family, dec!(5247));
        assert_eq!(insurance.planning_benefit, dec!(600));
        let taxed = case(&out, PlanningCase::GiftAndInsuranceClaimTaxed);
        assert_eq!(taxed.net_to_family, dec!(5097));
        assert_eq!(taxed.planning_benefit, dec!(450));
    }

    #[test]
    fn test_run_planning_cases_reuses_memoized_assessments() {
        let calc = EstateTaxCalculator::default();
        let memo = MemoizedAssessor::new(&calc);
        let input = PlanningCasesInput {
            total_assets: dec!(5000),
            household: Household::default(),
            gift_amount: None,
            premium: None,
            claim_amount: None,
        };
        let result = run_planning_cases(&memo, &input).unwrap();
        assert_eq!(result.result.terms.premium, dec!(360));
        assert_eq!(result.result.best_case, PlanningCase::GiftAndInsurance);
        // the default premium and the no-plan row share one assessment
        assert_eq!(memo.hits(), 1);
        assert_eq!(memo.len(), 5);
    }

    #[test]
    fn test_run_planning_cases_rejects_oversized_transfers() {
        let calc = EstateTaxCalculator::default();
        let premium_too_big = PlanningCasesInput {
            total_assets: dec!(5000),
            household: Household::default(),
            gift_amount: Some(Decimal::ZERO),
            premium: Some(dec!(5001)),
            claim_amount: None,
        };
        assert!(run_planning_cases(&calc, &premium_too_big).is_err());

        let gift_too_big = PlanningCasesInput {
            gift_amount: Some(dec!(4001)),
            premium: Some(dec!(1000)),
            ..premium_too_big.clone()
        };
        let err = run_planning_cases(&calc, &gift_too_big).unwrap_err();
        assert!(err.to_string().contains("gift_amount"));
    }

    #[test]
    fn test_run_planning_cases_no_default_gift_when_estate_is_small() {
        let input = PlanningCasesInput {
            total_assets: dec!(200),
            household: Household::default(),
            gift_amount: None,
            premium: None,
            claim_amount: None,
        };
        let result = run_planning_cases(&EstateTaxCalculator::default(), &input).unwrap();
        assert_eq!(result.result.terms.premium, Decimal::ZERO);
        assert_eq!(result.result.terms.gift_amount, Decimal::ZERO);
        assert!(result
            .result
            .cases
            .iter()
            .all(|c| c.planning_benefit == Decimal::ZERO));
    }

    #[test]
    fn test_what_if_envelopes_reject_oversized_household() {
        let calc = EstateTaxCalculator::default();
        let household = Household {
            children: u32::MAX,
            ..Household::default()
        };
        let insurance = InsuranceStrategyInput {
            household,
            ..insurance_input()
        };
        assert!(run_insurance_strategy(&calc, &insurance).is_err());

        let gift = GiftStrategyInput {
            total_assets: dec!(5000),
            household,
            years: 1,
        };
        assert!(run_gift_strategy(&calc, &gift).is_err());
    }
}
