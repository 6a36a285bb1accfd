use clap::Args;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::{json, Value};

use family_office_core::estate_tax::calculator::{
    self, EstateTaxCalculator, EstateTaxInput, Household,
};
use family_office_core::estate_tax::memo::MemoizedAssessor;
use family_office_core::estate_tax::what_if::{
    self, GiftStrategyInput, InsuranceStrategyInput, PlanningCasesInput,
};
use family_office_core::tax_tables::TaxTables;

use super::HouseholdArgs;
use crate::input;

/// Arguments for the household estate tax calculator (ten-thousand units)
#[derive(Args)]
pub struct EstateTaxArgs {
    /// Total estate assets
    #[arg(long)]
    pub assets: Option<Decimal>,

    #[command(flatten)]
    pub household: HouseholdArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Insurance policy flags
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Premium paid out of the estate
    #[arg(long, default_value = "0")]
    pub premium: Decimal,

    /// Death benefit paid on the policy
    #[arg(long, conflicts_with = "claim_multiple")]
    pub claim: Option<Decimal>,

    /// Derive the death benefit as premium × multiple
    #[arg(long, default_value = "1.5")]
    pub claim_multiple: Decimal,
}

impl PolicyArgs {
    fn claim_amount(&self) -> Decimal {
        self.claim
            .unwrap_or_else(|| claim_from_multiple(self.premium, self.claim_multiple))
    }
}

fn claim_from_multiple(premium: Decimal, multiple: Decimal) -> Decimal {
    (premium * multiple).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Arguments for the insurance what-if
#[derive(Args)]
pub struct InsuranceWhatIfArgs {
    /// Total estate assets
    #[arg(long)]
    pub assets: Option<Decimal>,

    #[command(flatten)]
    pub household: HouseholdArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the gifting what-if
#[derive(Args)]
pub struct GiftWhatIfArgs {
    /// Total estate assets
    #[arg(long)]
    pub assets: Option<Decimal>,

    #[command(flatten)]
    pub household: HouseholdArgs,

    /// Years of using the annual gift exemption
    #[arg(long, default_value = "10")]
    pub years: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for running both what-ifs against one household
#[derive(Args)]
pub struct WhatIfArgs {
    /// Total estate assets
    #[arg(long)]
    pub assets: Option<Decimal>,

    #[command(flatten)]
    pub household: HouseholdArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Years of using the annual gift exemption
    #[arg(long, default_value = "10")]
    pub years: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// JSON shape accepted by `what-if` on `--input` or stdin.
#[derive(Debug, Deserialize)]
pub struct WhatIfRequest {
    pub total_assets: Decimal,
    #[serde(default)]
    pub household: Household,
    #[serde(default)]
    pub premium: Decimal,
    /// Defaults to the premium × `claim_multiple`.
    #[serde(default)]
    pub claim_amount: Option<Decimal>,
    #[serde(default = "default_claim_multiple")]
    pub claim_multiple: Decimal,
    #[serde(default = "default_gift_years")]
    pub years: u32,
}

fn default_claim_multiple() -> Decimal {
    dec!(1.5)
}

fn default_gift_years() -> u32 {
    10
}

impl WhatIfRequest {
    fn from_args(args: &WhatIfArgs) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            total_assets: args.assets.ok_or(ASSETS_REQUIRED)?,
            household: args.household.household(),
            premium: args.policy.premium,
            claim_amount: args.policy.claim,
            claim_multiple: args.policy.claim_multiple,
            years: args.years,
        })
    }

    fn strategies(&self) -> (InsuranceStrategyInput, GiftStrategyInput) {
        let claim_amount = self
            .claim_amount
            .unwrap_or_else(|| claim_from_multiple(self.premium, self.claim_multiple));
        (
            InsuranceStrategyInput {
                total_assets: self.total_assets,
                household: self.household,
                premium: self.premium,
                claim_amount,
            },
            GiftStrategyInput {
                total_assets: self.total_assets,
                household: self.household,
                years: self.years,
            },
        )
    }
}

/// Arguments for the five-case planning comparison
#[derive(Args)]
pub struct PlanningCasesArgs {
    /// Total estate assets
    #[arg(long)]
    pub assets: Option<Decimal>,

    #[command(flatten)]
    pub household: HouseholdArgs,

    /// Gift made out of the estate [default: one annual exemption]
    #[arg(long)]
    pub gift: Option<Decimal>,

    /// Premium paid out of the estate [default: no-plan tax rounded up to tens]
    #[arg(long)]
    pub premium: Option<Decimal>,

    /// Death benefit paid on the policy [default: premium × 1.5]
    #[arg(long)]
    pub claim: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

const ASSETS_REQUIRED: &str = "--assets, --input <file.json> or stdin required";

pub fn run_estate_tax(
    args: EstateTaxArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let estate = match input::load::<EstateTaxInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => EstateTaxInput {
            total_assets: args.assets.ok_or(ASSETS_REQUIRED)?,
            household: args.household.household(),
        },
    };
    let calc = EstateTaxCalculator::new(tables.estate.clone());
    let result = calculator::run_estate_tax(&estate, &calc)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_insurance_what_if(
    args: InsuranceWhatIfArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let strategy = match input::load::<InsuranceStrategyInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => InsuranceStrategyInput {
            total_assets: args.assets.ok_or(ASSETS_REQUIRED)?,
            household: args.household.household(),
            premium: args.policy.premium,
            claim_amount: args.policy.claim_amount(),
        },
    };
    let calc = EstateTaxCalculator::new(tables.estate.clone());
    let result = what_if::run_insurance_strategy(&calc, &strategy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_gift_what_if(
    args: GiftWhatIfArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let strategy = match input::load::<GiftStrategyInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => GiftStrategyInput {
            total_assets: args.assets.ok_or(ASSETS_REQUIRED)?,
            household: args.household.household(),
            years: args.years,
        },
    };
    let calc = EstateTaxCalculator::new(tables.estate.clone());
    let result = what_if::run_gift_strategy(&calc, &strategy)?;
    Ok(serde_json::to_value(result)?)
}

/// Both what-ifs over one memoised assessor, so the shared baseline is
/// assessed once.
pub fn run_what_if(
    args: WhatIfArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match input::load::<WhatIfRequest>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => WhatIfRequest::from_args(&args)?,
    };
    let (insurance_input, gift_input) = request.strategies();
    let calc = EstateTaxCalculator::new(tables.estate.clone());
    let memo = MemoizedAssessor::new(&calc);

    let insurance = what_if::run_insurance_strategy(&memo, &insurance_input)?;
    let gift = what_if::run_gift_strategy(&memo, &gift_input)?;
    log::debug!(
        "what-if assessments: {} distinct, {} cached",
        memo.len(),
        memo.hits()
    );

    let mut warnings = insurance.warnings.clone();
    for w in &gift.warnings {
        if !warnings.contains(w) {
            warnings.push(w.clone());
        }
    }

    Ok(json!({
        "result": {
            "baseline": insurance.result.baseline,
            "insurance_claim_outside_estate": insurance.result.claim_outside_estate,
            "insurance_claim_taxed_in_estate": insurance.result.claim_taxed_in_estate,
            "gifting": gift.result.after_gifting,
            "gifting_effect": gift.result.effect,
        },
        "methodology": format!("{}; {}", insurance.methodology, gift.methodology),
        "warnings": warnings,
    }))
}

pub fn run_planning_cases(
    args: PlanningCasesArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let cases = match input::load::<PlanningCasesInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PlanningCasesInput {
            total_assets: args.assets.ok_or(ASSETS_REQUIRED)?,
            household: args.household.household(),
            gift_amount: args.gift,
            premium: args.premium,
            claim_amount: args.claim,
        },
    };
    let calc = EstateTaxCalculator::new(tables.estate.clone());
    let memo = MemoizedAssessor::new(&calc);
    let result = what_if::run_planning_cases(&memo, &cases)?;
    log::debug!(
        "planning-case assessments: {} distinct, {} cached",
        memo.len(),
        memo.hits()
    );
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_claim_from_multiple_rounds_half_even() {
        let policy = PolicyArgs {
            premium: dec!(333),
            claim: None,
            claim_multiple: dec!(1.5),
        };
        // 499.5 rounds to 500
        assert_eq!(policy.claim_amount(), dec!(500));
    }

    #[test]
    fn test_explicit_claim_wins() {
        let policy = PolicyArgs {
            premium: dec!(1000),
            claim: Some(dec!(1200)),
            claim_multiple: dec!(1.5),
        };
        assert_eq!(policy.claim_amount(), dec!(1200));
    }

    #[test]
    fn test_what_if_request_from_json_uses_defaults() {
        let request: WhatIfRequest =
            serde_json::from_str(r#"{"total_assets":"5000","premium":"333"}"#).unwrap();
        let (insurance, gift) = request.strategies();
        assert_eq!(insurance.total_assets, dec!(5000));
        assert_eq!(insurance.claim_amount, dec!(500));
        assert_eq!(gift.years, 10);
        assert_eq!(gift.household, Household::default());
    }

    #[test]
    fn test_what_if_request_from_json_keeps_explicit_claim() {
        let request: WhatIfRequest = serde_json::from_str(
            r#"{"total_assets":"8000","household":{"children":2},"premium":"1000",
                "claim_amount":"1200","years":3}"#,
        )
        .unwrap();
        let (insurance, gift) = request.strategies();
        assert_eq!(insurance.claim_amount, dec!(1200));
        assert_eq!(insurance.household.children, 2);
        assert_eq!(gift.years, 3);
    }

    #[test]
    fn test_what_if_runs_from_input_file() {
        let path = std::env::temp_dir().join(format!("fotax-what-if-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"total_assets":"5000","premium":"1000","claim_amount":"1500"}"#,
        )
        .unwrap();
        let args = WhatIfArgs {
            assets: None,
            household: HouseholdArgs::default(),
            policy: PolicyArgs {
                premium: Decimal::ZERO,
                claim: None,
                claim_multiple: dec!(1.5),
            },
            years: 10,
            input: Some(path.to_string_lossy().into_owned()),
        };
        let value = run_what_if(args, &TaxTables::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            value["result"]["insurance_claim_outside_estate"]["net_to_family"],
            json!("5247")
        );
        assert_eq!(value["result"]["gifting_effect"], json!("244"));
    }

    #[test]
    fn test_planning_cases_from_input_file() {
        let path = std::env::temp_dir().join(format!("fotax-cases-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"total_assets":"5000"}"#).unwrap();
        let args = PlanningCasesArgs {
            assets: None,
            household: HouseholdArgs::default(),
            gift: None,
            premium: None,
            claim: None,
            input: Some(path.to_string_lossy().into_owned()),
        };
        let value = run_planning_cases(args, &TaxTables::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(value["result"]["terms"]["premium"], json!("360"));
        assert_eq!(value["result"]["best_case"], json!("gift_and_insurance"));
        assert_eq!(value["result"]["cases"][3]["net_to_family"], json!("4888"));
    }
}
