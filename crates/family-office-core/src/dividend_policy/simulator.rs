//! Multi-year dividend policy simulation.
//!
//! Each year the company pays the higher of ordinary corporate tax and the
//! alternative minimum tax, sets aside a legal reserve capped relative to
//! paid-in capital, and splits the rest into cash dividends, stock dividends
//! and retained earnings according to a two-phase policy. Retained earnings
//! attract an undistributed-earnings surtax, and distributions are taxed at
//! the shareholder level. Capital, retained earnings, legal reserve and
//! capital surplus carry forward from year to year.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::shareholder_tax::{resolve_shareholder_tax, validate_profile, ShareholderProfile};
use crate::error::FamilyOfficeError;
use crate::tax_tables::ShareholderTaxRules;
use crate::types::{
    require_non_negative, require_unit_rate, with_metadata, ComputationOutput, Money, Rate,
};
use crate::FamilyOfficeResult;

/// Longest horizon the validated envelope simulates.
pub const MAX_SIMULATION_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Mandatory legal reserve set-aside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalReservePolicy {
    pub enabled: bool,
    /// Share of after-tax profit set aside each year.
    pub rate: Rate,
    /// Ceiling on the reserve as a fraction of paid-in capital.
    pub cap: Rate,
}

impl Default for LegalReservePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: dec!(0.10),
            cap: dec!(0.25),
        }
    }
}

/// Shares of the distribution base paid as cash and as stock. They need not
/// sum to one; any shortfall is retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSplit {
    pub cash_pct: Rate,
    pub stock_pct: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividendPolicyInput {
    /// Simulation horizon in years.
    pub years: u32,
    /// Pre-tax profit, identical every year.
    pub pretax_profit: Money,
    pub corp_tax_rate: Rate,
    /// Alternative minimum tax rate (floor on corporate tax).
    pub amt_rate: Rate,
    /// Surtax on earnings retained rather than distributed.
    pub undistributed_tax_rate: Rate,
    pub initial_capital: Money,
    pub legal_reserve: LegalReservePolicy,
    /// Years 1..=phase1_years follow `phase1`, later years `phase2`.
    pub phase1_years: u32,
    pub phase1: DistributionSplit,
    pub phase2: DistributionSplit,
    pub shareholder: ShareholderProfile,
    /// Capital surplus converted into capital each year.
    pub capital_surplus_conversion: Money,
    /// Opening capital surplus. Nothing funds it during the simulation.
    pub initial_capital_surplus: Money,
}

impl Default for DividendPolicyInput {
    fn default() -> Self {
        Self {
            years: 30,
            pretax_profit: dec!(20_000_000),
            corp_tax_rate: dec!(0.20),
            amt_rate: dec!(0.12),
            undistributed_tax_rate: dec!(0.05),
            initial_capital: dec!(1_000_000),
            legal_reserve: LegalReservePolicy::default(),
            phase1_years: 10,
            phase1: DistributionSplit::default(),
            phase2: DistributionSplit::default(),
            shareholder: ShareholderProfile::default(),
            capital_surplus_conversion: Decimal::ZERO,
            initial_capital_surplus: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Running balance-sheet state carried across years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompanyBalances {
    pub capital: Money,
    pub retained_earnings: Money,
    pub legal_reserve: Money,
    pub capital_surplus: Money,
}

impl CompanyBalances {
    pub fn opening(capital: Money, capital_surplus: Money) -> Self {
        Self {
            capital,
            retained_earnings: Decimal::ZERO,
            legal_reserve: Decimal::ZERO,
            capital_surplus,
        }
    }

    /// Rough shareholders' equity: capital + retained earnings + legal reserve.
    pub fn equity(&self) -> Money {
        self.capital + self.retained_earnings + self.legal_reserve
    }
}

/// Flows of a single fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearFlows {
    /// Higher of ordinary corporate tax and AMT.
    pub corporate_tax: Money,
    pub after_tax_profit: Money,
    pub legal_reserve_accrual: Money,
    pub cash_dividend: Money,
    pub stock_dividend: Money,
    pub retained: Money,
    pub undistributed_tax: Money,
    pub shareholder_tax: Money,
    /// Corporate tax plus undistributed surtax.
    pub company_tax: Money,
    pub total_tax: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendYearRow {
    pub year: u32,
    pub corporate_tax: Money,
    pub after_tax_profit: Money,
    pub legal_reserve_accrual: Money,
    pub cash_dividend: Money,
    pub stock_dividend: Money,
    pub retained: Money,
    pub undistributed_tax: Money,
    pub shareholder_tax: Money,
    pub company_tax: Money,
    pub total_tax: Money,
    pub closing_capital: Money,
    pub closing_retained_earnings: Money,
    pub closing_legal_reserve: Money,
    pub closing_capital_surplus: Money,
    pub closing_equity: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendPolicyTotals {
    /// Corporate tax plus undistributed surtax over the horizon.
    pub total_company_tax: Money,
    pub total_shareholder_tax: Money,
    pub total_tax: Money,
    pub final_capital: Money,
    pub final_retained_earnings: Money,
    pub final_legal_reserve: Money,
    pub final_capital_surplus: Money,
    pub final_equity: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendPolicyOutput {
    pub per_year: Vec<DividendYearRow>,
    pub totals: DividendPolicyTotals,
}

// ---------------------------------------------------------------------------
// Year step
// ---------------------------------------------------------------------------

/// Tax and reserve terms that apply to every simulated year.
pub(crate) struct YearTerms<'a> {
    pub pretax_profit: Money,
    pub corp_tax_rate: Rate,
    pub amt_rate: Rate,
    pub undistributed_tax_rate: Rate,
    pub legal_reserve: &'a LegalReservePolicy,
    pub shareholder: &'a ShareholderProfile,
    pub capital_surplus_conversion: Money,
}

/// Advance `balances` by one fiscal year and return that year's flows.
pub(crate) fn step_year(
    balances: &mut CompanyBalances,
    terms: &YearTerms<'_>,
    split: &DistributionSplit,
    rules: &ShareholderTaxRules,
) -> YearFlows {
    let profit = terms.pretax_profit;
    let corporate_tax = (profit * terms.corp_tax_rate).max(profit * terms.amt_rate);
    let after_tax_profit = (profit - corporate_tax).max(Decimal::ZERO);

    let legal_reserve_accrual = if terms.legal_reserve.enabled {
        let target = balances.capital * terms.legal_reserve.cap;
        let room = (target - balances.legal_reserve).max(Decimal::ZERO);
        (after_tax_profit * terms.legal_reserve.rate).min(room)
    } else {
        Decimal::ZERO
    };

    let distribution_base = after_tax_profit - legal_reserve_accrual;
    let cash_dividend = distribution_base * split.cash_pct;
    let stock_dividend = distribution_base * split.stock_pct;
    let retained = (distribution_base - cash_dividend - stock_dividend).max(Decimal::ZERO);

    balances.capital += stock_dividend;
    balances.retained_earnings += retained;
    balances.legal_reserve += legal_reserve_accrual;

    if terms.capital_surplus_conversion > Decimal::ZERO
        && balances.capital_surplus > Decimal::ZERO
    {
        let converted = balances.capital_surplus.min(terms.capital_surplus_conversion);
        balances.capital += converted;
        balances.capital_surplus -= converted;
    }

    let undistributed_tax = retained * terms.undistributed_tax_rate;
    let shareholder_tax =
        resolve_shareholder_tax(cash_dividend + stock_dividend, terms.shareholder, rules);
    let company_tax = corporate_tax + undistributed_tax;

    YearFlows {
        corporate_tax,
        after_tax_profit,
        legal_reserve_accrual,
        cash_dividend,
        stock_dividend,
        retained,
        undistributed_tax,
        shareholder_tax,
        company_tax,
        total_tax: company_tax + shareholder_tax,
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Simulate the dividend policy over `input.years` years.
///
/// Deterministic and total: identical inputs always give identical rows. A
/// zero-year horizon returns no rows and totals equal to the opening state.
pub fn simulate_dividend_policy(
    input: &DividendPolicyInput,
    rules: &ShareholderTaxRules,
) -> DividendPolicyOutput {
    let terms = YearTerms {
        pretax_profit: input.pretax_profit,
        corp_tax_rate: input.corp_tax_rate,
        amt_rate: input.amt_rate,
        undistributed_tax_rate: input.undistributed_tax_rate,
        legal_reserve: &input.legal_reserve,
        shareholder: &input.shareholder,
        capital_surplus_conversion: input.capital_surplus_conversion,
    };

    let mut balances =
        CompanyBalances::opening(input.initial_capital, input.initial_capital_surplus);
    let mut per_year = Vec::with_capacity(input.years.min(MAX_SIMULATION_YEARS) as usize);
    let mut total_company_tax = Decimal::ZERO;
    let mut total_shareholder_tax = Decimal::ZERO;

    for year in 1..=input.years {
        let split = if year <= input.phase1_years {
            &input.phase1
        } else {
            &input.phase2
        };
        let flows = step_year(&mut balances, &terms, split, rules);

        log::debug!(
            "year={year} corporate_tax={} accrual={} cash={} stock={} retained={} \
             shareholder_tax={} capital={}",
            flows.corporate_tax,
            flows.legal_reserve_accrual,
            flows.cash_dividend,
            flows.stock_dividend,
            flows.retained,
            flows.shareholder_tax,
            balances.capital
        );

        total_company_tax += flows.company_tax;
        total_shareholder_tax += flows.shareholder_tax;
        per_year.push(DividendYearRow {
            year,
            corporate_tax: flows.corporate_tax,
            after_tax_profit: flows.after_tax_profit,
            legal_reserve_accrual: flows.legal_reserve_accrual,
            cash_dividend: flows.cash_dividend,
            stock_dividend: flows.stock_dividend,
            retained: flows.retained,
            undistributed_tax: flows.undistributed_tax,
            shareholder_tax: flows.shareholder_tax,
            company_tax: flows.company_tax,
            total_tax: flows.total_tax,
            closing_capital: balances.capital,
            closing_retained_earnings: balances.retained_earnings,
            closing_legal_reserve: balances.legal_reserve,
            closing_capital_surplus: balances.capital_surplus,
            closing_equity: balances.equity(),
        });
    }

    DividendPolicyOutput {
        per_year,
        totals: DividendPolicyTotals {
            total_company_tax,
            total_shareholder_tax,
            total_tax: total_company_tax + total_shareholder_tax,
            final_capital: balances.capital,
            final_retained_earnings: balances.retained_earnings,
            final_legal_reserve: balances.legal_reserve,
            final_capital_surplus: balances.capital_surplus,
            final_equity: balances.equity(),
        },
    }
}

/// Validate the input, run the simulation and wrap it with metadata.
pub fn run_dividend_policy(
    input: &DividendPolicyInput,
    rules: &ShareholderTaxRules,
) -> FamilyOfficeResult<ComputationOutput<DividendPolicyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let output = simulate_dividend_policy(input, rules);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-year dividend policy: max(corporate tax, AMT), capped legal reserve, \
         two-phase cash/stock split, undistributed earnings surtax, shareholder tax",
        &serde_json::json!({
            "years": input.years,
            "pretax_profit": input.pretax_profit.to_string(),
            "corp_tax_rate": input.corp_tax_rate.to_string(),
            "amt_rate": input.amt_rate.to_string(),
            "undistributed_tax_rate": input.undistributed_tax_rate.to_string(),
            "phase1_years": input.phase1_years,
            "shareholder_kind": input.shareholder.kind,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_input(
    input: &DividendPolicyInput,
    warnings: &mut Vec<String>,
) -> FamilyOfficeResult<()> {
    if input.years == 0 {
        return Err(FamilyOfficeError::InvalidInput {
            field: "years".into(),
            reason: "must be at least 1".into(),
        });
    }
    if input.years > MAX_SIMULATION_YEARS {
        return Err(FamilyOfficeError::InvalidInput {
            field: "years".into(),
            reason: format!("must be at most {MAX_SIMULATION_YEARS}"),
        });
    }
    require_non_negative("pretax_profit", input.pretax_profit)?;
    require_non_negative("initial_capital", input.initial_capital)?;
    require_non_negative("capital_surplus_conversion", input.capital_surplus_conversion)?;
    require_non_negative("initial_capital_surplus", input.initial_capital_surplus)?;
    require_unit_rate("corp_tax_rate", input.corp_tax_rate)?;
    require_unit_rate("amt_rate", input.amt_rate)?;
    require_unit_rate("undistributed_tax_rate", input.undistributed_tax_rate)?;
    require_unit_rate("legal_reserve.rate", input.legal_reserve.rate)?;
    require_unit_rate("legal_reserve.cap", input.legal_reserve.cap)?;
    validate_split("phase1", &input.phase1, warnings)?;
    validate_split("phase2", &input.phase2, warnings)?;
    validate_profile(&input.shareholder, warnings)?;
    require_representable_horizon(input)?;

    if input.phase1_years >= input.years {
        warnings.push(format!(
            "Phase 1 covers all {} years; the phase 2 split is never applied.",
            input.years
        ));
    }

    Ok(())
}

/// Each year moves at most four times the profit plus the shareholder's
/// other income, so the horizon's balances and totals stay below this bound.
fn require_representable_horizon(input: &DividendPolicyInput) -> FamilyOfficeResult<()> {
    let bound = input
        .pretax_profit
        .checked_mul(dec!(4))
        .and_then(|v| v.checked_add(input.shareholder.other_income))
        .and_then(|v| v.checked_mul(Decimal::from(input.years)))
        .and_then(|v| v.checked_add(input.initial_capital))
        .and_then(|v| v.checked_add(input.initial_capital_surplus));
    match bound {
        Some(_) => Ok(()),
        None => Err(FamilyOfficeError::InvalidInput {
            field: "pretax_profit".into(),
            reason: "amounts over the horizon are too large to represent".into(),
        }),
    }
}

pub(crate) fn validate_split(
    phase: &str,
    split: &DistributionSplit,
    warnings: &mut Vec<String>,
) -> FamilyOfficeResult<()> {
    require_unit_rate(&format!("{phase}.cash_pct"), split.cash_pct)?;
    require_unit_rate(&format!("{phase}.stock_pct"), split.stock_pct)?;
    if split.cash_pct + split.stock_pct > Decimal::ONE {
        warnings.push(format!(
            "{phase}: cash {} + stock {} exceeds 100% of the distribution base; \
             nothing is retained and distributions exceed the base.",
            split.cash_pct, split.stock_pct
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
