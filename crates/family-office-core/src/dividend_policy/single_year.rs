//! Single fiscal year company-plus-shareholder tax breakdown.
//!
//! Uses the same year step as the multi-year simulator, starting from the
//! opening capital with an empty legal reserve, and adds the effective total
//! tax rate on pre-tax profit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::shareholder_tax::{validate_profile, ShareholderProfile};
use super::simulator::{
    step_year, validate_split, CompanyBalances, DistributionSplit, LegalReservePolicy, YearTerms,
};
use crate::tax_tables::ShareholderTaxRules;
use crate::types::{
    require_non_negative, require_unit_rate, with_metadata, ComputationOutput, Money, Rate,
};
use crate::FamilyOfficeResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleYearInput {
    pub pretax_profit: Money,
    pub corp_tax_rate: Rate,
    pub amt_rate: Rate,
    pub undistributed_tax_rate: Rate,
    /// Opening capital, which bounds the legal reserve.
    pub initial_capital: Money,
    pub legal_reserve: LegalReservePolicy,
    pub split: DistributionSplit,
    pub shareholder: ShareholderProfile,
}

impl Default for SingleYearInput {
    fn default() -> Self {
        Self {
            pretax_profit: dec!(20_000_000),
            corp_tax_rate: dec!(0.20),
            amt_rate: dec!(0.12),
            undistributed_tax_rate: dec!(0.05),
            initial_capital: dec!(1_000_000),
            legal_reserve: LegalReservePolicy::default(),
            split: DistributionSplit::default(),
            shareholder: ShareholderProfile::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleYearAssessment {
    pub pretax_profit: Money,
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
    /// Total tax over pre-tax profit; zero when there is no profit.
    pub effective_tax_rate: Rate,
}

pub fn assess_single_year(
    input: &SingleYearInput,
    rules: &ShareholderTaxRules,
) -> SingleYearAssessment {
    let terms = YearTerms {
        pretax_profit: input.pretax_profit,
        corp_tax_rate: input.corp_tax_rate,
        amt_rate: input.amt_rate,
        undistributed_tax_rate: input.undistributed_tax_rate,
        legal_reserve: &input.legal_reserve,
        shareholder: &input.shareholder,
        capital_surplus_conversion: Decimal::ZERO,
    };
    let mut balances = CompanyBalances::opening(input.initial_capital, Decimal::ZERO);
    let flows = step_year(&mut balances, &terms, &input.split, rules);

    let effective_tax_rate = if input.pretax_profit.is_zero() {
        Decimal::ZERO
    } else {
        flows.total_tax / input.pretax_profit
    };

    SingleYearAssessment {
        pretax_profit: input.pretax_profit,
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
        effective_tax_rate,
    }
}

pub fn run_single_year(
    input: &SingleYearInput,
    rules: &ShareholderTaxRules,
) -> FamilyOfficeResult<ComputationOutput<SingleYearAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("pretax_profit", input.pretax_profit)?;
    require_non_negative("initial_capital", input.initial_capital)?;
    require_unit_rate("corp_tax_rate", input.corp_tax_rate)?;
    require_unit_rate("amt_rate", input.amt_rate)?;
    require_unit_rate("undistributed_tax_rate", input.undistributed_tax_rate)?;
    require_unit_rate("legal_reserve.rate", input.legal_reserve.rate)?;
    require_unit_rate("legal_reserve.cap", input.legal_reserve.cap)?;
    validate_split("split", &input.split, &mut warnings)?;
    validate_profile(&input.shareholder, &mut warnings)?;

    let output = assess_single_year(input, rules);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Single-year company and shareholder tax: max(corporate tax, AMT), legal reserve \
         against opening capital, undistributed surtax, shareholder tax",
        &serde_json::json!({
            "pretax_profit": input.pretax_profit.to_string(),
            "corp_tax_rate": input.corp_tax_rate.to_string(),
            "amt_rate": input.amt_rate.to_string(),
            "cash_pct": input.split.cash_pct.to_string(),
            "stock_pct": input.split.stock_pct.to_string(),
            "shareholder_kind": input.shareholder.kind,
        }),
        warnings,
        elapsed,
        output,
    ))
}
