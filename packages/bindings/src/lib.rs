//! Node bindings. Every function takes its input as a JSON string, plus an
//! optional JSON document overriding the built-in tax tables, and returns the
//! computation envelope as a JSON string.

use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use family_office_core::dividend_policy::{shareholder_tax, simulator, single_year};
use family_office_core::estate_tax::calculator::{self, EstateTaxCalculator};
use family_office_core::estate_tax::what_if;
use family_office_core::succession::scenarios;
use family_office_core::estate_tax::memo::MemoizedAssessor;
use family_office_core::tax_tables::{evaluate_checked, TaxTables};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_tables(tables_json: Option<String>) -> NapiResult<TaxTables> {
    let tables = match tables_json {
        Some(raw) => serde_json::from_str::<TaxTables>(&raw).map_err(to_napi_error)?,
        None => TaxTables::default(),
    };
    tables.validate().map_err(to_napi_error)?;
    Ok(tables)
}

// ---------------------------------------------------------------------------
// Tax tables
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BracketTaxRequest {
    amount: Decimal,
    #[serde(default)]
    table: TableChoice,
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum TableChoice {
    #[default]
    Income,
    Estate,
    Gift,
    EstateCalculator,
}

#[napi]
pub fn bracket_tax(input_json: String, tables_json: Option<String>) -> NapiResult<String> {
    let request: BracketTaxRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tables = parse_tables(tables_json)?;
    let table = match request.table {
        TableChoice::Income => &tables.shareholder.income_brackets,
        TableChoice::Estate => &tables.transfer.estate,
        TableChoice::Gift => &tables.transfer.gift,
        TableChoice::EstateCalculator => &tables.estate.brackets,
    };
    let tax = evaluate_checked(request.amount, table).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "tax": tax })).map_err(to_napi_error)
}

#[napi]
pub fn default_tax_tables() -> NapiResult<String> {
    serde_json::to_string(&TaxTables::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dividend policy
// ---------------------------------------------------------------------------

#[napi]
pub fn resolve_shareholder_tax(
    input_json: String,
    tables_json: Option<String>,
) -> NapiResult<String> {
    let input: shareholder_tax::ShareholderTaxInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tables = parse_tables(tables_json)?;
    let output =
        shareholder_tax::run_shareholder_tax(&input, &tables.shareholder).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_dividend_policy(
    input_json: String,
    tables_json: Option<String>,
) -> NapiResult<String> {
    let input: simulator::DividendPolicyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tables = parse_tables(tables_json)?;
    let output =
        simulator::run_dividend_policy(&input, &tables.shareholder).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_dividend_year(
    input_json: String,
    tables_json: Option<String>,
) -> NapiResult<String> {
    let input: single_year::SingleYearInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tables = parse_tables(tables_json)?;
    let output =
        single_year::run_single_year(&input, &tables.shareholder).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Succession
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_estate_strategies(
    input_json: String,
    tables_json: Option<String>,
) -> NapiResult<String> {
    let input: scenarios::EstateComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tables = parse_tables(tables_json)?;
    let output =
        scenarios::run_estate_comparison(&input, &tables.transfer).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Estate tax calculator
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_estate_tax(
    input_json: String,
    tables_json: Option<String>,
) -> NapiResult<String> {
    let input: calculator::EstateTaxInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let calc = EstateTaxCalculator::new(parse_tables(tables_json)?.estate);
    let output = calculator::run_estate_tax(&input, &calc).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn insurance_what_if(input_json: String, tables_json: Option<String>) -> NapiResult<String> {
    let input: what_if::InsuranceStrategyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let calc = EstateTaxCalculator::new(parse_tables(tables_json)?.estate);
    let output = what_if::run_insurance_strategy(&calc, &input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn gift_what_if(input_json: String, tables_json: Option<String>) -> NapiResult<String> {
    let input: what_if::GiftStrategyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let calc = EstateTaxCalculator::new(parse_tables(tables_json)?.estate);
    let output = what_if::run_gift_strategy(&calc, &input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Five planning cases over one memoised assessor.
#[napi]
pub fn estate_planning_cases(
    input_json: String,
    tables_json: Option<String>,
) -> NapiResult<String> {
    let input: what_if::PlanningCasesInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let calc = EstateTaxCalculator::new(parse_tables(tables_json)?.estate);
    let memo = MemoizedAssessor::new(&calc);
    let output = what_if::run_planning_cases(&memo, &input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
