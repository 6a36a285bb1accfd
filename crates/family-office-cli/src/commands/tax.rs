use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use family_office_core::dividend_policy::shareholder_tax::{self, ShareholderTaxInput};
use family_office_core::tax_tables::{evaluate_checked, BracketTable, TaxTables};

use super::ShareholderArgs;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TableArg {
    /// Consolidated individual income tax
    Income,
    /// Estate tax of the strategy comparison
    Estate,
    /// Gift tax of the strategy comparison
    Gift,
    /// Estate tax of the household calculator (ten-thousand units)
    EstateCalculator,
}

impl TableArg {
    fn name(self) -> &'static str {
        match self {
            TableArg::Income => "income",
            TableArg::Estate => "estate",
            TableArg::Gift => "gift",
            TableArg::EstateCalculator => "estate_calculator",
        }
    }

    fn select(self, tables: &TaxTables) -> &BracketTable {
        match self {
            TableArg::Income => &tables.shareholder.income_brackets,
            TableArg::Estate => &tables.transfer.estate,
            TableArg::Gift => &tables.transfer.gift,
            TableArg::EstateCalculator => &tables.estate.brackets,
        }
    }
}

/// Arguments for a single bracket evaluation
#[derive(Args)]
pub struct BracketTaxArgs {
    /// Amount to tax
    #[arg(long)]
    pub amount: Decimal,

    /// Which configured table to apply
    #[arg(long, value_enum, default_value = "income")]
    pub table: TableArg,
}

/// Arguments for shareholder dividend tax
#[derive(Args)]
pub struct ShareholderTaxArgs {
    /// Dividend amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    #[command(flatten)]
    pub shareholder: ShareholderArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_bracket_tax(
    args: BracketTaxArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let table = args.table.select(tables);
    let tax = evaluate_checked(args.amount, table)?;
    let bracket = table
        .brackets()
        .iter()
        .position(|b| b.upper_bound.map_or(true, |upper| args.amount <= upper))
        .unwrap_or(table.brackets().len() - 1);
    let applied = &table.brackets()[bracket];
    let average_rate = if args.amount.is_zero() {
        Decimal::ZERO
    } else {
        tax / args.amount
    };

    Ok(json!({
        "result": {
            "table": args.table.name(),
            "amount": args.amount,
            "tax": tax,
            "bracket": bracket + 1,
            "marginal_rate": applied.rate,
            "subtrahend": applied.subtrahend,
            "average_rate": average_rate,
        }
    }))
}

pub fn run_shareholder_tax(
    args: ShareholderTaxArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input = match input::load::<ShareholderTaxInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ShareholderTaxInput {
            amount: args
                .amount
                .ok_or("--amount, --input <file.json> or stdin required")?,
            shareholder: args.shareholder.profile(),
        },
    };
    let result = shareholder_tax::run_shareholder_tax(&tax_input, &tables.shareholder)?;
    Ok(serde_json::to_value(result)?)
}

/// Print the active tax tables, after any `--tables` overrides.
pub fn run_print_tables(tables: &TaxTables) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(tables)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bracket_tax_rejects_negative_amount() {
        let args = BracketTaxArgs {
            amount: dec!(-5),
            table: TableArg::Gift,
        };
        let err = run_bracket_tax(args, &TaxTables::default()).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_bracket_tax_zero_amount_has_zero_average_rate() {
        let args = BracketTaxArgs {
            amount: Decimal::ZERO,
            table: TableArg::Income,
        };
        let value = run_bracket_tax(args, &TaxTables::default()).unwrap();
        assert_eq!(value["result"]["average_rate"], json!("0"));
        assert_eq!(value["result"]["bracket"], json!(1));
    }
}
