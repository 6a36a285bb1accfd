mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use family_office_core::tax_tables::TaxTables;

use commands::dividend::{DividendPolicyArgs, DividendYearArgs};
use commands::estate::{
    EstateTaxArgs, GiftWhatIfArgs, InsuranceWhatIfArgs, PlanningCasesArgs, WhatIfArgs,
};
use commands::succession::EstateCompareArgs;
use commands::tax::{BracketTaxArgs, ShareholderTaxArgs};

/// Family office dividend, estate and gift tax scenarios
#[derive(Parser)]
#[command(
    name = "fotax",
    version,
    about = "Family office dividend, estate and gift tax scenarios",
    long_about = "A CLI for family office tax planning with decimal precision. Simulates \
                  multi-year dividend policy, compares estate transfer strategies across \
                  heirs, and runs household estate tax what-ifs for insurance and gifting."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML or JSON file overriding the built-in tax tables
    #[arg(long, global = true)]
    tables: Option<String>,

    /// Log engine steps to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one progressive bracket table
    BracketTax(BracketTaxArgs),
    /// Shareholder-level tax on a dividend
    ShareholderTax(ShareholderTaxArgs),
    /// Simulate a two-phase dividend policy over many years
    DividendPolicy(DividendPolicyArgs),
    /// Company and shareholder tax for one fiscal year
    DividendYear(DividendYearArgs),
    /// Compare retain, gifting, insurance and trust strategies
    EstateCompare(EstateCompareArgs),
    /// Household estate tax with deduction breakdown
    EstateTax(EstateTaxArgs),
    /// Insurance premium and claim what-if
    WhatIfInsurance(InsuranceWhatIfArgs),
    /// Annual gift exemption what-if
    WhatIfGift(GiftWhatIfArgs),
    /// Insurance and gifting what-ifs for one household
    WhatIf(WhatIfArgs),
    /// Gift and insurance combined five ways, against no planning
    PlanningCases(PlanningCasesArgs),
    /// Print the active tax tables
    PrintTables,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_tables(path: Option<&str>) -> Result<TaxTables, Box<dyn std::error::Error>> {
    match path {
        Some(path) => input::file::read_tables(path),
        None => Ok(TaxTables::default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let tables = match load_tables(cli.tables.as_deref()) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("{}: {}", "config error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::BracketTax(args) => commands::tax::run_bracket_tax(args, &tables),
        Commands::ShareholderTax(args) => commands::tax::run_shareholder_tax(args, &tables),
        Commands::DividendPolicy(args) => commands::dividend::run_dividend_policy(args, &tables),
        Commands::DividendYear(args) => commands::dividend::run_dividend_year(args, &tables),
        Commands::EstateCompare(args) => commands::succession::run_estate_compare(args, &tables),
        Commands::EstateTax(args) => commands::estate::run_estate_tax(args, &tables),
        Commands::WhatIfInsurance(args) => commands::estate::run_insurance_what_if(args, &tables),
        Commands::WhatIfGift(args) => commands::estate::run_gift_what_if(args, &tables),
        Commands::WhatIf(args) => commands::estate::run_what_if(args, &tables),
        Commands::PlanningCases(args) => commands::estate::run_planning_cases(args, &tables),
        Commands::PrintTables => commands::tax::run_print_tables(&tables),
        Commands::Version => {
            println!("fotax {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
