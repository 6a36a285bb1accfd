use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use family_office_core::dividend_policy::simulator::{
    self, DistributionSplit, DividendPolicyInput, LegalReservePolicy,
};
use family_office_core::dividend_policy::single_year::{self, SingleYearInput};
use family_office_core::tax_tables::TaxTables;

use super::ShareholderArgs;
use crate::input;

/// Company tax and legal reserve flags shared by both dividend commands
#[derive(Args, Debug, Clone)]
pub struct CompanyArgs {
    /// Pre-tax profit per year
    #[arg(long)]
    pub pretax_profit: Option<Decimal>,

    /// Corporate income tax rate
    #[arg(long)]
    pub corp_tax_rate: Option<Decimal>,

    /// Alternative minimum tax rate
    #[arg(long)]
    pub amt_rate: Option<Decimal>,

    /// Surtax rate on retained earnings
    #[arg(long)]
    pub undistributed_tax_rate: Option<Decimal>,

    /// Opening paid-in capital
    #[arg(long)]
    pub initial_capital: Option<Decimal>,

    /// Skip the legal reserve set-aside
    #[arg(long)]
    pub no_legal_reserve: bool,

    /// Share of after-tax profit set aside as legal reserve
    #[arg(long)]
    pub legal_reserve_rate: Option<Decimal>,

    /// Legal reserve ceiling as a fraction of capital
    #[arg(long)]
    pub legal_reserve_cap: Option<Decimal>,
}

impl CompanyArgs {
    fn legal_reserve(&self) -> LegalReservePolicy {
        let defaults = LegalReservePolicy::default();
        LegalReservePolicy {
            enabled: !self.no_legal_reserve,
            rate: self.legal_reserve_rate.unwrap_or(defaults.rate),
            cap: self.legal_reserve_cap.unwrap_or(defaults.cap),
        }
    }
}

/// Arguments for the multi-year dividend policy simulation
#[derive(Args)]
pub struct DividendPolicyArgs {
    /// Simulation horizon in years
    #[arg(long, default_value = "30")]
    pub years: u32,

    /// Years that follow the phase 1 split
    #[arg(long, default_value = "10")]
    pub phase1_years: u32,

    /// Phase 1 cash dividend share of the distribution base
    #[arg(long, default_value = "0")]
    pub phase1_cash: Decimal,

    /// Phase 1 stock dividend share of the distribution base
    #[arg(long, default_value = "0")]
    pub phase1_stock: Decimal,

    /// Phase 2 cash dividend share of the distribution base
    #[arg(long, default_value = "0")]
    pub phase2_cash: Decimal,

    /// Phase 2 stock dividend share of the distribution base
    #[arg(long, default_value = "0")]
    pub phase2_stock: Decimal,

    /// Capital surplus converted into capital each year
    #[arg(long, default_value = "0")]
    pub surplus_conversion: Decimal,

    /// Opening capital surplus
    #[arg(long, default_value = "0")]
    pub initial_surplus: Decimal,

    #[command(flatten)]
    pub company: CompanyArgs,

    #[command(flatten)]
    pub shareholder: ShareholderArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a single fiscal year
#[derive(Args)]
pub struct DividendYearArgs {
    /// Cash dividend share of the distribution base
    #[arg(long, default_value = "0")]
    pub cash: Decimal,

    /// Stock dividend share of the distribution base
    #[arg(long, default_value = "0")]
    pub stock: Decimal,

    #[command(flatten)]
    pub company: CompanyArgs,

    #[command(flatten)]
    pub shareholder: ShareholderArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_dividend_policy(
    args: DividendPolicyArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = match input::load::<DividendPolicyInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let defaults = DividendPolicyInput::default();
            let company = &args.company;
            DividendPolicyInput {
                years: args.years,
                pretax_profit: company.pretax_profit.unwrap_or(defaults.pretax_profit),
                corp_tax_rate: company.corp_tax_rate.unwrap_or(defaults.corp_tax_rate),
                amt_rate: company.amt_rate.unwrap_or(defaults.amt_rate),
                undistributed_tax_rate: company
                    .undistributed_tax_rate
                    .unwrap_or(defaults.undistributed_tax_rate),
                initial_capital: company.initial_capital.unwrap_or(defaults.initial_capital),
                legal_reserve: company.legal_reserve(),
                phase1_years: args.phase1_years,
                phase1: DistributionSplit {
                    cash_pct: args.phase1_cash,
                    stock_pct: args.phase1_stock,
                },
                phase2: DistributionSplit {
                    cash_pct: args.phase2_cash,
                    stock_pct: args.phase2_stock,
                },
                shareholder: args.shareholder.profile(),
                capital_surplus_conversion: args.surplus_conversion,
                initial_capital_surplus: args.initial_surplus,
            }
        }
    };
    let result = simulator::run_dividend_policy(&policy, &tables.shareholder)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_dividend_year(
    args: DividendYearArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let year = match input::load::<SingleYearInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let defaults = SingleYearInput::default();
            let company = &args.company;
            SingleYearInput {
                pretax_profit: company.pretax_profit.unwrap_or(defaults.pretax_profit),
                corp_tax_rate: company.corp_tax_rate.unwrap_or(defaults.corp_tax_rate),
                amt_rate: company.amt_rate.unwrap_or(defaults.amt_rate),
                undistributed_tax_rate: company
                    .undistributed_tax_rate
                    .unwrap_or(defaults.undistributed_tax_rate),
                initial_capital: company.initial_capital.unwrap_or(defaults.initial_capital),
                legal_reserve: company.legal_reserve(),
                split: DistributionSplit {
                    cash_pct: args.cash,
                    stock_pct: args.stock,
                },
                shareholder: args.shareholder.profile(),
            }
        }
    };
    let result = single_year::run_single_year(&year, &tables.shareholder)?;
    Ok(serde_json::to_value(result)?)
}
