pub mod dividend;
pub mod estate;
pub mod succession;
pub mod tax;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use family_office_core::dividend_policy::shareholder_tax::{
    IndividualTaxMode, ShareholderKind, ShareholderProfile,
};
use family_office_core::estate_tax::calculator::Household;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Resident individual
    Individual,
    /// Resident corporation (exempt)
    Corporate,
    /// Nonresident (treaty withholding)
    Nonresident,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Flat separate taxation of the dividend
    Flat,
    /// Dividend stacked on other income in the progressive table
    Integrated,
}

/// Shareholder flags shared by the dividend commands
#[derive(Args, Debug, Clone)]
pub struct ShareholderArgs {
    /// Who receives the dividend
    #[arg(long, value_enum, default_value = "individual")]
    pub kind: KindArg,

    /// Individual taxation mode
    #[arg(long, value_enum, default_value = "flat")]
    pub mode: ModeArg,

    /// Other ordinary income of an individual shareholder
    #[arg(long)]
    pub other_income: Option<Decimal>,

    /// Withholding rate for a nonresident shareholder (e.g. 0.21)
    #[arg(long)]
    pub withholding_rate: Option<Decimal>,
}

impl ShareholderArgs {
    pub fn profile(&self) -> ShareholderProfile {
        let defaults = ShareholderProfile::default();
        ShareholderProfile {
            kind: match self.kind {
                KindArg::Individual => ShareholderKind::IndividualResident,
                KindArg::Corporate => ShareholderKind::CorporateResident,
                KindArg::Nonresident => ShareholderKind::Nonresident,
            },
            mode: match self.mode {
                ModeArg::Flat => IndividualTaxMode::FlatSeparate,
                ModeArg::Integrated => IndividualTaxMode::ProgressiveIntegrated,
            },
            other_income: self.other_income.unwrap_or(defaults.other_income),
            nonresident_withholding_rate: self
                .withholding_rate
                .unwrap_or(defaults.nonresident_withholding_rate),
        }
    }
}

/// Household flags shared by the estate tax commands
#[derive(Args, Debug, Clone, Default)]
pub struct HouseholdArgs {
    /// Surviving spouse
    #[arg(long)]
    pub spouse: bool,

    /// Number of children
    #[arg(long, default_value = "0")]
    pub children: u32,

    /// Number of parents (at most two are claimed)
    #[arg(long, default_value = "0")]
    pub parents: u32,

    /// Number of severely disabled household members
    #[arg(long, default_value = "0")]
    pub disabled: u32,

    /// Other dependents (siblings, grandparents)
    #[arg(long, default_value = "0")]
    pub other_dependents: u32,
}

impl HouseholdArgs {
    pub fn household(&self) -> Household {
        Household {
            spouse: self.spouse,
            children: self.children,
            parents: self.parents,
            disabled: self.disabled,
            other_dependents: self.other_dependents,
        }
    }
}
