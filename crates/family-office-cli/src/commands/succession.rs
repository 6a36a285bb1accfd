use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use family_office_core::succession::heirs::Heir;
use family_office_core::succession::scenarios::{self, EstateComparisonInput};
use family_office_core::tax_tables::TaxTables;

use crate::input;

/// Arguments for the four-strategy estate comparison
#[derive(Args)]
pub struct EstateCompareArgs {
    /// Value of the family company shares
    #[arg(long)]
    pub equity: Option<Decimal>,

    /// Other personal assets
    #[arg(long)]
    pub personal_assets: Option<Decimal>,

    /// Personal liabilities
    #[arg(long)]
    pub liabilities: Option<Decimal>,

    /// Estate tax exemption
    #[arg(long)]
    pub exemption: Option<Decimal>,

    /// Annual gift tax exclusion
    #[arg(long)]
    pub annual_exclusion: Option<Decimal>,

    /// Life insurance death benefit
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Count the insurance benefit inside the taxable estate
    #[arg(long)]
    pub insurance_in_estate: bool,

    /// Years of gifting
    #[arg(long)]
    pub years_of_gifting: Option<u32>,

    /// Amount gifted each year
    #[arg(long)]
    pub annual_gift: Option<Decimal>,

    /// Heir as NAME=SHARE; repeat for each heir
    #[arg(long = "heir", value_parser = parse_heir)]
    pub heirs: Vec<Heir>,

    /// Treat gifted assets as transferred early into trust
    #[arg(long)]
    pub trust: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn parse_heir(raw: &str) -> Result<Heir, String> {
    let (name, share) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SHARE, got '{}'", raw))?;
    let share: Decimal = share
        .trim()
        .parse()
        .map_err(|e| format!("invalid share in '{}': {}", raw, e))?;
    Ok(Heir::new(name.trim(), share))
}

pub fn run_estate_compare(
    args: EstateCompareArgs,
    tables: &TaxTables,
) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison = match input::load::<EstateComparisonInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let defaults = EstateComparisonInput::default();
            EstateComparisonInput {
                equity_value: args.equity.unwrap_or(defaults.equity_value),
                personal_assets: args.personal_assets.unwrap_or(defaults.personal_assets),
                personal_liabilities: args.liabilities.unwrap_or(defaults.personal_liabilities),
                estate_exemption: args.exemption.unwrap_or(defaults.estate_exemption),
                annual_exclusion: args.annual_exclusion.unwrap_or(defaults.annual_exclusion),
                insurance_sum: args.insurance.unwrap_or(defaults.insurance_sum),
                insurance_bypasses_estate: !args.insurance_in_estate,
                years_of_gifting: args.years_of_gifting.unwrap_or(defaults.years_of_gifting),
                annual_gift: args.annual_gift.unwrap_or(defaults.annual_gift),
                heirs: args.heirs,
                trust_transfer: args.trust,
            }
        }
    };
    let result = scenarios::run_estate_comparison(&comparison, &tables.transfer)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_heir() {
        let heir = parse_heir("Eldest = 0.6").unwrap();
        assert_eq!(heir.name, "Eldest");
        assert_eq!(heir.share, dec!(0.6));
    }

    #[test]
    fn test_parse_heir_rejects_missing_share() {
        assert!(parse_heir("Eldest").is_err());
        assert!(parse_heir("Eldest=lots").is_err());
    }
}
