//! Built-in tax tables used when no overrides are configured.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::brackets::{Bracket, BracketTable};

fn bracket(upper_bound: Option<Decimal>, rate: Decimal, subtrahend: Decimal) -> Bracket {
    Bracket {
        upper_bound,
        rate,
        subtrahend,
    }
}

/// Individual consolidated income tax, used for progressive dividend
/// integration.
pub fn individual_income_brackets() -> BracketTable {
    BracketTable::from_trusted(vec![
        bracket(Some(dec!(540_000)), dec!(0.05), dec!(0)),
        bracket(Some(dec!(1_210_000)), dec!(0.12), dec!(37_800)),
        bracket(Some(dec!(2_420_000)), dec!(0.20), dec!(134_600)),
        bracket(Some(dec!(4_530_000)), dec!(0.30), dec!(376_600)),
        bracket(Some(dec!(10_310_000)), dec!(0.40), dec!(829_600)),
        bracket(None, dec!(0.45), dec!(1_345_100)),
    ])
}

/// Estate tax table for the transfer strategy comparator.
pub fn estate_brackets() -> BracketTable {
    BracketTable::from_trusted(vec![
        bracket(Some(dec!(50_000_000)), dec!(0.10), dec!(0)),
        bracket(Some(dec!(100_000_000)), dec!(0.15), dec!(2_500_000)),
        bracket(None, dec!(0.20), dec!(7_500_000)),
    ])
}

/// Gift tax table for the transfer strategy comparator.
pub fn gift_brackets() -> BracketTable {
    BracketTable::from_trusted(vec![
        bracket(Some(dec!(25_000_000)), dec!(0.10), dec!(0)),
        bracket(Some(dec!(50_000_000)), dec!(0.15), dec!(1_250_000)),
        bracket(None, dec!(0.20), dec!(3_750_000)),
    ])
}

/// Estate tax table of the single-jurisdiction calculator, in ten-thousand
/// units. Marginal bands 5621 / 11242 / open at 10% / 15% / 20%.
pub fn estate_tax_calculator_brackets() -> BracketTable {
    BracketTable::from_trusted(vec![
        bracket(Some(dec!(5621)), dec!(0.10), dec!(0)),
        bracket(Some(dec!(11242)), dec!(0.15), dec!(281.05)),
        bracket(None, dec!(0.20), dec!(843.15)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid_tables() {
        for table in [
            individual_income_brackets(),
            estate_brackets(),
            gift_brackets(),
            estate_tax_calculator_brackets(),
        ] {
            assert!(BracketTable::new(table.brackets().to_vec()).is_ok());
        }
    }

    #[test]
    fn test_calculator_preset_matches_marginal_bands() {
        let derived = BracketTable::from_marginal_rates(&[
            (Some(dec!(5621)), dec!(0.10)),
            (Some(dec!(11242)), dec!(0.15)),
            (None, dec!(0.20)),
        ])
        .unwrap();
        assert_eq!(derived, estate_tax_calculator_brackets());
    }

    #[test]
    fn test_individual_preset_top_bracket() {
        // 20M × 45% − 1,345,100
        let tax = individual_income_brackets().tax(dec!(20_000_000));
        assert_eq!(tax, dec!(7_654_900));
        assert!(tax > Decimal::ZERO);
    }
}
