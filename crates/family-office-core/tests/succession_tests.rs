use family_office_core::succession::heirs::{normalize_heirs, Heir};
use family_office_core::succession::scenarios::{
    compare_transfer_strategies, run_estate_comparison, EstateComparisonInput,
    EstateComparisonOutput, ScenarioOutcome, TransferStrategy,
};
use family_office_core::tax_tables::{BracketTable, TransferTaxTables};
use family_office_core::FamilyOfficeError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn scenario(out: &EstateComparisonOutput, strategy: TransferStrategy) -> &ScenarioOutcome {
    out.scenarios
        .iter()
        .find(|s| s.strategy == strategy)
        .unwrap()
}

fn no_gifting() -> EstateComparisonInput {
    EstateComparisonInput {
        years_of_gifting: 0,
        ..EstateComparisonInput::default()
    }
}

// ===========================================================================
// Scenario comparison
// ===========================================================================

#[test]
fn test_no_gifting_collapses_gifting_into_retain() {
    let out = compare_transfer_strategies(&no_gifting(), &TransferTaxTables::default());
    let a = scenario(&out, TransferStrategy::RetainUntilDeath);
    let b = scenario(&out, TransferStrategy::MultiYearGifting);

    assert_eq!(a.gross_estate, dec!(550_000_000));
    assert_eq!(b.gross_estate, a.gross_estate);
    assert_eq!(b.estate_tax, a.estate_tax);
    assert_eq!(b.net_to_heirs, a.net_to_heirs);
    assert_eq!(b.gift_tax, Decimal::ZERO);
    assert_eq!(out.total_gifted, Decimal::ZERO);
}

#[test]
fn test_scenarios_are_in_strategy_order() {
    let out = compare_transfer_strategies(
        &EstateComparisonInput::default(),
        &TransferTaxTables::default(),
    );
    let order: Vec<TransferStrategy> = out.scenarios.iter().map(|s| s.strategy).collect();
    assert_eq!(order, TransferStrategy::ALL.to_vec());
}

#[test]
fn test_gift_tax_charged_on_excess_over_exclusion() {
    let input = EstateComparisonInput {
        annual_exclusion: dec!(4_000_000),
        years_of_gifting: 3,
        ..EstateComparisonInput::default()
    };
    let out = compare_transfer_strategies(&input, &TransferTaxTables::default());
    let b = scenario(&out, TransferStrategy::MultiYearGifting);
    // 6M taxable each year at 10%
    assert_eq!(b.gift_tax, dec!(1_800_000));
    assert_eq!(out.total_gifted, dec!(30_000_000));
    assert_eq!(b.gross_estate, dec!(520_000_000));
}

#[test]
fn test_gifts_above_net_worth_floor_estate_at_zero() {
    let input = EstateComparisonInput {
        equity_value: dec!(10_000_000),
        personal_assets: Decimal::ZERO,
        years_of_gifting: 2,
        annual_gift: dec!(10_000_000),
        ..EstateComparisonInput::default()
    };
    let out = compare_transfer_strategies(&input, &TransferTaxTables::default());
    let b = scenario(&out, TransferStrategy::MultiYearGifting);
    assert_eq!(b.gross_estate, Decimal::ZERO);
    assert_eq!(b.estate_tax, Decimal::ZERO);
}

#[test]
fn test_estate_below_exemption_is_untaxed() {
    let input = EstateComparisonInput {
        equity_value: dec!(10_000_000),
        personal_assets: dec!(2_000_000),
        ..no_gifting()
    };
    let out = compare_transfer_strategies(&input, &TransferTaxTables::default());
    assert!(out
        .scenarios
        .iter()
        .all(|s| s.taxable_estate.is_zero() && s.estate_tax.is_zero()));
}

#[test]
fn test_custom_flat_estate_table() {
    let tables = TransferTaxTables {
        estate: BracketTable::from_marginal_rates(&[(None, dec!(0.5))]).unwrap(),
        ..TransferTaxTables::default()
    };
    let input = EstateComparisonInput {
        estate_exemption: Decimal::ZERO,
        ..no_gifting()
    };
    let out = compare_transfer_strategies(&input, &tables);
    let a = scenario(&out, TransferStrategy::RetainUntilDeath);
    assert_eq!(a.estate_tax, dec!(275_000_000));
    assert_eq!(a.net_to_heirs, dec!(275_000_000));
}

// ===========================================================================
// Heirs and allocation
// ===========================================================================

#[test]
fn test_default_heirs_split_evenly() {
    let out = compare_transfer_strategies(&no_gifting(), &TransferTaxTables::default());
    assert_eq!(out.heirs.len(), 2);
    assert_eq!(out.allocations.len(), 8);
    let a = scenario(&out, TransferStrategy::RetainUntilDeath);
    for alloc in out
        .allocations
        .iter()
        .filter(|al| al.strategy == TransferStrategy::RetainUntilDeath)
    {
        assert_eq!(alloc.share, dec!(0.5));
        assert_eq!(alloc.amount, a.net_to_heirs * dec!(0.5));
    }
}

#[test]
fn test_weighted_heirs_allocation_sums_to_net() {
    let input = EstateComparisonInput {
        heirs: vec![Heir::new("Elder", dec!(3)), Heir::new("Younger", dec!(1))],
        ..EstateComparisonInput::default()
    };
    let out = compare_transfer_strategies(&input, &TransferTaxTables::default());
    for s in &out.scenarios {
        let allocated: Decimal = out
            .allocations
            .iter()
            .filter(|al| al.strategy == s.strategy)
            .map(|al| al.amount)
            .sum();
        assert_eq!(allocated, s.net_to_heirs);
    }
    assert_eq!(out.heirs[0].share, dec!(0.75));
}

#[test]
fn test_normalize_keeps_names_and_order() {
    let heirs = normalize_heirs(&[
        Heir::new("C", dec!(1)),
        Heir::new("A", dec!(1)),
        Heir::new("B", dec!(2)),
    ]);
    let names: Vec<&str> = heirs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["C", "A", "B"]);
    assert_eq!(heirs[2].share, dec!(0.5));
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_run_comparison_warns_on_default_heirs() {
    let out = run_estate_comparison(&no_gifting(), &TransferTaxTables::default()).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("No heirs supplied")));
    assert_eq!(out.result.best_strategy, TransferStrategy::RetainUntilDeath);
}

#[test]
fn test_run_comparison_rejects_negative_share() {
    let input = EstateComparisonInput {
        heirs: vec![Heir::new("A", dec!(1)), Heir::new("B", dec!(-0.5))],
        ..EstateComparisonInput::default()
    };
    let err = run_estate_comparison(&input, &TransferTaxTables::default()).unwrap_err();
    assert!(matches!(err, FamilyOfficeError::InvalidInput { .. }));
}

#[test]
fn test_run_comparison_rejects_negative_assets() {
    let input = EstateComparisonInput {
        personal_assets: dec!(-1),
        ..EstateComparisonInput::default()
    };
    assert!(run_estate_comparison(&input, &TransferTaxTables::default()).is_err());
}
