use family_office_core::dividend_policy::shareholder_tax::{
    resolve_shareholder_tax, run_shareholder_tax, IndividualTaxMode, ShareholderKind,
    ShareholderProfile, ShareholderTaxInput,
};
use family_office_core::dividend_policy::simulator::{
    run_dividend_policy, simulate_dividend_policy, DistributionSplit, DividendPolicyInput,
    LegalReservePolicy,
};
use family_office_core::dividend_policy::single_year::{run_single_year, SingleYearInput};
use family_office_core::tax_tables::ShareholderTaxRules;
use family_office_core::FamilyOfficeError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Shareholder tax
// ===========================================================================

fn individual(mode: IndividualTaxMode, other_income: Decimal) -> ShareholderProfile {
    ShareholderProfile {
        kind: ShareholderKind::IndividualResident,
        mode,
        other_income,
        ..ShareholderProfile::default()
    }
}

#[test]
fn test_flat_separate_individual_dividend() {
    let rules = ShareholderTaxRules::default();
    let profile = individual(IndividualTaxMode::FlatSeparate, Decimal::ZERO);
    // 1M × 28%
    assert_eq!(
        resolve_shareholder_tax(dec!(1_000_000), &profile, &rules),
        dec!(280_000)
    );
}

#[test]
fn test_corporate_resident_pays_nothing() {
    let rules = ShareholderTaxRules::default();
    let profile = ShareholderProfile {
        kind: ShareholderKind::CorporateResident,
        ..ShareholderProfile::default()
    };
    assert_eq!(
        resolve_shareholder_tax(dec!(50_000_000), &profile, &rules),
        Decimal::ZERO
    );
}

#[test]
fn test_nonresident_withholding() {
    let rules = ShareholderTaxRules::default();
    let profile = ShareholderProfile {
        kind: ShareholderKind::Nonresident,
        nonresident_withholding_rate: dec!(0.10),
        ..ShareholderProfile::default()
    };
    assert_eq!(
        resolve_shareholder_tax(dec!(2_000_000), &profile, &rules),
        dec!(200_000)
    );
}

#[test]
fn test_integrated_mode_credit_is_capped() {
    let rules = ShareholderTaxRules::default();
    let profile = individual(IndividualTaxMode::ProgressiveIntegrated, dec!(20_000_000));
    // Top bracket: 45% × 5M = 2.25M incremental; credit min(425k, 80k) = 80k
    assert_eq!(
        resolve_shareholder_tax(dec!(5_000_000), &profile, &rules),
        dec!(2_170_000)
    );
}

#[test]
fn test_integrated_mode_floors_at_zero() {
    let rules = ShareholderTaxRules::default();
    let profile = individual(IndividualTaxMode::ProgressiveIntegrated, Decimal::ZERO);
    // 100k × 5% = 5k incremental, credit 8.5k
    assert_eq!(
        resolve_shareholder_tax(dec!(100_000), &profile, &rules),
        Decimal::ZERO
    );
}

#[test]
fn test_run_shareholder_tax_reports_effective_rate() {
    let input = ShareholderTaxInput {
        amount: dec!(1_000_000),
        shareholder: individual(IndividualTaxMode::FlatSeparate, Decimal::ZERO),
    };
    let out = run_shareholder_tax(&input, &ShareholderTaxRules::default()).unwrap();
    assert_eq!(out.result.shareholder_tax, dec!(280_000));
    assert_eq!(out.result.effective_rate, dec!(0.28));
}

#[test]
fn test_run_shareholder_tax_rejects_negative_amount() {
    let input = ShareholderTaxInput {
        amount: dec!(-1),
        shareholder: ShareholderProfile::default(),
    };
    let err = run_shareholder_tax(&input, &ShareholderTaxRules::default()).unwrap_err();
    assert!(matches!(err, FamilyOfficeError::InvalidInput { .. }));
}

// ===========================================================================
// Multi-year simulator
// ===========================================================================

fn retain_everything(years: u32) -> DividendPolicyInput {
    DividendPolicyInput {
        years,
        ..DividendPolicyInput::default()
    }
}

#[test]
fn test_corporate_tax_uses_higher_of_ordinary_and_amt() {
    let out = simulate_dividend_policy(&retain_everything(1), &ShareholderTaxRules::default());
    let y1 = &out.per_year[0];
    assert_eq!(y1.corporate_tax, dec!(4_000_000));
    assert_eq!(y1.after_tax_profit, dec!(16_000_000));
}

#[test]
fn test_retaining_everything_accrues_surtax_only() {
    let out = simulate_dividend_policy(&retain_everything(3), &ShareholderTaxRules::default());
    for row in &out.per_year {
        assert_eq!(row.cash_dividend, Decimal::ZERO);
        assert_eq!(row.stock_dividend, Decimal::ZERO);
        assert_eq!(row.shareholder_tax, Decimal::ZERO);
        assert_eq!(row.undistributed_tax, row.retained * dec!(0.05));
    }
    // Reserve hits 25% of the unchanged 1M capital in year one and stays there
    assert_eq!(out.totals.final_legal_reserve, dec!(250_000));
    assert_eq!(out.per_year[1].legal_reserve_accrual, Decimal::ZERO);
    assert_eq!(out.totals.final_capital, dec!(1_000_000));
}

#[test]
fn test_reserve_disabled_means_no_accrual() {
    let input = DividendPolicyInput {
        legal_reserve: LegalReservePolicy {
            enabled: false,
            ..LegalReservePolicy::default()
        },
        ..retain_everything(4)
    };
    let out = simulate_dividend_policy(&input, &ShareholderTaxRules::default());
    assert_eq!(out.totals.final_legal_reserve, Decimal::ZERO);
    assert_eq!(out.totals.final_retained_earnings, dec!(64_000_000));
}

#[test]
fn test_seeded_capital_surplus_converts_into_capital() {
    let input = DividendPolicyInput {
        initial_capital_surplus: dec!(250_000),
        capital_surplus_conversion: dec!(100_000),
        ..retain_everything(4)
    };
    let out = simulate_dividend_policy(&input, &ShareholderTaxRules::default());
    let surplus: Vec<Decimal> = out
        .per_year
        .iter()
        .map(|r| r.closing_capital_surplus)
        .collect();
    assert_eq!(
        surplus,
        vec![dec!(150_000), dec!(50_000), Decimal::ZERO, Decimal::ZERO]
    );
    assert_eq!(out.totals.final_capital, dec!(1_250_000));
}

#[test]
fn test_phase_switch_changes_split() {
    let input = DividendPolicyInput {
        years: 4,
        phase1_years: 2,
        phase1: DistributionSplit {
            cash_pct: Decimal::ZERO,
            stock_pct: dec!(0.20),
        },
        phase2: DistributionSplit {
            cash_pct: dec!(0.60),
            stock_pct: Decimal::ZERO,
        },
        ..DividendPolicyInput::default()
    };
    let out = simulate_dividend_policy(&input, &ShareholderTaxRules::default());
    assert!(out.per_year[..2]
        .iter()
        .all(|r| r.cash_dividend.is_zero() && r.stock_dividend > Decimal::ZERO));
    assert!(out.per_year[2..]
        .iter()
        .all(|r| r.stock_dividend.is_zero() && r.cash_dividend > Decimal::ZERO));
}

#[test]
fn test_zero_years_returns_opening_state() {
    let out = simulate_dividend_policy(&retain_everything(0), &ShareholderTaxRules::default());
    assert!(out.per_year.is_empty());
    assert_eq!(out.totals.total_tax, Decimal::ZERO);
    assert_eq!(out.totals.final_capital, dec!(1_000_000));
    assert_eq!(out.totals.final_equity, dec!(1_000_000));
}

#[test]
fn test_run_dividend_policy_rejects_zero_years() {
    let err = run_dividend_policy(&retain_everything(0), &ShareholderTaxRules::default())
        .unwrap_err();
    assert!(matches!(err, FamilyOfficeError::InvalidInput { ref field, .. } if field == "years"));
}

#[test]
fn test_run_dividend_policy_warns_on_overlapping_split() {
    let input = DividendPolicyInput {
        years: 2,
        phase1_years: 1,
        phase2: DistributionSplit {
            cash_pct: dec!(0.70),
            stock_pct: dec!(0.50),
        },
        ..DividendPolicyInput::default()
    };
    let out = run_dividend_policy(&input, &ShareholderTaxRules::default()).unwrap();
    assert!(out.warnings.iter().any(|w| w.starts_with("phase2")));
    assert_eq!(out.result.per_year[1].retained, Decimal::ZERO);
}

#[test]
fn test_run_dividend_policy_rejects_rate_above_one() {
    let input = DividendPolicyInput {
        corp_tax_rate: dec!(1.2),
        ..retain_everything(2)
    };
    assert!(run_dividend_policy(&input, &ShareholderTaxRules::default()).is_err());
}

#[test]
fn test_simulation_is_deterministic() {
    let input = DividendPolicyInput {
        phase1: DistributionSplit {
            cash_pct: dec!(0.3),
            stock_pct: dec!(0.1),
        },
        ..DividendPolicyInput::default()
    };
    let rules = ShareholderTaxRules::default();
    assert_eq!(
        simulate_dividend_policy(&input, &rules),
        simulate_dividend_policy(&input, &rules)
    );
}

// ===========================================================================
// Single-year assessment
// ===========================================================================

#[test]
fn test_single_year_matches_first_simulated_year() {
    let split = DistributionSplit {
        cash_pct: dec!(0.40),
        stock_pct: dec!(0.10),
    };
    let single = SingleYearInput {
        split: split.clone(),
        ..SingleYearInput::default()
    };
    let multi = DividendPolicyInput {
        years: 1,
        phase1: split,
        ..DividendPolicyInput::default()
    };
    let rules = ShareholderTaxRules::default();

    let assessed = run_single_year(&single, &rules).unwrap().result;
    let simulated = simulate_dividend_policy(&multi, &rules);
    let row = &simulated.per_year[0];

    assert_eq!(assessed.corporate_tax, row.corporate_tax);
    assert_eq!(assessed.cash_dividend, row.cash_dividend);
    assert_eq!(assessed.stock_dividend, row.stock_dividend);
    assert_eq!(assessed.shareholder_tax, row.shareholder_tax);
    assert_eq!(assessed.total_tax, row.total_tax);
    assert_eq!(
        assessed.effective_tax_rate,
        row.total_tax / assessed.pretax_profit
    );
}
