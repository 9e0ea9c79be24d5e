use founder_finance_core::runway::simulator::{
    apply_preset, compare_runway_scenarios, simulate_runway, RunwayInput, RunwayPreset,
    ScenarioSide,
};
use founder_finance_core::Runway;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn seed_company() -> RunwayInput {
    RunwayInput {
        cash_on_hand: dec!(2_000_000),
        monthly_expenses: dec!(150_000),
        monthly_revenue: dec!(40_000),
        expense_growth: dec!(0.10),
        revenue_growth: dec!(0.60),
        preset: None,
        horizon_months: 60,
    }
}

#[test]
fn test_cash_recurrence_holds_every_month() {
    let out = simulate_runway(&seed_company()).unwrap().result;
    // Trajectory figures are rounded to cents.
    let tolerance = dec!(0.02);
    let mut cash = dec!(2_000_000);
    for month in &out.trajectory {
        assert!((month.net_burn - (month.expenses - month.revenue)).abs() <= tolerance);
        if month.cash > Decimal::ZERO {
            assert!((month.cash - (cash - month.net_burn)).abs() <= tolerance);
        }
        cash = month.cash;
    }
    assert!(out.zero_cash_month.is_some());
}

#[test]
fn test_zero_net_burn_is_infinite() {
    let input = RunwayInput {
        monthly_revenue: dec!(150_000),
        expense_growth: dec!(0),
        revenue_growth: dec!(0),
        ..seed_company()
    };
    let out = simulate_runway(&input).unwrap().result;
    assert_eq!(out.runway, Runway::Infinite);
    assert_eq!(out.zero_cash_month, None);
}

#[test]
fn test_zero_cash_with_burn_depletes_immediately() {
    let input = RunwayInput {
        cash_on_hand: dec!(0),
        ..seed_company()
    };
    let out = simulate_runway(&input).unwrap().result;
    assert_eq!(out.runway, Runway::Months(dec!(1)));
    assert_eq!(out.trajectory.len(), 1);
}

#[test]
fn test_winter_outlasts_growth_push() {
    let winter = RunwayInput {
        preset: Some(RunwayPreset::Winter),
        ..seed_company()
    };
    let push = RunwayInput {
        preset: Some(RunwayPreset::GrowthPush),
        ..seed_company()
    };
    let cmp = compare_runway_scenarios(&winter, &push).unwrap().result;
    assert_eq!(cmp.longer_runway, ScenarioSide::A);
    assert!(cmp.scenario_a.runway > cmp.scenario_b.runway);
}

#[test]
fn test_identical_scenarios_tie() {
    let cmp = compare_runway_scenarios(&seed_company(), &seed_company())
        .unwrap()
        .result;
    assert_eq!(cmp.longer_runway, ScenarioSide::Tie);
    assert_eq!(cmp.runway_delta, Some(dec!(0)));
    assert!(cmp.monthly_deltas.iter().all(|d| d.delta.is_zero()));
}

#[test]
fn test_presets_are_pure() {
    let input = RunwayInput {
        preset: Some(RunwayPreset::Hire),
        ..seed_company()
    };
    let before = input.clone();
    let eff = apply_preset(&input);
    assert_eq!(input, before);
    assert_eq!(eff.monthly_expenses, dec!(180_000));
    assert_eq!(eff.expense_growth, dec!(0.15));
}

#[test]
fn test_horizon_out_of_range_rejected() {
    let input = RunwayInput {
        horizon_months: 0,
        ..seed_company()
    };
    assert!(simulate_runway(&input).is_err());
}

// ===========================================================================
// Boundaries
// ===========================================================================

#[test]
fn test_zero_cash_and_zero_burn_is_infinite() {
    let input = RunwayInput {
        cash_on_hand: dec!(0),
        monthly_expenses: dec!(50_000),
        monthly_revenue: dec!(50_000),
        expense_growth: dec!(0),
        revenue_growth: dec!(0),
        ..seed_company()
    };
    let out = simulate_runway(&input).unwrap();
    assert_eq!(out.result.runway, Runway::Infinite);
    assert_eq!(out.result.zero_cash_month, None);
    assert_eq!(out.result.trajectory.len(), 60);
    assert!(out.result.trajectory.iter().all(|m| m.cash.is_zero()));
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_negative_cash_rejected() {
    let input = RunwayInput {
        cash_on_hand: dec!(-10_000),
        ..seed_company()
    };
    assert!(simulate_runway(&input).is_err());
}

#[test]
fn test_explosive_revenue_growth_stops_without_panic() {
    // 10x a year for ten years leaves the Decimal range well before month 120.
    let input = RunwayInput {
        revenue_growth: dec!(9),
        horizon_months: 120,
        ..seed_company()
    };
    let out = simulate_runway(&input).unwrap();
    assert_eq!(out.result.runway, Runway::Infinite);
    assert_eq!(out.result.zero_cash_month, None);
    assert!(out.result.trajectory.len() < 120);
    assert!(out.warnings.iter().any(|w| w.contains("representable range")));
}

#[test]
fn test_explosive_growth_on_both_sides_is_infinite() {
    let input = RunwayInput {
        monthly_expenses: dec!(40_000),
        monthly_revenue: dec!(40_000),
        expense_growth: dec!(9),
        revenue_growth: dec!(9),
        horizon_months: 120,
        ..seed_company()
    };
    let out = simulate_runway(&input).unwrap().result;
    assert_eq!(out.runway, Runway::Infinite);
}

// ===========================================================================
// Comparison
// ===========================================================================

#[test]
fn test_compare_rejects_unequal_horizons() {
    let a = RunwayInput {
        horizon_months: 12,
        ..seed_company()
    };
    let b = RunwayInput {
        horizon_months: 60,
        ..seed_company()
    };
    assert!(compare_runway_scenarios(&a, &b).is_err());
}

#[test]
fn test_compare_carries_scenario_warnings() {
    let a = RunwayInput {
        cash_on_hand: dec!(0),
        ..seed_company()
    };
    let out = compare_runway_scenarios(&a, &seed_company()).unwrap();
    assert!(out.warnings.iter().any(|w| w.starts_with("Scenario A:")));
    assert!(!out.warnings.iter().any(|w| w.starts_with("Scenario B:")));
}

#[test]
fn test_compare_surviving_side_keeps_cash_after_other_depletes() {
    let rich = RunwayInput {
        cash_on_hand: dec!(50_000_000),
        ..seed_company()
    };
    let cmp = compare_runway_scenarios(&seed_company(), &rich).unwrap().result;
    let last = cmp.monthly_deltas.last().unwrap();
    assert_eq!(last.cash_a, Decimal::ZERO);
    assert!(last.cash_b > Decimal::ZERO);
}
