use founder_finance_core::dilution::cap_table::{CapTable, Stakeholder, StakeholderKind};
use founder_finance_core::dilution::funding_round::{
    compare_funding_rounds, model_funding_round, FundingRoundInput,
};
use founder_finance_core::Runway;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn cap_table() -> CapTable {
    CapTable::from_holdings(
        vec![
            Stakeholder::new("f1", "Founder A", StakeholderKind::Founder, 5_000_000),
            Stakeholder::new("f2", "Founder B", StakeholderKind::Founder, 3_000_000),
            Stakeholder::new("e1", "Early Engineer", StakeholderKind::Employee, 500_000),
            Stakeholder::new("a1", "Angel", StakeholderKind::Investor, 500_000),
        ],
        1_000_000,
    )
    .unwrap()
}

fn seed_round() -> FundingRoundInput {
    FundingRoundInput {
        name: "Seed".into(),
        raise_amount: dec!(2_000_000),
        pre_money_valuation: dec!(10_000_000),
        target_pool_percent: None,
        option_pool_shuffle: false,
        cash_on_hand: dec!(300_000),
        monthly_burn: dec!(100_000),
    }
}

// ===========================================================================
// Priced round
// ===========================================================================

#[test]
fn test_seed_round_reference_ownership() {
    let out = model_funding_round(&cap_table(), &seed_round()).unwrap().result;
    assert_eq!(out.post_money_valuation, dec!(12_000_000));
    assert_eq!(out.investor_ownership_percent, dec!(16.6667));
    assert_eq!(out.price_per_share, dec!(1));
    assert_eq!(out.new_investor_shares, 2_000_000);
    assert_eq!(out.total_shares_post_round, 12_000_000);
}

#[test]
fn test_ownership_is_conserved_without_shuffle() {
    let out = model_funding_round(&cap_table(), &seed_round()).unwrap().result;
    let holders: Decimal = out.stakeholders.iter().map(|s| s.post_round_ownership).sum();
    let total = holders + out.investor_ownership_percent + out.option_pool_post_percent;
    assert!(
        (total - dec!(100)).abs() < dec!(0.01),
        "ownership sums to {total}"
    );
}

#[test]
fn test_every_holder_diluted_equally_without_shuffle() {
    let out = model_funding_round(&cap_table(), &seed_round()).unwrap().result;
    for s in &out.stakeholders {
        assert!(s.post_round_ownership < s.pre_round_ownership);
        let gap = s.pre_round_ownership - s.post_round_ownership;
        assert!((s.absolute_dilution - gap).abs() <= dec!(0.0001));
        assert!((s.relative_dilution - dec!(16.6667)).abs() < dec!(0.001));
    }
}

#[test]
fn test_shuffle_dilutes_existing_holders_more() {
    let plain = model_funding_round(&cap_table(), &seed_round()).unwrap().result;
    let shuffled_input = FundingRoundInput {
        target_pool_percent: Some(dec!(0.15)),
        option_pool_shuffle: true,
        ..seed_round()
    };
    let shuffled = model_funding_round(&cap_table(), &shuffled_input).unwrap().result;
    assert!(shuffled.shuffle_applied);
    assert!(shuffled.additional_pool_shares > 0);
    assert!(shuffled.founder_ownership_post < plain.founder_ownership_post);
    // New money is priced on the pre-money table; its stake is unchanged.
    assert_eq!(shuffled.investor_ownership_percent, plain.investor_ownership_percent);
}

#[test]
fn test_shuffle_ignored_when_pool_already_at_target() {
    let input = FundingRoundInput {
        target_pool_percent: Some(dec!(0.05)),
        option_pool_shuffle: true,
        ..seed_round()
    };
    let out = model_funding_round(&cap_table(), &input).unwrap().result;
    assert!(!out.shuffle_applied);
    assert_eq!(out.additional_pool_shares, 0);
}

// ===========================================================================
// Runway bridge
// ===========================================================================

#[test]
fn test_raise_extends_runway() {
    let out = model_funding_round(&cap_table(), &seed_round()).unwrap().result;
    assert_eq!(out.runway_bridge.current_runway, Runway::Months(dec!(3)));
    assert_eq!(out.runway_bridge.new_runway, Runway::Months(dec!(23)));
    assert_eq!(out.runway_bridge.additional_runway, Runway::Months(dec!(20)));
}

#[test]
fn test_zero_burn_bridge_is_infinite() {
    let input = FundingRoundInput {
        monthly_burn: dec!(0),
        ..seed_round()
    };
    let out = model_funding_round(&cap_table(), &input).unwrap().result;
    assert!(out.runway_bridge.current_runway.is_infinite());
    assert!(out.runway_bridge.new_runway.is_infinite());
}

// ===========================================================================
// Round comparison and validation
// ===========================================================================

#[test]
fn test_compare_picks_least_founder_dilution() {
    let rounds = vec![
        FundingRoundInput {
            name: "Party round".into(),
            pre_money_valuation: dec!(6_000_000),
            ..seed_round()
        },
        seed_round(),
        FundingRoundInput {
            name: "Seed + shuffle".into(),
            target_pool_percent: Some(dec!(0.20)),
            option_pool_shuffle: true,
            ..seed_round()
        },
    ];
    let out = compare_funding_rounds(&cap_table(), &rounds).unwrap().result;
    assert_eq!(out.rounds.len(), 3);
    assert_eq!(out.best_round_index, 1);
    assert_eq!(out.best_round_name, "Seed");
}

#[test]
fn test_overallocated_cap_table_rejected() {
    let mut table = cap_table();
    table.total_shares = 5_000_000;
    assert!(model_funding_round(&table, &seed_round()).is_err());
}

#[test]
fn test_non_positive_pre_money_rejected() {
    let input = FundingRoundInput {
        pre_money_valuation: dec!(0),
        ..seed_round()
    };
    assert!(model_funding_round(&cap_table(), &input).is_err());
}

#[test]
fn test_duplicate_round_names_keep_every_insight() {
    let rounds = vec![
        seed_round(),
        FundingRoundInput {
            pre_money_valuation: dec!(6_000_000),
            ..seed_round()
        },
    ];
    let out = compare_funding_rounds(&cap_table(), &rounds).unwrap().result;
    assert_eq!(out.best_round_index, 0);
    assert_eq!(out.insights.len(), 2);
    assert!(out.insights[1].contains("more percentage points"));
}

#[test]
fn test_share_count_beyond_u64_rejected() {
    let input = FundingRoundInput {
        pre_money_valuation: dec!(1),
        raise_amount: dec!(100_000_000_000_000_000_000),
        ..seed_round()
    };
    let err = model_funding_round(&cap_table(), &input).unwrap_err();
    assert!(matches!(
        err,
        founder_finance_core::FounderFinanceError::InvalidInput { .. }
    ));
}
