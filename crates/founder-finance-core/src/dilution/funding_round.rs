use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::cap_table::{sum_shares, CapTable, StakeholderKind};
use crate::error::FounderFinanceError;
use crate::format::{format_currency_compact, format_percent, format_runway, format_shares};
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money, Rate, Runway};
use crate::FounderFinanceResult;

const HUNDRED: Decimal = dec!(100);

// ─── Structs ─────────────────────────────────────────────────────────────────

/// A proposed raise against the current cap table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRoundInput {
    /// Round label, e.g. "Seed" or "Series A".
    pub name: String,
    pub raise_amount: Money,
    pub pre_money_valuation: Money,
    /// Post-round pool target as a decimal (0.15 = 15%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pool_percent: Option<Rate>,
    /// Expand the pool pre-money, diluting existing holders only.
    #[serde(default)]
    pub option_pool_shuffle: bool,
    #[serde(default)]
    pub cash_on_hand: Money,
    #[serde(default)]
    pub monthly_burn: Money,
}

/// Ownership change for one existing stakeholder. Percentages are 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeholderDilution {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StakeholderKind,
    pub shares: u64,
    pub pre_round_ownership: Decimal,
    pub post_round_ownership: Decimal,
    pub absolute_dilution: Decimal,
    /// Absolute dilution as a percentage of the pre-round stake.
    pub relative_dilution: Decimal,
}

/// Extra months of survival bought by the raise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayBridge {
    pub current_runway: Runway,
    pub cash_after_raise: Money,
    pub new_runway: Runway,
    pub additional_runway: Runway,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRoundResult {
    pub round_name: String,
    pub pre_money_valuation: Money,
    pub post_money_valuation: Money,
    pub price_per_share: Money,
    pub new_investor_shares: u64,
    /// `raise / post_money`, as a percentage.
    pub investor_ownership_percent: Decimal,
    pub shuffle_applied: bool,
    pub additional_pool_shares: u64,
    /// Fraction by which non-investor post-round ownership is discounted.
    pub shuffle_impact: Decimal,
    pub total_shares_post_round: u64,
    pub stakeholders: Vec<StakeholderDilution>,
    /// Pool shares not carried by a stakeholder row, as a percentage.
    pub option_pool_post_percent: Decimal,
    pub founder_ownership_post: Decimal,
    pub founder_relative_dilution: Decimal,
    pub runway_bridge: RunwayBridge,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundComparison {
    pub rounds: Vec<FundingRoundResult>,
    /// Index into `rounds` of the round with the least founder dilution.
    pub best_round_index: usize,
    pub best_round_name: String,
    pub insights: Vec<String>,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn share_range_error(field: &str) -> FounderFinanceError {
    FounderFinanceError::InvalidInput {
        field: field.into(),
        reason: "Resulting share count exceeds the supported range".into(),
    }
}

fn round_shares(field: &str, d: Decimal) -> FounderFinanceResult<u64> {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| share_range_error(field))
}

fn validate_round(input: &FundingRoundInput) -> FounderFinanceResult<()> {
    if input.pre_money_valuation <= Decimal::ZERO {
        return Err(FounderFinanceError::InvalidInput {
            field: "pre_money_valuation".into(),
            reason: "Pre-money valuation must be positive".into(),
        });
    }
    if input.raise_amount <= Decimal::ZERO {
        return Err(FounderFinanceError::InvalidInput {
            field: "raise_amount".into(),
            reason: "Raise amount must be positive".into(),
        });
    }
    require_non_negative("cash_on_hand", input.cash_on_hand)?;
    if let Some(target) = input.target_pool_percent {
        if target < Decimal::ZERO || target >= Decimal::ONE {
            return Err(FounderFinanceError::InvalidInput {
                field: "target_pool_percent".into(),
                reason: "Target pool percentage must be a decimal in [0, 1)".into(),
            });
        }
    }
    Ok(())
}

/// Runway before and after adding the raise to cash. Zero or negative burn
/// makes every figure infinite.
pub fn runway_bridge(cash_on_hand: Money, raise_amount: Money, monthly_burn: Money) -> RunwayBridge {
    let current_runway = Runway::from_cash_and_burn(cash_on_hand, monthly_burn);
    let cash_after_raise = cash_on_hand + raise_amount;
    let new_runway = Runway::from_cash_and_burn(cash_after_raise, monthly_burn);
    RunwayBridge {
        current_runway,
        cash_after_raise,
        new_runway,
        additional_runway: new_runway.gain_over(&current_runway),
    }
}

fn round_insights(result: &FundingRoundResult) -> Vec<String> {
    let mut insights = vec![format!(
        "{}: new investor takes {}% for {} shares at {} per share.",
        result.round_name,
        result.investor_ownership_percent.round_dp(2),
        format_shares(result.new_investor_shares),
        result.price_per_share.round_dp(4)
    )];

    if result.founder_ownership_post > Decimal::ZERO && result.founder_ownership_post < dec!(50) {
        insights.push(format!(
            "Founders drop below majority control at {}% combined.",
            result.founder_ownership_post.round_dp(2)
        ));
    }

    if result.shuffle_applied {
        insights.push(format!(
            "The option pool shuffle adds {} pool shares pre-money and discounts existing holders by {}.",
            format_shares(result.additional_pool_shares),
            format_percent(result.shuffle_impact, 1)
        ));
    }

    let bridge = &result.runway_bridge;
    match bridge.new_runway {
        Runway::Infinite => {}
        r if r.shorter_than(dec!(18)) => insights.push(format!(
            "Runway after the raise is only {}; plan for the next round immediately.",
            format_runway(&r)
        )),
        r if !r.shorter_than(dec!(24)) => insights.push(format!(
            "Raise extends runway to {} ({} cash), enough to hit milestones before the next round.",
            format_runway(&r),
            format_currency_compact(bridge.cash_after_raise)
        )),
        r => insights.push(format!("Raise extends runway to {}.", format_runway(&r))),
    }

    insights
}

// ─── Function 1: model_funding_round ─────────────────────────────────────────

fn compute_round(
    cap_table: &CapTable,
    input: &FundingRoundInput,
) -> FounderFinanceResult<(FundingRoundResult, Vec<String>)> {
    cap_table.validate()?;
    validate_round(input)?;

    let mut warnings = Vec::new();
    let accounted = cap_table.accounted_shares()?;
    if accounted < cap_table.total_shares {
        warnings.push(format!(
            "{} shares not accounted for by stakeholders or the option pool",
            cap_table.total_shares - accounted
        ));
    }

    let total = Decimal::from(cap_table.total_shares);
    let post_money = input
        .pre_money_valuation
        .checked_add(input.raise_amount)
        .ok_or_else(|| FounderFinanceError::InvalidInput {
            field: "raise_amount".into(),
            reason: "Post-money valuation exceeds the supported range".into(),
        })?;
    let price_per_share = input.pre_money_valuation / total;
    let new_investor_shares = input
        .raise_amount
        .checked_div(price_per_share)
        .ok_or_else(|| share_range_error("raise_amount"))
        .and_then(|shares| round_shares("raise_amount", shares))?;
    let investor_ownership = input.raise_amount / post_money;

    // ── Option pool shuffle ──────────────────────────────────────────
    //
    // The pool is topped up to `target` of the post-round share count. The
    // expansion is carried by pre-round holders only, so each non-investor
    // stake is discounted by `(target - current) / (1 - investor_ownership)`.
    let current_pool = cap_table.option_pool_percent;
    let target_pool = input.target_pool_percent.unwrap_or(current_pool);
    let shuffle_applied = input.option_pool_shuffle && target_pool > current_pool;

    let (additional_pool_shares, shuffle_impact) = if shuffle_applied {
        if target_pool + investor_ownership >= Decimal::ONE {
            return Err(FounderFinanceError::FinancialImpossibility(format!(
                "Pool target {target_pool} plus investor stake {} leaves nothing for existing holders",
                investor_ownership.round_dp(4)
            )));
        }
        let post_round_shares = total / (Decimal::ONE - investor_ownership);
        let needed = post_round_shares
            .checked_mul(target_pool)
            .ok_or_else(|| share_range_error("target_pool_percent"))?
            - total * current_pool;
        let additional = round_shares("target_pool_percent", needed.max(Decimal::ZERO))?;
        let impact = (target_pool - current_pool) / (Decimal::ONE - investor_ownership);
        (additional, impact)
    } else {
        if input.option_pool_shuffle {
            warnings.push("Pool already meets target; shuffle skipped".to_string());
        }
        (0, Decimal::ZERO)
    };

    let total_shares_post_round = sum_shares(
        "raise_amount",
        [cap_table.total_shares, new_investor_shares, additional_pool_shares],
    )?;
    let total_post = Decimal::from(total_shares_post_round);
    let discount = Decimal::ONE - shuffle_impact;

    // ── Per-stakeholder dilution ─────────────────────────────────────
    let stakeholders: Vec<StakeholderDilution> = cap_table
        .stakeholders
        .iter()
        .map(|s| {
            let shares = Decimal::from(s.shares);
            let pre = shares / total * HUNDRED;
            let mut post = shares / total_post * HUNDRED;
            if s.kind != StakeholderKind::Investor {
                post *= discount;
            }
            let absolute = pre - post;
            let relative = if pre.is_zero() {
                Decimal::ZERO
            } else {
                absolute / pre * HUNDRED
            };
            StakeholderDilution {
                id: s.id.clone(),
                name: s.name.clone(),
                kind: s.kind,
                shares: s.shares,
                pre_round_ownership: pre.round_dp(4),
                post_round_ownership: post.round_dp(4),
                absolute_dilution: absolute.round_dp(4),
                relative_dilution: relative.round_dp(4),
            }
        })
        .collect();

    // Bounded by `total_shares_post_round`, which was checked above.
    let unlisted_pool = cap_table.unlisted_pool_shares() + additional_pool_shares;
    let option_pool_post_percent = (Decimal::from(unlisted_pool) / total_post * HUNDRED).round_dp(4);

    let founders: Vec<&StakeholderDilution> = stakeholders
        .iter()
        .filter(|s| s.kind == StakeholderKind::Founder)
        .collect();
    let founder_pre: Decimal = founders.iter().map(|s| s.pre_round_ownership).sum();
    let founder_ownership_post: Decimal = founders.iter().map(|s| s.post_round_ownership).sum();
    let founder_relative_dilution = if founder_pre.is_zero() {
        Decimal::ZERO
    } else {
        ((founder_pre - founder_ownership_post) / founder_pre * HUNDRED).round_dp(4)
    };
    if founders.is_empty() {
        warnings.push("No founder stakeholders; founder dilution reported as 0".to_string());
    }

    let runway_bridge = runway_bridge(input.cash_on_hand, input.raise_amount, input.monthly_burn);

    log::debug!(
        "funding round {}: post_money={post_money} investor={} shuffle_impact={shuffle_impact}",
        input.name,
        investor_ownership.round_dp(4)
    );

    let mut result = FundingRoundResult {
        round_name: input.name.clone(),
        pre_money_valuation: input.pre_money_valuation,
        post_money_valuation: post_money,
        price_per_share: price_per_share.round_dp(6),
        new_investor_shares,
        investor_ownership_percent: (investor_ownership * HUNDRED).round_dp(4),
        shuffle_applied,
        additional_pool_shares,
        shuffle_impact: shuffle_impact.round_dp(6),
        total_shares_post_round,
        stakeholders,
        option_pool_post_percent,
        founder_ownership_post,
        founder_relative_dilution,
        runway_bridge,
        insights: Vec::new(),
    };
    result.insights = round_insights(&result);

    Ok((result, warnings))
}

/// Model a priced round: post-money, price per share, investor shares,
/// per-stakeholder dilution with an optional option pool shuffle, and the
/// runway the raise buys.
pub fn model_funding_round(
    cap_table: &CapTable,
    input: &FundingRoundInput,
) -> FounderFinanceResult<ComputationOutput<FundingRoundResult>> {
    let start = Instant::now();
    let (result, warnings) = compute_round(cap_table, input)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Priced funding round (option pool shuffle, runway bridge)",
        &serde_json::json!({
            "round": input.name,
            "raise_amount": input.raise_amount.to_string(),
            "pre_money_valuation": input.pre_money_valuation.to_string(),
            "target_pool_percent": input.target_pool_percent.map(|p| p.to_string()),
            "option_pool_shuffle": input.option_pool_shuffle,
            "total_shares": cap_table.total_shares,
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ─── Function 2: compare_funding_rounds ──────────────────────────────────────

/// Model several alternative rounds against the same cap table and pick the
/// one that dilutes founders least. Ties go to the earlier round.
pub fn compare_funding_rounds(
    cap_table: &CapTable,
    rounds: &[FundingRoundInput],
) -> FounderFinanceResult<ComputationOutput<RoundComparison>> {
    let start = Instant::now();
    if rounds.is_empty() {
        return Err(FounderFinanceError::InsufficientData(
            "At least one round is required for comparison".into(),
        ));
    }

    let mut results = Vec::with_capacity(rounds.len());
    let mut warnings = Vec::new();
    for round in rounds {
        let (result, round_warnings) = compute_round(cap_table, round)?;
        warnings.extend(round_warnings.into_iter().map(|w| format!("{}: {w}", round.name)));
        results.push(result);
    }

    let mut best_round_index = 0;
    for (i, r) in results.iter().enumerate().skip(1) {
        if r.founder_relative_dilution < results[best_round_index].founder_relative_dilution {
            best_round_index = i;
        }
    }
    let best = &results[best_round_index];
    let best_round_name = best.round_name.clone();

    let mut insights = vec![format!(
        "{} dilutes founders least ({}% relative dilution).",
        best.round_name,
        best.founder_relative_dilution.round_dp(2)
    )];
    for (_, r) in results
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != best_round_index)
    {
        insights.push(format!(
            "{} costs founders {} more percentage points of relative dilution.",
            r.round_name,
            (r.founder_relative_dilution - best.founder_relative_dilution).round_dp(2)
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Funding round comparison (minimum founder relative dilution)",
        &serde_json::json!({
            "rounds": rounds.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            "total_shares": cap_table.total_shares,
        }),
        warnings,
        elapsed,
        RoundComparison {
            rounds: results,
            best_round_index,
            best_round_name,
            insights,
        },
    ))
}
