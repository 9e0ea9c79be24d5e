use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::scenarios::{calculate_nrr, derive_scenarios, BaseRates, GrowthScenario};
use crate::error::FounderFinanceError;
use crate::format::{format_currency_compact, format_percent};
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money, Rate};
use crate::FounderFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const DEFAULT_MONTHS: u32 = 24;
const MAX_MONTHS: u32 = 120;

fn default_months() -> u32 {
    DEFAULT_MONTHS
}

// ─── Structs ─────────────────────────────────────────────────────────────────

/// Starting point and acquisition assumptions for an MRR projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthInput {
    pub current_mrr: Money,
    /// Average revenue per account (monthly).
    pub arpa: Money,
    pub new_customers_per_month: Decimal,
    /// Projection horizon. Defaults to 24.
    #[serde(default = "default_months")]
    pub months: u32,
    /// ARR milestone to locate within the horizon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_arr: Option<Money>,
    /// First projected month; enables calendar month labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// One month of the MRR waterfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrrBreakdown {
    /// 1-based month number.
    pub month_index: u32,
    pub month_label: String,
    pub starting_mrr: Money,
    pub new_mrr: Money,
    pub expansion_mrr: Money,
    pub churn_mrr: Money,
    pub contraction_mrr: Money,
    /// `max(0, starting + new + expansion - churn - contraction)`
    pub pre_growth_mrr: Money,
    /// Compounding growth layered on the waterfall result.
    pub compounding_mrr: Money,
    pub net_new_mrr: Money,
    pub ending_mrr: Money,
    pub arr: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub starting_mrr: Money,
    pub ending_mrr: Money,
    pub ending_arr: Money,
    pub mrr_12: Option<Money>,
    pub arr_12: Option<Money>,
    pub mrr_24: Option<Money>,
    pub arr_24: Option<Money>,
    pub cagr_1y: Option<Rate>,
    pub cagr_2y: Option<Rate>,
    pub nrr: Rate,
    pub total_new_mrr: Money,
    pub total_expansion_mrr: Money,
    pub total_churn_mrr: Money,
    pub total_contraction_mrr: Money,
    pub total_compounding_mrr: Money,
    /// `(new + expansion) / (churn + contraction)` over the horizon.
    pub quick_ratio: Option<Decimal>,
    /// First month (1-based) in which ARR reaches the target.
    pub months_to_target_arr: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthProjection {
    pub scenario: GrowthScenario,
    pub breakdown: Vec<MrrBreakdown>,
    pub summary: GrowthSummary,
    pub insights: Vec<String>,
}

/// The three derived scenarios projected from one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub conservative: GrowthProjection,
    pub base: GrowthProjection,
    pub optimistic: GrowthProjection,
    /// `optimistic.arr_24 - conservative.arr_24`
    pub spread_at_24: Option<Money>,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Compound annual growth rate.
///
/// A non-positive start or horizon yields 0; a non-positive end yields -1
/// (everything lost). Neither case is an error.
pub fn calculate_cagr(start: Money, end: Money, years: Decimal) -> Rate {
    if start <= Decimal::ZERO || years <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if end <= Decimal::ZERO {
        return dec!(-1);
    }
    let Some(ratio) = end.checked_div(start) else {
        log::warn!("CAGR ratio overflowed for {end} / {start}");
        return Decimal::ZERO;
    };
    match ratio.checked_powd(Decimal::ONE / years) {
        Some(growth) => growth - Decimal::ONE,
        None => {
            log::warn!("CAGR power overflowed for ratio {ratio} over {years} years");
            Decimal::ZERO
        }
    }
}

fn month_label(start_date: Option<NaiveDate>, month_index: u32) -> String {
    start_date
        .and_then(|d| d.checked_add_months(Months::new(month_index - 1)))
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("M{month_index}"))
}

fn validate(input: &GrowthInput) -> FounderFinanceResult<()> {
    require_non_negative("current_mrr", input.current_mrr)?;
    require_non_negative("arpa", input.arpa)?;
    require_non_negative("new_customers_per_month", input.new_customers_per_month)?;
    if input.months == 0 || input.months > MAX_MONTHS {
        return Err(FounderFinanceError::InvalidInput {
            field: "months".into(),
            reason: format!("Projection horizon must be between 1 and {MAX_MONTHS} months"),
        });
    }
    if let Some(target) = input.target_arr {
        if target <= Decimal::ZERO {
            return Err(FounderFinanceError::InvalidInput {
                field: "target_arr".into(),
                reason: "Target ARR must be positive".into(),
            });
        }
    }
    Ok(())
}

// ─── Core recurrence ─────────────────────────────────────────────────────────

fn out_of_range(scenario: &GrowthScenario, month_index: u32) -> FounderFinanceError {
    FounderFinanceError::FinancialImpossibility(format!(
        "MRR for scenario '{}' exceeds the representable range in month {month_index}",
        scenario.label
    ))
}

fn checked_total(mut values: impl Iterator<Item = Money>) -> Option<Money> {
    values.try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Run the waterfall for `input.months` months. Deterministic: the same
/// inputs always produce the same sequence.
///
/// Churn, contraction and expansion are unit rates, so each is bounded by the
/// starting MRR; only the additions and the compounding step are checked.
fn run_waterfall(
    input: &GrowthInput,
    scenario: &GrowthScenario,
) -> FounderFinanceResult<Vec<MrrBreakdown>> {
    let growth_step = Decimal::ONE + scenario.monthly_growth_rate / MONTHS_PER_YEAR;
    let new_mrr = input
        .new_customers_per_month
        .checked_mul(input.arpa)
        .ok_or_else(|| out_of_range(scenario, 1))?;
    let mut mrr = input.current_mrr;
    let mut breakdown = Vec::with_capacity(input.months as usize);

    for month_index in 1..=input.months {
        let expansion_mrr = mrr * scenario.expansion_rate;
        let churn_mrr = mrr * scenario.churn_rate;
        let contraction_mrr = mrr * scenario.contraction_rate;

        let gross = mrr
            .checked_add(new_mrr)
            .and_then(|v| v.checked_add(expansion_mrr))
            .ok_or_else(|| out_of_range(scenario, month_index))?;
        let waterfall = gross - churn_mrr - contraction_mrr;
        if waterfall < Decimal::ZERO {
            log::warn!("MRR clamped to zero in month {month_index} ({})", scenario.label);
        }
        let pre_growth_mrr = waterfall.max(Decimal::ZERO);
        let ending_mrr = pre_growth_mrr
            .checked_mul(growth_step)
            .ok_or_else(|| out_of_range(scenario, month_index))?;
        let arr = ending_mrr
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or_else(|| out_of_range(scenario, month_index))?;

        breakdown.push(MrrBreakdown {
            month_index,
            month_label: month_label(input.start_date, month_index),
            starting_mrr: mrr,
            new_mrr,
            expansion_mrr,
            churn_mrr,
            contraction_mrr,
            pre_growth_mrr,
            compounding_mrr: ending_mrr - pre_growth_mrr,
            net_new_mrr: ending_mrr - mrr,
            ending_mrr,
            arr,
        });
        mrr = ending_mrr;
    }

    Ok(breakdown)
}

fn summarize(
    input: &GrowthInput,
    scenario: &GrowthScenario,
    breakdown: &[MrrBreakdown],
) -> FounderFinanceResult<GrowthSummary> {
    let at = |n: usize| breakdown.get(n - 1).map(|b| b.ending_mrr);
    let mrr_12 = at(12);
    let mrr_24 = at(24);
    let ending_mrr = breakdown
        .last()
        .map(|b| b.ending_mrr)
        .unwrap_or(input.current_mrr);

    let totals_overflow = || {
        FounderFinanceError::FinancialImpossibility(format!(
            "Waterfall totals for scenario '{}' exceed the representable range",
            scenario.label
        ))
    };
    let total = |f: fn(&MrrBreakdown) -> Money| checked_total(breakdown.iter().map(f));
    let total_new_mrr = total(|b| b.new_mrr).ok_or_else(totals_overflow)?;
    let total_expansion_mrr = total(|b| b.expansion_mrr).ok_or_else(totals_overflow)?;
    let total_churn_mrr = total(|b| b.churn_mrr).ok_or_else(totals_overflow)?;
    let total_contraction_mrr = total(|b| b.contraction_mrr).ok_or_else(totals_overflow)?;
    let total_compounding_mrr = total(|b| b.compounding_mrr).ok_or_else(totals_overflow)?;

    let gained = total_new_mrr
        .checked_add(total_expansion_mrr)
        .ok_or_else(totals_overflow)?;
    let lost = total_churn_mrr
        .checked_add(total_contraction_mrr)
        .ok_or_else(totals_overflow)?;
    let quick_ratio = if lost > Decimal::ZERO {
        gained.checked_div(lost).map(|q| q.round_dp(2))
    } else {
        None
    };

    let months_to_target_arr = input.target_arr.and_then(|target| {
        breakdown
            .iter()
            .find(|b| b.arr >= target)
            .map(|b| b.month_index)
    });

    // Every ending MRR in the breakdown already has a representable ARR.
    let arr_of = |mrr: Money| mrr * MONTHS_PER_YEAR;
    Ok(GrowthSummary {
        starting_mrr: input.current_mrr,
        ending_mrr,
        ending_arr: breakdown
            .last()
            .map(|b| b.arr)
            .unwrap_or_else(|| arr_of(input.current_mrr)),
        mrr_12,
        arr_12: mrr_12.map(arr_of),
        mrr_24,
        arr_24: mrr_24.map(arr_of),
        cagr_1y: mrr_12.map(|m| calculate_cagr(input.current_mrr, m, Decimal::ONE)),
        cagr_2y: mrr_24.map(|m| calculate_cagr(input.current_mrr, m, dec!(2))),
        nrr: calculate_nrr(scenario),
        total_new_mrr,
        total_expansion_mrr,
        total_churn_mrr,
        total_contraction_mrr,
        total_compounding_mrr,
        quick_ratio,
        months_to_target_arr,
    })
}

fn growth_insights(input: &GrowthInput, scenario: &GrowthScenario, s: &GrowthSummary) -> Vec<String> {
    let mut insights = Vec::new();

    if s.nrr >= Decimal::ONE {
        insights.push(format!(
            "{}: net revenue retention of {} means existing customers grow revenue on their own.",
            scenario.label,
            format_percent(s.nrr, 1)
        ));
    } else {
        insights.push(format!(
            "{}: net revenue retention of {} means new sales must first replace lost revenue.",
            scenario.label,
            format_percent(s.nrr, 1)
        ));
    }

    if scenario.churn_rate > dec!(0.05) {
        insights.push(format!(
            "Monthly churn of {} is above the 5% warning level; retention work will outperform acquisition.",
            format_percent(scenario.churn_rate, 1)
        ));
    }

    match s.quick_ratio {
        Some(q) if q < Decimal::ONE => insights.push(format!(
            "Quick ratio of {q} is below 1: the business loses revenue faster than it adds it."
        )),
        Some(q) if q >= dec!(4) => insights.push(format!(
            "Quick ratio of {q} indicates highly efficient growth."
        )),
        _ => {}
    }

    if let Some(target) = input.target_arr {
        match s.months_to_target_arr {
            Some(month) => insights.push(format!(
                "{} ARR is reached in month {month}.",
                format_currency_compact(target)
            )),
            None => insights.push(format!(
                "{} ARR is not reached within {} months (ending ARR {}).",
                format_currency_compact(target),
                input.months,
                format_currency_compact(s.ending_arr)
            )),
        }
    }

    insights
}

fn build_projection(
    input: &GrowthInput,
    scenario: &GrowthScenario,
) -> FounderFinanceResult<GrowthProjection> {
    let breakdown = run_waterfall(input, scenario)?;
    let summary = summarize(input, scenario, &breakdown)?;
    let insights = growth_insights(input, scenario, &summary);
    log::debug!(
        "growth projection {}: start_mrr={} ending_mrr={} nrr={}",
        scenario.label,
        input.current_mrr,
        summary.ending_mrr,
        summary.nrr
    );
    Ok(GrowthProjection {
        scenario: scenario.clone(),
        breakdown,
        summary,
        insights,
    })
}

// ─── Function 1: project_growth ──────────────────────────────────────────────

/// Project MRR for one scenario via the additive waterfall plus compounding
/// growth.
pub fn project_growth(
    input: &GrowthInput,
    scenario: &GrowthScenario,
) -> FounderFinanceResult<ComputationOutput<GrowthProjection>> {
    let start = Instant::now();
    validate(input)?;
    scenario.validate()?;

    let mut warnings = Vec::new();
    if input.current_mrr.is_zero() {
        warnings.push("Starting MRR is zero; CAGR is reported as 0".to_string());
    }

    let projection = build_projection(input, scenario)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "MRR waterfall (new + expansion - churn - contraction) with compounding growth",
        &serde_json::json!({
            "current_mrr": input.current_mrr.to_string(),
            "arpa": input.arpa.to_string(),
            "new_customers_per_month": input.new_customers_per_month.to_string(),
            "months": input.months,
            "scenario": scenario.label,
        }),
        warnings,
        elapsed,
        projection,
    ))
}

// ─── Function 2: compare_growth_scenarios ────────────────────────────────────

/// Project the conservative, base and optimistic scenarios derived from one
/// set of base rates.
pub fn compare_growth_scenarios(
    input: &GrowthInput,
    rates: &BaseRates,
) -> FounderFinanceResult<ComputationOutput<ScenarioComparison>> {
    let start = Instant::now();
    validate(input)?;
    rates.validate()?;

    let mut warnings = Vec::new();
    if input.months < 24 {
        warnings.push(format!(
            "Horizon of {} months is shorter than 24; spread at 24 months is unavailable",
            input.months
        ));
    }

    let [conservative, base, optimistic] = derive_scenarios(rates);
    let conservative = build_projection(input, &conservative)?;
    let base = build_projection(input, &base)?;
    let optimistic = build_projection(input, &optimistic)?;

    let spread_at_24 = match (optimistic.summary.arr_24, conservative.summary.arr_24) {
        (Some(high), Some(low)) => Some(high - low),
        _ => None,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Three-scenario MRR projection (0.7/1.3/1.5 and 1.4/0.7/0.5 multipliers)",
        &serde_json::json!({
            "current_mrr": input.current_mrr.to_string(),
            "months": input.months,
            "base_rates": rates,
        }),
        warnings,
        elapsed,
        ScenarioComparison {
            conservative,
            base,
            optimistic,
            spread_at_24,
        },
    ))
}
