use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FounderFinanceError;
use crate::format::{format_currency_compact, format_months, format_runway};
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money, Rate, Runway};
use crate::FounderFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
pub const DEFAULT_HORIZON_MONTHS: u32 = 60;
const MAX_HORIZON_MONTHS: u32 = 120;

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

// ─── Presets ─────────────────────────────────────────────────────────────────

/// Named what-if adjustments applied on top of the base assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunwayPreset {
    Baseline,
    /// Hiring plan: heavier payroll and faster expense growth.
    Hire,
    /// Fundraising winter: cut costs, growth slows.
    Winter,
    /// Spend to accelerate revenue.
    GrowthPush,
}

/// Deltas a preset applies. `expense_growth_override` replaces the rate
/// outright; the other fields scale or shift it.
#[derive(Debug, Clone, Copy)]
struct PresetDelta {
    expense_multiplier: Decimal,
    revenue_growth_multiplier: Decimal,
    revenue_growth_shift: Rate,
    expense_growth_shift: Rate,
    expense_growth_override: Option<Rate>,
}

const PRESET_TABLE: [(RunwayPreset, PresetDelta); 4] = [
    (
        RunwayPreset::Baseline,
        PresetDelta {
            expense_multiplier: dec!(1),
            revenue_growth_multiplier: dec!(1),
            revenue_growth_shift: dec!(0),
            expense_growth_shift: dec!(0),
            expense_growth_override: None,
        },
    ),
    (
        RunwayPreset::Hire,
        PresetDelta {
            expense_multiplier: dec!(1.20),
            revenue_growth_multiplier: dec!(1),
            revenue_growth_shift: dec!(0),
            expense_growth_shift: dec!(0.05),
            expense_growth_override: None,
        },
    ),
    (
        RunwayPreset::Winter,
        PresetDelta {
            expense_multiplier: dec!(0.75),
            revenue_growth_multiplier: dec!(0.5),
            revenue_growth_shift: dec!(0),
            expense_growth_shift: dec!(0),
            expense_growth_override: Some(dec!(0)),
        },
    ),
    (
        RunwayPreset::GrowthPush,
        PresetDelta {
            expense_multiplier: dec!(1.35),
            revenue_growth_multiplier: dec!(1),
            revenue_growth_shift: dec!(0.20),
            expense_growth_shift: dec!(0.10),
            expense_growth_override: None,
        },
    ),
];

fn preset_delta(preset: RunwayPreset) -> PresetDelta {
    PRESET_TABLE
        .iter()
        .find(|(p, _)| *p == preset)
        .map(|(_, d)| *d)
        .unwrap_or(PRESET_TABLE[0].1)
}

// ─── Structs ─────────────────────────────────────────────────────────────────

/// Inputs for a month-by-month cash simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayInput {
    pub cash_on_hand: Money,
    pub monthly_expenses: Money,
    pub monthly_revenue: Money,
    /// Annual expense growth rate, compounded monthly (rate / 12).
    pub expense_growth: Rate,
    /// Annual revenue growth rate, compounded monthly (rate / 12).
    pub revenue_growth: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<RunwayPreset>,
    #[serde(default = "default_horizon")]
    pub horizon_months: u32,
}

/// One simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCash {
    pub month: u32,
    pub revenue: Money,
    pub expenses: Money,
    pub net_burn: Money,
    pub cash: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunwayProjection {
    /// Assumptions after the preset was applied.
    pub effective_input: RunwayInput,
    pub trajectory: Vec<MonthlyCash>,
    pub runway: Runway,
    /// First month in which revenue covers expenses.
    pub months_to_profitability: Option<u32>,
    /// Month in which cash hit zero, if it did within the horizon.
    pub zero_cash_month: Option<u32>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSide {
    A,
    B,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashDelta {
    pub month: u32,
    pub cash_a: Money,
    pub cash_b: Money,
    /// `cash_b - cash_a`
    pub delta: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunwayComparison {
    pub scenario_a: RunwayProjection,
    pub scenario_b: RunwayProjection,
    /// `runway_b - runway_a`; `None` when either side is infinite.
    pub runway_delta: Option<Decimal>,
    pub longer_runway: ScenarioSide,
    pub monthly_deltas: Vec<CashDelta>,
    pub insights: Vec<String>,
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate(input: &RunwayInput) -> FounderFinanceResult<()> {
    require_non_negative("cash_on_hand", input.cash_on_hand)?;
    require_non_negative("monthly_expenses", input.monthly_expenses)?;
    require_non_negative("monthly_revenue", input.monthly_revenue)?;
    if input.expense_growth <= dec!(-1) || input.revenue_growth <= dec!(-1) {
        return Err(FounderFinanceError::InvalidInput {
            field: "growth".into(),
            reason: "Annual growth rates must be greater than -100%".into(),
        });
    }
    if input.horizon_months == 0 || input.horizon_months > MAX_HORIZON_MONTHS {
        return Err(FounderFinanceError::InvalidInput {
            field: "horizon_months".into(),
            reason: format!("Horizon must be between 1 and {MAX_HORIZON_MONTHS} months"),
        });
    }
    Ok(())
}

// ─── Function 1: apply_preset ────────────────────────────────────────────────

/// Return a copy of `input` with its preset's deltas folded in. The returned
/// input carries no preset, so applying it twice is a no-op.
pub fn apply_preset(input: &RunwayInput) -> RunwayInput {
    let mut effective = input.clone();
    effective.preset = None;
    let Some(preset) = input.preset else {
        return effective;
    };
    let d = preset_delta(preset);
    effective.monthly_expenses = input.monthly_expenses * d.expense_multiplier;
    effective.revenue_growth = input.revenue_growth * d.revenue_growth_multiplier + d.revenue_growth_shift;
    effective.expense_growth = match d.expense_growth_override {
        Some(rate) => rate,
        None => input.expense_growth + d.expense_growth_shift,
    };
    effective
}

// ─── Function 2: simulate_runway ─────────────────────────────────────────────

/// Advance revenue, expenses and cash by one month. `None` once any figure
/// leaves the range `Decimal` can represent.
fn step_month(
    revenue: Money,
    expenses: Money,
    cash: Money,
    revenue_step: Decimal,
    expense_step: Decimal,
) -> Option<(Money, Money, Money)> {
    let revenue = revenue.checked_mul(revenue_step)?;
    let expenses = expenses.checked_mul(expense_step)?;
    let cash = cash.checked_add(revenue.checked_sub(expenses)?)?;
    Some((revenue, expenses, cash))
}

fn run_simulation(input: &RunwayInput) -> (RunwayProjection, Vec<String>) {
    let effective = apply_preset(input);
    let revenue_step = Decimal::ONE + effective.revenue_growth / MONTHS_PER_YEAR;
    let expense_step = Decimal::ONE + effective.expense_growth / MONTHS_PER_YEAR;

    let mut warnings = Vec::new();
    if effective.cash_on_hand.is_zero() {
        warnings.push("Cash on hand is zero; any net burn depletes it in month 1".to_string());
    }

    let mut revenue = effective.monthly_revenue;
    let mut expenses = effective.monthly_expenses;
    let mut cash = effective.cash_on_hand;
    let mut trajectory = Vec::with_capacity(effective.horizon_months as usize);
    let mut zero_cash_month = None;
    let mut months_to_profitability = None;
    let mut months_simulated = 0u32;

    for month in 1..=effective.horizon_months {
        let Some((next_revenue, next_expenses, next_cash)) =
            step_month(revenue, expenses, cash, revenue_step, expense_step)
        else {
            log::warn!("runway simulation overflowed in month {month}");
            warnings.push(format!(
                "Figures exceed the representable range in month {month}; simulation stopped after month {months_simulated}"
            ));
            break;
        };
        revenue = next_revenue;
        expenses = next_expenses;
        cash = next_cash;
        months_simulated = month;
        let net_burn = expenses - revenue;

        if months_to_profitability.is_none() && net_burn <= Decimal::ZERO {
            months_to_profitability = Some(month);
        }

        // Zero cash only counts as depletion while the company is still burning.
        let depleted = cash < Decimal::ZERO || (cash.is_zero() && net_burn > Decimal::ZERO);
        if depleted {
            trajectory.push(MonthlyCash {
                month,
                revenue: revenue.round_dp(2),
                expenses: expenses.round_dp(2),
                net_burn: net_burn.round_dp(2),
                cash: Decimal::ZERO,
            });
            zero_cash_month = Some(month);
            break;
        }

        trajectory.push(MonthlyCash {
            month,
            revenue: revenue.round_dp(2),
            expenses: expenses.round_dp(2),
            net_burn: net_burn.round_dp(2),
            cash: cash.round_dp(2),
        });
    }

    let runway = match zero_cash_month {
        Some(month) => Runway::Months(Decimal::from(month)),
        None => {
            let final_burn = expenses - revenue;
            if final_burn <= Decimal::ZERO {
                Runway::Infinite
            } else {
                // Past the last simulated month: extrapolate at its burn.
                let extrapolated = cash
                    .checked_div(final_burn)
                    .and_then(|beyond| Decimal::from(months_simulated).checked_add(beyond));
                match extrapolated {
                    Some(months) => Runway::Months(months.round_dp(2)),
                    None => {
                        warnings.push(
                            "Extrapolated runway exceeds the representable range; reported as infinite"
                                .to_string(),
                        );
                        Runway::Infinite
                    }
                }
            }
        }
    };

    if let Some(month) = zero_cash_month {
        log::warn!("cash depleted in month {month} of simulation");
    }
    log::debug!(
        "runway simulation: cash={} burn={} runway={}",
        effective.cash_on_hand,
        effective.monthly_expenses - effective.monthly_revenue,
        runway
    );

    let insights = runway_insights(&runway, months_to_profitability, &trajectory);

    let projection = RunwayProjection {
        effective_input: effective,
        trajectory,
        runway,
        months_to_profitability,
        zero_cash_month,
        insights,
    };
    (projection, warnings)
}

fn runway_insights(
    runway: &Runway,
    months_to_profitability: Option<u32>,
    trajectory: &[MonthlyCash],
) -> Vec<String> {
    let mut insights = Vec::new();
    match runway {
        Runway::Infinite => insights.push(
            "Default alive: revenue covers expenses before cash runs out.".to_string(),
        ),
        Runway::Months(m) if *m < dec!(6) => insights.push(format!(
            "Critical: cash runs out in {}. Cut burn or close bridge financing immediately.",
            format_runway(runway)
        )),
        Runway::Months(m) if *m < dec!(12) => insights.push(format!(
            "Runway of {} is below a typical 12-month fundraising cycle. Start raising now.",
            format_runway(runway)
        )),
        Runway::Months(m) if *m >= dec!(18) => insights.push(format!(
            "Healthy runway of {} leaves room to raise from a position of strength.",
            format_runway(runway)
        )),
        Runway::Months(_) => insights.push(format!(
            "Runway of {}. Plan the next raise within 6 months.",
            format_runway(runway)
        )),
    }
    if let Some(month) = months_to_profitability {
        insights.push(format!("Revenue overtakes expenses in month {month}."));
    }
    if let Some(low) = trajectory.last() {
        if low.cash > Decimal::ZERO {
            insights.push(format!(
                "Cash at end of simulation: {}.",
                format_currency_compact(low.cash)
            ));
        }
    }
    insights
}

/// Project cash month by month under compounding revenue and expense growth.
///
/// Runway is the first month in which cash reaches zero. If cash survives the
/// horizon the company is either default alive (`Infinite`) or the runway is
/// extrapolated at the final month's burn.
pub fn simulate_runway(
    input: &RunwayInput,
) -> FounderFinanceResult<ComputationOutput<RunwayProjection>> {
    let start = Instant::now();
    validate(input)?;

    let (projection, warnings) = run_simulation(input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly cash simulation (compounded revenue / expense growth)",
        &serde_json::json!({
            "cash_on_hand": input.cash_on_hand.to_string(),
            "monthly_expenses": input.monthly_expenses.to_string(),
            "monthly_revenue": input.monthly_revenue.to_string(),
            "expense_growth": input.expense_growth.to_string(),
            "revenue_growth": input.revenue_growth.to_string(),
            "preset": input.preset,
            "horizon_months": input.horizon_months,
        }),
        warnings,
        elapsed,
        projection,
    ))
}

// ─── Function 3: compare_runway_scenarios ────────────────────────────────────

/// Cash at a month index. A depleted scenario reads as zero after depletion;
/// one that stopped early without depleting holds its last balance.
fn cash_at(projection: &RunwayProjection, index: usize) -> Money {
    match projection.trajectory.get(index) {
        Some(m) => m.cash,
        None if projection.zero_cash_month.is_some() => Decimal::ZERO,
        None => projection
            .trajectory
            .last()
            .map(|m| m.cash)
            .unwrap_or(projection.effective_input.cash_on_hand),
    }
}

/// Run two scenarios side by side and diff their runway and cash paths.
pub fn compare_runway_scenarios(
    a: &RunwayInput,
    b: &RunwayInput,
) -> FounderFinanceResult<ComputationOutput<RunwayComparison>> {
    let start = Instant::now();
    validate(a)?;
    validate(b)?;
    if a.horizon_months != b.horizon_months {
        return Err(FounderFinanceError::InvalidInput {
            field: "horizon_months".into(),
            reason: format!(
                "Scenarios must share a horizon to compare month by month (A: {}, B: {})",
                a.horizon_months, b.horizon_months
            ),
        });
    }

    let (scenario_a, warnings_a) = run_simulation(a);
    let (scenario_b, warnings_b) = run_simulation(b);
    let warnings: Vec<String> = warnings_a
        .into_iter()
        .map(|w| format!("Scenario A: {w}"))
        .chain(warnings_b.into_iter().map(|w| format!("Scenario B: {w}")))
        .collect();

    let runway_delta = scenario_b.runway.delta(&scenario_a.runway);
    let longer_runway = match scenario_b.runway.partial_cmp(&scenario_a.runway) {
        Some(std::cmp::Ordering::Greater) => ScenarioSide::B,
        Some(std::cmp::Ordering::Less) => ScenarioSide::A,
        _ => ScenarioSide::Tie,
    };

    let months = scenario_a.trajectory.len().max(scenario_b.trajectory.len());
    let monthly_deltas: Vec<CashDelta> = (0..months)
        .map(|i| {
            let cash_a = cash_at(&scenario_a, i);
            let cash_b = cash_at(&scenario_b, i);
            CashDelta {
                month: i as u32 + 1,
                cash_a,
                cash_b,
                delta: cash_b - cash_a,
            }
        })
        .collect();

    let mut insights = Vec::new();
    match (runway_delta, longer_runway) {
        (Some(d), ScenarioSide::B) => insights.push(format!(
            "Scenario B extends runway by {}.",
            format_months(d)
        )),
        (Some(d), ScenarioSide::A) => insights.push(format!(
            "Scenario B shortens runway by {}.",
            format_months(d.abs())
        )),
        (None, ScenarioSide::A) => {
            insights.push("Only scenario A reaches default alive.".to_string())
        }
        (None, ScenarioSide::B) => {
            insights.push("Only scenario B reaches default alive.".to_string())
        }
        (None, ScenarioSide::Tie) => {
            insights.push("Both scenarios reach default alive.".to_string())
        }
        (Some(_), ScenarioSide::Tie) => {
            insights.push("Both scenarios have the same runway.".to_string())
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "A/B runway comparison",
        &serde_json::json!({
            "preset_a": a.preset,
            "preset_b": b.preset,
        }),
        warnings,
        elapsed,
        RunwayComparison {
            scenario_a,
            scenario_b,
            runway_delta,
            longer_runway,
            monthly_deltas,
            insights,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> RunwayInput {
        RunwayInput {
            cash_on_hand: dec!(1_000_000),
            monthly_expenses: dec!(100_000),
            monthly_revenue: dec!(20_000),
            expense_growth: dec!(0),
            revenue_growth: dec!(0),
            preset: None,
            horizon_months: 60,
        }
    }

    #[test]
    fn test_flat_burn_depletes_on_schedule() {
        // 1,000,000 / 80,000 = 12.5 -> cash first <= 0 in month 13
        let out = simulate_runway(&base_input()).unwrap().result;
        assert_eq!(out.runway, Runway::Months(dec!(13)));
        assert_eq!(out.zero_cash_month, Some(13));
        assert_eq!(out.trajectory.len(), 13);
        assert_eq!(out.trajectory.last().unwrap().cash, Decimal::ZERO);
        assert_eq!(out.trajectory[0].cash, dec!(920_000));
    }

    #[test]
    fn test_profitable_company_is_infinite() {
        let mut input = base_input();
        input.monthly_revenue = dec!(120_000);
        let out = simulate_runway(&input).unwrap().result;
        assert_eq!(out.runway, Runway::Infinite);
        assert_eq!(out.months_to_profitability, Some(1));
        assert_eq!(out.trajectory.len(), 60);
    }

    #[test]
    fn test_zero_burn_is_infinite_not_nan() {
        let mut input = base_input();
        input.monthly_revenue = dec!(100_000);
        let out = simulate_runway(&input).unwrap().result;
        assert_eq!(out.runway, Runway::Infinite);
    }

    #[test]
    fn test_survives_horizon_is_extrapolated() {
        let mut input = base_input();
        input.cash_on_hand = dec!(10_000_000);
        input.horizon_months = 24;
        let out = simulate_runway(&input).unwrap().result;
        // 10M - 24 * 80K = 8.08M left, / 80K = 101 more months
        assert_eq!(out.runway, Runway::Months(dec!(125)));
        assert_eq!(out.zero_cash_month, None);
    }

    #[test]
    fn test_winter_preset_cuts_burn() {
        let mut input = base_input();
        input.expense_growth = dec!(0.10);
        input.revenue_growth = dec!(0.40);
        input.preset = Some(RunwayPreset::Winter);
        let eff = apply_preset(&input);
        assert_eq!(eff.monthly_expenses, dec!(75_000));
        assert_eq!(eff.revenue_growth, dec!(0.20));
        assert_eq!(eff.expense_growth, dec!(0));
        assert_eq!(eff.preset, None);
        assert_eq!(apply_preset(&eff), eff);
    }

    #[test]
    fn test_hire_preset_shortens_runway() {
        let a = base_input();
        let mut b = base_input();
        b.preset = Some(RunwayPreset::Hire);
        let cmp = compare_runway_scenarios(&a, &b).unwrap().result;
        assert_eq!(cmp.longer_runway, ScenarioSide::A);
        assert!(cmp.runway_delta.unwrap() < Decimal::ZERO);
        assert_eq!(cmp.monthly_deltas.len(), cmp.scenario_a.trajectory.len());
        // Depleted months read as zero cash
        let last = cmp.monthly_deltas.last().unwrap();
        assert_eq!(last.cash_b, Decimal::ZERO);
    }

    #[test]
    fn test_compare_infinite_side() {
        let a = base_input();
        let mut b = base_input();
        b.monthly_revenue = dec!(150_000);
        let cmp = compare_runway_scenarios(&a, &b).unwrap().result;
        assert_eq!(cmp.runway_delta, None);
        assert_eq!(cmp.longer_runway, ScenarioSide::B);
    }

    #[test]
    fn test_stopped_without_depletion_holds_last_cash() {
        let mut input = base_input();
        input.monthly_revenue = dec!(150_000);
        let (projection, _) = run_simulation(&input);
        let last = projection.trajectory.last().unwrap().cash;
        assert_eq!(cash_at(&projection, 500), last);
    }

    #[test]
    fn test_depleted_scenario_reads_zero_after_depletion() {
        let (projection, _) = run_simulation(&base_input());
        assert_eq!(cash_at(&projection, 40), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_negative_cash() {
        let mut input = base_input();
        input.cash_on_hand = dec!(-1);
        assert!(simulate_runway(&input).is_err());
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let mut input = base_input();
        input.horizon_months = 0;
        assert!(simulate_runway(&input).is_err());
    }
}
