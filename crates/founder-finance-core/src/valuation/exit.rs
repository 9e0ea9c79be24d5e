use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bands::{Band, BandTable, Comparison};
use crate::error::FounderFinanceError;
use crate::format::{format_currency_compact, format_multiple};
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::FounderFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Larger companies command premium multiples: step-up by ARR growth factor.
pub const EXIT_STEP_UP_BANDS: BandTable = BandTable {
    name: "exit_step_up",
    comparison: Comparison::AtLeast,
    bands: &[
        Band::new(dec!(3), dec!(2), ">=3x ARR"),
        Band::new(dec!(2), dec!(1), ">=2x ARR"),
    ],
    fallback: (dec!(0), "<2x ARR"),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitInput {
    pub current_mrr: Money,
    /// Month-over-month MRR growth (0.05 = 5% per month).
    pub monthly_growth_rate: Rate,
    /// Multiple the company is valued at today.
    pub current_multiple: Multiple,
    pub target_mrrs: Vec<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitScenario {
    pub target_mrr: Money,
    pub target_arr: Money,
    /// `None` when the target is unreachable at the given growth rate.
    pub months_to_target: Option<Decimal>,
    pub arr_growth_factor: Decimal,
    pub multiple_step_up: Multiple,
    pub exit_multiple: Multiple,
    pub exit_valuation: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitProjection {
    pub current_arr: Money,
    pub current_valuation: Money,
    pub scenarios: Vec<ExitScenario>,
    pub insights: Vec<String>,
}

/// Months to grow from `current` to `target` at a compound monthly rate.
///
/// Returns `Some(0)` when the target is already met and `None` when it can
/// never be reached (non-positive rate or starting MRR).
pub fn months_to_target(current: Money, target: Money, monthly_rate: Rate) -> Option<Decimal> {
    if current <= Decimal::ZERO {
        return None;
    }
    if target <= current {
        return Some(Decimal::ZERO);
    }
    if monthly_rate <= Decimal::ZERO {
        return None;
    }
    let numerator = (target / current).checked_ln()?;
    let denominator = (Decimal::ONE + monthly_rate).checked_ln()?;
    if denominator.is_zero() {
        return None;
    }
    Some((numerator / denominator).round_dp(1))
}

fn build_scenario(input: &ExitInput, target_mrr: Money) -> ExitScenario {
    let arr_growth_factor = if input.current_mrr > Decimal::ZERO {
        target_mrr / input.current_mrr
    } else {
        Decimal::ZERO
    };
    let multiple_step_up = EXIT_STEP_UP_BANDS.value_for(arr_growth_factor);
    let exit_multiple = input.current_multiple + multiple_step_up;
    let target_arr = target_mrr * MONTHS_PER_YEAR;

    ExitScenario {
        target_mrr,
        target_arr,
        months_to_target: months_to_target(input.current_mrr, target_mrr, input.monthly_growth_rate),
        arr_growth_factor: arr_growth_factor.round_dp(2),
        multiple_step_up,
        exit_multiple,
        exit_valuation: target_arr * exit_multiple,
    }
}

/// Project valuation at future MRR milestones.
pub fn project_exit_scenarios(
    input: &ExitInput,
) -> FounderFinanceResult<ComputationOutput<ExitProjection>> {
    let start = Instant::now();

    require_non_negative("current_mrr", input.current_mrr)?;
    if input.current_multiple <= Decimal::ZERO {
        return Err(FounderFinanceError::InvalidInput {
            field: "current_multiple".into(),
            reason: "Current multiple must be positive".into(),
        });
    }
    if input.target_mrrs.is_empty() {
        return Err(FounderFinanceError::InsufficientData(
            "At least one target MRR is required".into(),
        ));
    }
    for (i, t) in input.target_mrrs.iter().enumerate() {
        require_non_negative(&format!("target_mrrs[{i}]"), *t)?;
    }

    let mut warnings = Vec::new();
    if input.monthly_growth_rate <= Decimal::ZERO {
        warnings.push("Growth rate is not positive; targets above current MRR are unreachable".to_string());
    }

    let scenarios: Vec<ExitScenario> = input
        .target_mrrs
        .iter()
        .map(|t| build_scenario(input, *t))
        .collect();

    let current_arr = input.current_mrr * MONTHS_PER_YEAR;
    let current_valuation = current_arr * input.current_multiple;

    let mut insights = Vec::new();
    for s in &scenarios {
        let timing = match s.months_to_target {
            Some(m) if m.is_zero() => "already reached".to_string(),
            Some(m) => format!("reached in ~{m} months"),
            None => "unreachable at the current growth rate".to_string(),
        };
        insights.push(format!(
            "{} ARR: {}, exit at {} = {}.",
            format_currency_compact(s.target_arr),
            timing,
            format_multiple(s.exit_multiple),
            format_currency_compact(s.exit_valuation)
        ));
    }
    log::debug!("exit projection: {} scenarios from arr={current_arr}", scenarios.len());

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Exit projection (compound-growth inversion with ARR-scale multiple step-up)",
        input,
        warnings,
        elapsed,
        ExitProjection {
            current_arr,
            current_valuation,
            scenarios,
            insights,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ExitInput {
        ExitInput {
            current_mrr: dec!(50_000),
            monthly_growth_rate: dec!(0.05),
            current_multiple: dec!(13),
            target_mrrs: vec![dec!(40_000), dec!(100_000), dec!(150_000), dec!(500_000)],
        }
    }

    #[test]
    fn test_step_up_bands() {
        let out = project_exit_scenarios(&input()).unwrap().result;
        let steps: Vec<Decimal> = out.scenarios.iter().map(|s| s.multiple_step_up).collect();
        assert_eq!(steps, vec![dec!(0), dec!(1), dec!(2), dec!(2)]);
        assert_eq!(out.scenarios[1].exit_multiple, dec!(14));
        // 100k MRR -> 1.2M ARR * 14
        assert_eq!(out.scenarios[1].exit_valuation, dec!(16_800_000));
    }

    #[test]
    fn test_months_to_double_at_five_percent() {
        // ln(2) / ln(1.05) = 14.2
        let m = months_to_target(dec!(50_000), dec!(100_000), dec!(0.05)).unwrap();
        assert_eq!(m, dec!(14.2));
    }

    #[test]
    fn test_already_reached_and_unreachable() {
        assert_eq!(months_to_target(dec!(50_000), dec!(40_000), dec!(0.05)), Some(dec!(0)));
        assert_eq!(months_to_target(dec!(50_000), dec!(100_000), dec!(0)), None);
        assert_eq!(months_to_target(dec!(0), dec!(100_000), dec!(0.05)), None);
    }

    #[test]
    fn test_empty_targets_rejected() {
        let mut inp = input();
        inp.target_mrrs.clear();
        assert!(project_exit_scenarios(&inp).is_err());
    }
}
