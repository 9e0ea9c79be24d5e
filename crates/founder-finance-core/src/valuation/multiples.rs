use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bands::{Band, BandHit, BandTable, Comparison};
use crate::format::{format_currency_compact, format_multiple, format_percent};
use crate::types::{
    require_non_negative, require_unit_rate, with_metadata, ComputationOutput, Money, Multiple,
    Rate,
};
use crate::FounderFinanceResult;

const MULTIPLE_FLOOR: Multiple = dec!(1);
const MONTHS_PER_YEAR: Decimal = dec!(12);

// ─── Stage table ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStage {
    PreSeed,
    Seed,
    SeriesA,
    SeriesB,
    Growth,
}

/// Low / mid / high ARR multiples for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageMultiples {
    pub low: Multiple,
    pub mid: Multiple,
    pub high: Multiple,
}

impl CompanyStage {
    pub fn multiples(&self) -> StageMultiples {
        let (low, mid, high) = match self {
            CompanyStage::PreSeed => (dec!(3), dec!(5), dec!(8)),
            CompanyStage::Seed => (dec!(5), dec!(8), dec!(12)),
            CompanyStage::SeriesA => (dec!(6), dec!(10), dec!(15)),
            CompanyStage::SeriesB => (dec!(5), dec!(8), dec!(12)),
            CompanyStage::Growth => (dec!(4), dec!(6), dec!(10)),
        };
        StageMultiples { low, mid, high }
    }
}

// ─── Adjustment tables ───────────────────────────────────────────────────────

/// Growth rate + profit margin.
pub const RULE_OF_40_BANDS: BandTable = BandTable {
    name: "rule_of_40",
    comparison: Comparison::AtLeast,
    bands: &[
        Band::new(dec!(0.60), dec!(4), ">=60%"),
        Band::new(dec!(0.50), dec!(3), ">=50%"),
        Band::new(dec!(0.40), dec!(2), ">=40%"),
        Band::new(dec!(0.30), dec!(0), ">=30%"),
        Band::new(dec!(0.20), dec!(-1), ">=20%"),
    ],
    fallback: (dec!(-2), "<20%"),
};

/// Monthly logo churn.
pub const CHURN_PENALTY_BANDS: BandTable = BandTable {
    name: "churn_penalty",
    comparison: Comparison::AtMost,
    bands: &[
        Band::new(dec!(0.02), dec!(0), "<=2%"),
        Band::new(dec!(0.03), dec!(-0.5), "<=3%"),
        Band::new(dec!(0.05), dec!(-1.5), "<=5%"),
        Band::new(dec!(0.08), dec!(-3), "<=8%"),
    ],
    fallback: (dec!(-5), ">8%"),
};

pub const NRR_BONUS_BANDS: BandTable = BandTable {
    name: "nrr_bonus",
    comparison: Comparison::AtLeast,
    bands: &[
        Band::new(dec!(1.20), dec!(3), ">=120%"),
        Band::new(dec!(1.10), dec!(2), ">=110%"),
        Band::new(dec!(1.00), dec!(1), ">=100%"),
        Band::new(dec!(0.90), dec!(0), ">=90%"),
    ],
    fallback: (dec!(-1), "<90%"),
};

pub const GROSS_MARGIN_BANDS: BandTable = BandTable {
    name: "gross_margin",
    comparison: Comparison::AtLeast,
    bands: &[
        Band::new(dec!(0.85), dec!(1), ">=85%"),
        Band::new(dec!(0.75), dec!(0.5), ">=75%"),
        Band::new(dec!(0.65), dec!(0), ">=65%"),
        Band::new(dec!(0.50), dec!(-1), ">=50%"),
    ],
    fallback: (dec!(-2), "<50%"),
};

// ─── Structs ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    pub mrr: Money,
    /// Year-over-year revenue growth (0.50 = 50%).
    pub yoy_growth: Rate,
    /// Operating profit margin; negative when burning.
    #[serde(default)]
    pub profit_margin: Rate,
    pub monthly_churn: Rate,
    /// Net revenue retention (1.10 = 110%).
    pub nrr: Rate,
    pub gross_margin: Rate,
    pub stage: CompanyStage,
}

/// The additive components that sum to the final multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleAdjustments {
    pub base_multiple: Multiple,
    pub rule_of_40: BandHit,
    pub churn_penalty: BandHit,
    pub nrr_bonus: BandHit,
    pub gross_margin: BandHit,
}

impl MultipleAdjustments {
    /// Sum of the non-base adjustments.
    pub fn total_adjustment(&self) -> Decimal {
        self.rule_of_40.value + self.churn_penalty.value + self.nrr_bonus.value + self.gross_margin.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub arr: Money,
    pub rule_of_40_score: Rate,
    pub adjustments: MultipleAdjustments,
    /// `max(1, base + adjustments)`
    pub final_multiple: Multiple,
    pub valuation: Money,
    pub low_multiple: Multiple,
    pub high_multiple: Multiple,
    pub valuation_low: Money,
    pub valuation_high: Money,
    /// True when the raw multiple fell below the 1.0x floor.
    pub floor_applied: bool,
    pub insights: Vec<String>,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn validate(input: &ValuationInput) -> FounderFinanceResult<()> {
    require_non_negative("mrr", input.mrr)?;
    require_unit_rate("monthly_churn", input.monthly_churn)?;
    require_unit_rate("gross_margin", input.gross_margin)?;
    require_non_negative("nrr", input.nrr)?;
    Ok(())
}

fn floored(multiple: Multiple) -> Multiple {
    multiple.max(MULTIPLE_FLOOR)
}

/// Evaluate all four adjustment tables for an input.
pub fn score_adjustments(input: &ValuationInput) -> MultipleAdjustments {
    MultipleAdjustments {
        base_multiple: input.stage.multiples().mid,
        rule_of_40: RULE_OF_40_BANDS.lookup(input.yoy_growth + input.profit_margin),
        churn_penalty: CHURN_PENALTY_BANDS.lookup(input.monthly_churn),
        nrr_bonus: NRR_BONUS_BANDS.lookup(input.nrr),
        gross_margin: GROSS_MARGIN_BANDS.lookup(input.gross_margin),
    }
}

fn valuation_insights(
    input: &ValuationInput,
    adj: &MultipleAdjustments,
    final_multiple: Multiple,
    valuation: Money,
    floor_applied: bool,
) -> Vec<String> {
    let mut insights = vec![format!(
        "Estimated valuation {} at {} ARR.",
        format_currency_compact(valuation),
        format_multiple(final_multiple)
    )];

    let r40 = &adj.rule_of_40;
    if r40.value > Decimal::ZERO {
        insights.push(format!(
            "Rule of 40 score of {} ({}) adds {} to the multiple.",
            format_percent(r40.metric, 0),
            r40.band,
            format_multiple(r40.value)
        ));
    } else if r40.value < Decimal::ZERO {
        insights.push(format!(
            "Rule of 40 score of {} ({}) costs {} of multiple; growth plus margin below 30% reads as unhealthy.",
            format_percent(r40.metric, 0),
            r40.band,
            format_multiple(r40.value.abs())
        ));
    }

    if adj.churn_penalty.value < Decimal::ZERO {
        insights.push(format!(
            "Monthly churn of {} ({}) reduces the multiple by {}.",
            format_percent(input.monthly_churn, 1),
            adj.churn_penalty.band,
            format_multiple(adj.churn_penalty.value.abs())
        ));
    }

    if adj.nrr_bonus.value > Decimal::ZERO {
        insights.push(format!(
            "NRR of {} ({}) earns a {} premium.",
            format_percent(input.nrr, 0),
            adj.nrr_bonus.band,
            format_multiple(adj.nrr_bonus.value)
        ));
    } else if adj.nrr_bonus.value < Decimal::ZERO {
        insights.push(format!(
            "NRR below 90% signals a leaky bucket and discounts the multiple by {}.",
            format_multiple(adj.nrr_bonus.value.abs())
        ));
    }

    if adj.gross_margin.value < Decimal::ZERO {
        insights.push(format!(
            "Gross margin of {} ({}) is below software norms and lowers the multiple.",
            format_percent(input.gross_margin, 0),
            adj.gross_margin.band
        ));
    } else if adj.gross_margin.value > Decimal::ZERO {
        insights.push(format!(
            "Gross margin of {} ({}) supports a premium multiple.",
            format_percent(input.gross_margin, 0),
            adj.gross_margin.band
        ));
    }

    if floor_applied {
        insights.push("Adjustments pushed the multiple below 1.0x; the floor was applied.".to_string());
    }

    insights
}

// ─── Function 1: calculate_valuation ─────────────────────────────────────────

/// ARR multiple valuation with Rule-of-40, churn, NRR and gross-margin
/// adjustments on top of the stage's base multiple.
pub fn calculate_valuation(
    input: &ValuationInput,
) -> FounderFinanceResult<ComputationOutput<ValuationResult>> {
    let start = Instant::now();
    validate(input)?;

    let mut warnings = Vec::new();
    if input.mrr.is_zero() {
        warnings.push("MRR is zero; valuation is zero regardless of multiple".to_string());
    }

    let arr = input.mrr * MONTHS_PER_YEAR;
    let stage = input.stage.multiples();
    let adjustments = score_adjustments(input);
    let total = adjustments.total_adjustment();

    let raw_multiple = stage.mid + total;
    let floor_applied = raw_multiple < MULTIPLE_FLOOR;
    if floor_applied {
        log::warn!("valuation multiple {raw_multiple} floored at {MULTIPLE_FLOOR}");
    }
    let final_multiple = floored(raw_multiple);
    let low_multiple = floored(stage.low + total);
    let high_multiple = floored(stage.high + total);
    let valuation = arr * final_multiple;

    log::debug!("valuation: arr={arr} multiple={final_multiple} value={valuation}");

    let insights = valuation_insights(input, &adjustments, final_multiple, valuation, floor_applied);

    let result = ValuationResult {
        arr,
        rule_of_40_score: input.yoy_growth + input.profit_margin,
        adjustments,
        final_multiple,
        valuation,
        low_multiple,
        high_multiple,
        valuation_low: arr * low_multiple,
        valuation_high: arr * high_multiple,
        floor_applied,
        insights,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "ARR multiple valuation (stage base + Rule of 40 / churn / NRR / margin bands)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_input() -> ValuationInput {
        ValuationInput {
            mrr: dec!(50_000),
            yoy_growth: dec!(0.50),
            profit_margin: dec!(0),
            monthly_churn: dec!(0.03),
            nrr: dec!(1.10),
            gross_margin: dec!(0.80),
            stage: CompanyStage::Seed,
        }
    }

    #[test]
    fn test_seed_reference_case() {
        let out = calculate_valuation(&seed_input()).unwrap().result;
        assert_eq!(out.arr, dec!(600_000));
        assert_eq!(out.adjustments.rule_of_40.value, dec!(3));
        assert_eq!(out.adjustments.churn_penalty.value, dec!(-0.5));
        assert_eq!(out.adjustments.nrr_bonus.value, dec!(2));
        assert_eq!(out.adjustments.gross_margin.value, dec!(0.5));
        assert_eq!(out.final_multiple, dec!(13));
        assert_eq!(out.valuation, dec!(7_800_000));
        assert!(!out.floor_applied);
    }

    #[test]
    fn test_range_uses_stage_low_and_high() {
        let out = calculate_valuation(&seed_input()).unwrap().result;
        // adjustments total +5
        assert_eq!(out.low_multiple, dec!(10));
        assert_eq!(out.high_multiple, dec!(17));
        assert_eq!(out.valuation_low, dec!(6_000_000));
        assert_eq!(out.valuation_high, dec!(10_200_000));
    }

    #[test]
    fn test_floor_applies_to_distressed_company() {
        let input = ValuationInput {
            yoy_growth: dec!(0),
            profit_margin: dec!(-0.5),
            monthly_churn: dec!(0.12),
            nrr: dec!(0.70),
            gross_margin: dec!(0.30),
            stage: CompanyStage::PreSeed,
            ..seed_input()
        };
        let out = calculate_valuation(&input).unwrap().result;
        // 5 - 2 - 5 - 1 - 2 = -5 -> floored
        assert_eq!(out.final_multiple, dec!(1));
        assert_eq!(out.low_multiple, dec!(1));
        assert!(out.floor_applied);
        assert_eq!(out.valuation, dec!(600_000));
    }

    #[test]
    fn test_band_labels_reported() {
        let out = calculate_valuation(&seed_input()).unwrap().result;
        assert_eq!(out.adjustments.rule_of_40.band, ">=50%");
        assert_eq!(out.adjustments.churn_penalty.band, "<=3%");
        assert_eq!(out.adjustments.nrr_bonus.band, ">=110%");
        assert_eq!(out.adjustments.gross_margin.band, ">=75%");
    }

    #[test]
    fn test_rejects_percent_form_churn() {
        let input = ValuationInput {
            monthly_churn: dec!(3),
            ..seed_input()
        };
        assert!(calculate_valuation(&input).is_err());
    }
}
