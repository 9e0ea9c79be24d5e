use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FounderFinanceError;
use crate::FounderFinanceResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 8.5x ARR)
pub type Multiple = Decimal;

/// Months of survival at a given burn.
///
/// `Infinite` is the sentinel for a company that is not burning cash
/// (burn <= 0). It is never represented as NaN or as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "months", rename_all = "snake_case")]
pub enum Runway {
    Months(Decimal),
    Infinite,
}

impl Runway {
    /// Static runway: `cash / burn`, or `Infinite` when burn <= 0.
    pub fn from_cash_and_burn(cash: Money, monthly_burn: Money) -> Self {
        if monthly_burn <= Decimal::ZERO {
            return Runway::Infinite;
        }
        let cash = cash.max(Decimal::ZERO);
        Runway::Months((cash / monthly_burn).round_dp(2))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Runway::Infinite)
    }

    pub fn months(&self) -> Option<Decimal> {
        match self {
            Runway::Months(m) => Some(*m),
            Runway::Infinite => None,
        }
    }

    /// Runway gained relative to `base`. Infinite on either side stays infinite.
    pub fn gain_over(&self, base: &Runway) -> Runway {
        match (self, base) {
            (Runway::Months(a), Runway::Months(b)) => Runway::Months(*a - *b),
            _ => Runway::Infinite,
        }
    }

    /// Finite difference `self - other`; `None` when either side is infinite.
    pub fn delta(&self, other: &Runway) -> Option<Decimal> {
        match (self, other) {
            (Runway::Months(a), Runway::Months(b)) => Some(*a - *b),
            _ => None,
        }
    }

    /// Whether this runway is strictly shorter than `months`.
    pub fn shorter_than(&self, months: Decimal) -> bool {
        match self {
            Runway::Months(m) => *m < months,
            Runway::Infinite => false,
        }
    }
}

impl PartialOrd for Runway {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match (self, other) {
            (Runway::Infinite, Runway::Infinite) => Some(Ordering::Equal),
            (Runway::Infinite, Runway::Months(_)) => Some(Ordering::Greater),
            (Runway::Months(_), Runway::Infinite) => Some(Ordering::Less),
            (Runway::Months(a), Runway::Months(b)) => a.partial_cmp(b),
        }
    }
}

impl fmt::Display for Runway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runway::Months(m) => write!(f, "{} months", m.round_dp(1)),
            Runway::Infinite => write!(f, "Infinite"),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

// ─── Boundary validation ─────────────────────────────────────────────────────

/// Reject negative amounts.
pub(crate) fn require_non_negative(field: &str, value: Decimal) -> FounderFinanceResult<()> {
    if value < Decimal::ZERO {
        return Err(FounderFinanceError::InvalidInput {
            field: field.into(),
            reason: format!("Must be non-negative, got {value}"),
        });
    }
    Ok(())
}

/// Reject rates outside [0, 1]. Percentages are never accepted in 0-100 form.
pub(crate) fn require_unit_rate(field: &str, value: Rate) -> FounderFinanceResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(FounderFinanceError::InvalidInput {
            field: field.into(),
            reason: format!("Rate must be a decimal in [0, 1], got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_burn_is_infinite() {
        assert_eq!(Runway::from_cash_and_burn(dec!(500_000), dec!(0)), Runway::Infinite);
        assert_eq!(Runway::from_cash_and_burn(dec!(500_000), dec!(-10_000)), Runway::Infinite);
    }

    #[test]
    fn test_finite_runway() {
        let r = Runway::from_cash_and_burn(dec!(1_200_000), dec!(100_000));
        assert_eq!(r, Runway::Months(dec!(12)));
        assert_eq!(r.months(), Some(dec!(12)));
    }

    #[test]
    fn test_negative_cash_clamps_to_zero_months() {
        let r = Runway::from_cash_and_burn(dec!(-5_000), dec!(1_000));
        assert_eq!(r, Runway::Months(dec!(0)));
    }

    #[test]
    fn test_gain_and_ordering() {
        let a = Runway::Months(dec!(10));
        let b = Runway::Months(dec!(16));
        assert_eq!(b.gain_over(&a), Runway::Months(dec!(6)));
        assert_eq!(Runway::Infinite.gain_over(&a), Runway::Infinite);
        assert!(Runway::Infinite > b);
        assert_eq!(a.delta(&Runway::Infinite), None);
    }

    #[test]
    fn test_rate_validation_rejects_percent_form() {
        assert!(require_unit_rate("rd_percentage", dec!(80)).is_err());
        assert!(require_unit_rate("rd_percentage", dec!(0.8)).is_ok());
        assert!(require_unit_rate("rd_percentage", dec!(1)).is_ok());
    }
}
