//! Ordered breakpoint tables for step-function adjustments.
//!
//! A table is scanned top to bottom and the first band whose threshold the
//! metric satisfies wins. Thresholds are inclusive.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a metric is compared against each band's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `metric >= threshold`; bands sorted by descending threshold.
    AtLeast,
    /// `metric <= threshold`; bands sorted by ascending threshold.
    AtMost,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub threshold: Decimal,
    pub value: Decimal,
    pub label: &'static str,
}

impl Band {
    pub const fn new(threshold: Decimal, value: Decimal, label: &'static str) -> Self {
        Band {
            threshold,
            value,
            label,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    pub name: &'static str,
    pub comparison: Comparison,
    pub bands: &'static [Band],
    /// Value and label used when no band matches.
    pub fallback: (Decimal, &'static str),
}

/// The band that fired for a given metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandHit {
    pub table: String,
    pub metric: Decimal,
    pub band: String,
    pub value: Decimal,
}

impl BandTable {
    pub fn lookup(&self, metric: Decimal) -> BandHit {
        let matched = self.bands.iter().find(|b| match self.comparison {
            Comparison::AtLeast => metric >= b.threshold,
            Comparison::AtMost => metric <= b.threshold,
        });
        let (value, band) = match matched {
            Some(b) => (b.value, b.label),
            None => self.fallback,
        };
        BandHit {
            table: self.name.to_string(),
            metric,
            band: band.to_string(),
            value,
        }
    }

    /// Just the adjustment value.
    pub fn value_for(&self, metric: Decimal) -> Decimal {
        self.lookup(metric).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FLOOR_TABLE: BandTable = BandTable {
        name: "test",
        comparison: Comparison::AtLeast,
        bands: &[
            Band::new(dec!(10), dec!(2), ">=10"),
            Band::new(dec!(5), dec!(1), ">=5"),
        ],
        fallback: (dec!(0), "<5"),
    };

    const CEILING_TABLE: BandTable = BandTable {
        name: "test",
        comparison: Comparison::AtMost,
        bands: &[
            Band::new(dec!(1), dec!(0), "<=1"),
            Band::new(dec!(3), dec!(-1), "<=3"),
        ],
        fallback: (dec!(-4), ">3"),
    };

    #[test]
    fn test_at_least_boundaries_are_inclusive() {
        assert_eq!(FLOOR_TABLE.value_for(dec!(10)), dec!(2));
        assert_eq!(FLOOR_TABLE.value_for(dec!(9.99)), dec!(1));
        assert_eq!(FLOOR_TABLE.value_for(dec!(5)), dec!(1));
        assert_eq!(FLOOR_TABLE.lookup(dec!(4.99)).band, "<5");
    }

    #[test]
    fn test_at_most_boundaries_are_inclusive() {
        assert_eq!(CEILING_TABLE.value_for(dec!(1)), dec!(0));
        assert_eq!(CEILING_TABLE.value_for(dec!(1.01)), dec!(-1));
        assert_eq!(CEILING_TABLE.value_for(dec!(3)), dec!(-1));
        assert_eq!(CEILING_TABLE.value_for(dec!(3.5)), dec!(-4));
    }
}
