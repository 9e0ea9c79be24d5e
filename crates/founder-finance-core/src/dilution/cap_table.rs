use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FounderFinanceError;
use crate::types::Rate;
use crate::FounderFinanceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderKind {
    Founder,
    Investor,
    Employee,
    OptionPool,
}

/// A single row in the cap table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StakeholderKind,
    pub shares: u64,
    /// Percentage (0-100) of total shares.
    #[serde(default)]
    pub ownership_percent: Decimal,
}

impl Stakeholder {
    pub fn new(id: &str, name: &str, kind: StakeholderKind, shares: u64) -> Self {
        Stakeholder {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            shares,
            ownership_percent: Decimal::ZERO,
        }
    }
}

/// Sum share counts, rejecting totals that do not fit in `u64`.
pub(crate) fn sum_shares(
    field: &str,
    shares: impl IntoIterator<Item = u64>,
) -> FounderFinanceResult<u64> {
    shares
        .into_iter()
        .try_fold(0u64, |acc, n| acc.checked_add(n))
        .ok_or_else(|| FounderFinanceError::InvalidInput {
            field: field.into(),
            reason: "Share count exceeds the supported range".into(),
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapTable {
    pub total_shares: u64,
    pub stakeholders: Vec<Stakeholder>,
    /// Pool share of total, as a decimal (0.10 = 10%).
    pub option_pool_percent: Rate,
    pub option_pool_shares: u64,
}

impl CapTable {
    /// Build a cap table from holdings, deriving totals and percentages.
    ///
    /// `option_pool_shares` covers the whole pool; if an `option_pool`
    /// stakeholder is listed its shares count towards it rather than on top.
    pub fn from_holdings(
        stakeholders: Vec<Stakeholder>,
        option_pool_shares: u64,
    ) -> FounderFinanceResult<CapTable> {
        let listed = sum_shares("stakeholders", stakeholders.iter().map(|s| s.shares))?;
        let listed_pool = sum_shares(
            "stakeholders",
            stakeholders
                .iter()
                .filter(|s| s.kind == StakeholderKind::OptionPool)
                .map(|s| s.shares),
        )?;
        let pool_shares = option_pool_shares.max(listed_pool);
        let total_shares = sum_shares("option_pool_shares", [listed, pool_shares - listed_pool])?;
        if total_shares == 0 {
            return Err(FounderFinanceError::DivisionByZero {
                context: "cap table with zero shares".into(),
            });
        }

        let total = Decimal::from(total_shares);
        let stakeholders = stakeholders
            .into_iter()
            .map(|mut s| {
                s.ownership_percent = (Decimal::from(s.shares) / total * dec!(100)).round_dp(4);
                s
            })
            .collect();

        Ok(CapTable {
            total_shares,
            stakeholders,
            option_pool_percent: Decimal::from(pool_shares) / total,
            option_pool_shares: pool_shares,
        })
    }

    /// Pool shares not represented by an `option_pool` stakeholder row.
    pub fn unlisted_pool_shares(&self) -> u64 {
        let listed_pool = self
            .stakeholders
            .iter()
            .filter(|s| s.kind == StakeholderKind::OptionPool)
            .fold(0u64, |acc, s| acc.saturating_add(s.shares));
        self.option_pool_shares.saturating_sub(listed_pool)
    }

    /// Shares held by stakeholders plus unlisted pool shares.
    pub fn accounted_shares(&self) -> FounderFinanceResult<u64> {
        sum_shares(
            "stakeholders",
            self.stakeholders
                .iter()
                .map(|s| s.shares)
                .chain(std::iter::once(self.unlisted_pool_shares())),
        )
    }

    /// Reject tables whose holdings exceed the share count or whose pool
    /// percentage is not a decimal in [0, 1).
    pub fn validate(&self) -> FounderFinanceResult<()> {
        if self.total_shares == 0 {
            return Err(FounderFinanceError::InvalidInput {
                field: "total_shares".into(),
                reason: "Total shares must be greater than zero".into(),
            });
        }
        if self.option_pool_percent < Decimal::ZERO || self.option_pool_percent >= Decimal::ONE {
            return Err(FounderFinanceError::InvalidInput {
                field: "option_pool_percent".into(),
                reason: "Option pool percentage must be a decimal in [0, 1)".into(),
            });
        }
        let accounted = self.accounted_shares()?;
        if accounted > self.total_shares {
            return Err(FounderFinanceError::InvalidInput {
                field: "stakeholders".into(),
                reason: format!(
                    "Holdings ({accounted}) exceed total shares ({})",
                    self.total_shares
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_holdings_derives_percentages() {
        let table = CapTable::from_holdings(
            vec![
                Stakeholder::new("f1", "Founder A", StakeholderKind::Founder, 6_000_000),
                Stakeholder::new("f2", "Founder B", StakeholderKind::Founder, 3_000_000),
            ],
            1_000_000,
        )
        .unwrap();
        assert_eq!(table.total_shares, 10_000_000);
        assert_eq!(table.stakeholders[0].ownership_percent, dec!(60));
        assert_eq!(table.option_pool_percent, dec!(0.1));
        assert_eq!(table.unlisted_pool_shares(), 1_000_000);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_listed_pool_not_double_counted() {
        let table = CapTable::from_holdings(
            vec![
                Stakeholder::new("f1", "Founder", StakeholderKind::Founder, 9_000_000),
                Stakeholder::new("pool", "ESOP", StakeholderKind::OptionPool, 1_000_000),
            ],
            1_000_000,
        )
        .unwrap();
        assert_eq!(table.total_shares, 10_000_000);
        assert_eq!(table.unlisted_pool_shares(), 0);
    }

    #[test]
    fn test_overallocated_table_rejected() {
        let table = CapTable {
            total_shares: 1_000,
            stakeholders: vec![Stakeholder::new("f1", "Founder", StakeholderKind::Founder, 1_200)],
            option_pool_percent: dec!(0),
            option_pool_shares: 0,
        };
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_share_overflow_is_invalid_input() {
        let result = CapTable::from_holdings(
            vec![
                Stakeholder::new("f1", "Founder A", StakeholderKind::Founder, u64::MAX),
                Stakeholder::new("f2", "Founder B", StakeholderKind::Founder, 1),
            ],
            0,
        );
        assert!(matches!(result, Err(FounderFinanceError::InvalidInput { .. })));
    }

    #[test]
    fn test_pool_on_top_of_full_table_is_invalid_input() {
        let result = CapTable::from_holdings(
            vec![Stakeholder::new("f1", "Founder", StakeholderKind::Founder, u64::MAX)],
            10,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_table_is_error() {
        assert!(CapTable::from_holdings(Vec::new(), 0).is_err());
    }
}
