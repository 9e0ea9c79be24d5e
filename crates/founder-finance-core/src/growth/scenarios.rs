use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FounderFinanceError;
use crate::types::{require_unit_rate, Rate};
use crate::FounderFinanceResult;

// ─── Enums ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Conservative,
    Base,
    Optimistic,
    Custom,
}

impl ScenarioKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::Conservative => "Conservative",
            ScenarioKind::Base => "Base",
            ScenarioKind::Optimistic => "Optimistic",
            ScenarioKind::Custom => "Custom",
        }
    }
}

// ─── Structs ─────────────────────────────────────────────────────────────────

/// The user-tunable rates every named scenario is derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRates {
    /// Growth rate layered on top of the waterfall; applied as `rate / 12` per month.
    pub monthly_growth_rate: Rate,
    /// Fraction of starting MRR lost to cancellations each month.
    pub churn_rate: Rate,
    /// Fraction of starting MRR added through upsell each month.
    pub expansion_rate: Rate,
    /// Fraction of starting MRR lost to downgrades each month.
    pub contraction_rate: Rate,
}

/// Parameters for one MRR projection path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthScenario {
    pub id: ScenarioKind,
    pub label: String,
    pub monthly_growth_rate: Rate,
    pub churn_rate: Rate,
    pub expansion_rate: Rate,
    pub contraction_rate: Rate,
    /// Growth multiplier the scenario was derived with. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Decimal>,
}

/// Field overrides for a custom scenario. `None` keeps the source value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOverrides {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub monthly_growth_rate: Option<Rate>,
    #[serde(default)]
    pub churn_rate: Option<Rate>,
    #[serde(default)]
    pub expansion_rate: Option<Rate>,
    #[serde(default)]
    pub contraction_rate: Option<Rate>,
}

/// Multipliers that turn one set of base rates into a named scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioMultipliers {
    pub growth: Decimal,
    pub churn: Decimal,
    pub expansion: Decimal,
    pub contraction: Decimal,
}

pub const CONSERVATIVE_MULTIPLIERS: ScenarioMultipliers = ScenarioMultipliers {
    growth: dec!(0.7),
    churn: dec!(1.3),
    expansion: dec!(1),
    contraction: dec!(1.5),
};

pub const BASE_MULTIPLIERS: ScenarioMultipliers = ScenarioMultipliers {
    growth: dec!(1),
    churn: dec!(1),
    expansion: dec!(1),
    contraction: dec!(1),
};

pub const OPTIMISTIC_MULTIPLIERS: ScenarioMultipliers = ScenarioMultipliers {
    growth: dec!(1.4),
    churn: dec!(0.7),
    expansion: dec!(1),
    contraction: dec!(0.5),
};

impl ScenarioKind {
    /// Multipliers for a named scenario; custom scenarios are not derived.
    pub fn multipliers(&self) -> Option<ScenarioMultipliers> {
        match self {
            ScenarioKind::Conservative => Some(CONSERVATIVE_MULTIPLIERS),
            ScenarioKind::Base => Some(BASE_MULTIPLIERS),
            ScenarioKind::Optimistic => Some(OPTIMISTIC_MULTIPLIERS),
            ScenarioKind::Custom => None,
        }
    }
}

impl BaseRates {
    pub fn validate(&self) -> FounderFinanceResult<()> {
        require_unit_rate("monthly_growth_rate", self.monthly_growth_rate)?;
        require_unit_rate("churn_rate", self.churn_rate)?;
        require_unit_rate("expansion_rate", self.expansion_rate)?;
        require_unit_rate("contraction_rate", self.contraction_rate)?;
        Ok(())
    }
}

impl GrowthScenario {
    pub fn validate(&self) -> FounderFinanceResult<()> {
        require_unit_rate("churn_rate", self.churn_rate)?;
        require_unit_rate("expansion_rate", self.expansion_rate)?;
        require_unit_rate("contraction_rate", self.contraction_rate)?;
        // Derived optimistic growth may exceed 1.0, so only the sign is checked.
        if self.monthly_growth_rate < Decimal::ZERO {
            return Err(FounderFinanceError::InvalidInput {
                field: "monthly_growth_rate".into(),
                reason: "Growth rate must be non-negative".into(),
            });
        }
        Ok(())
    }

    /// Build a new scenario from this one with some fields replaced.
    pub fn with_overrides(&self, overrides: &ScenarioOverrides) -> GrowthScenario {
        GrowthScenario {
            id: ScenarioKind::Custom,
            label: overrides
                .label
                .clone()
                .unwrap_or_else(|| format!("{} (custom)", self.label)),
            monthly_growth_rate: overrides
                .monthly_growth_rate
                .unwrap_or(self.monthly_growth_rate),
            churn_rate: overrides.churn_rate.unwrap_or(self.churn_rate),
            expansion_rate: overrides.expansion_rate.unwrap_or(self.expansion_rate),
            contraction_rate: overrides.contraction_rate.unwrap_or(self.contraction_rate),
            modifier: None,
        }
    }
}

// ─── Derivation ──────────────────────────────────────────────────────────────

/// Scale base rates into one named scenario.
pub fn derive_scenario(base: &BaseRates, kind: ScenarioKind) -> GrowthScenario {
    let m = kind.multipliers().unwrap_or(BASE_MULTIPLIERS);
    GrowthScenario {
        id: kind,
        label: kind.label().to_string(),
        monthly_growth_rate: base.monthly_growth_rate * m.growth,
        churn_rate: base.churn_rate * m.churn,
        expansion_rate: base.expansion_rate * m.expansion,
        contraction_rate: base.contraction_rate * m.contraction,
        modifier: Some(m.growth),
    }
}

/// Conservative, base and optimistic scenarios, in that order.
pub fn derive_scenarios(base: &BaseRates) -> [GrowthScenario; 3] {
    [
        derive_scenario(base, ScenarioKind::Conservative),
        derive_scenario(base, ScenarioKind::Base),
        derive_scenario(base, ScenarioKind::Optimistic),
    ]
}

/// Net revenue retention: `1 + expansion - churn - contraction` (monthly).
pub fn calculate_nrr(scenario: &GrowthScenario) -> Rate {
    Decimal::ONE + scenario.expansion_rate - scenario.churn_rate - scenario.contraction_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rates() -> BaseRates {
        BaseRates {
            monthly_growth_rate: dec!(0.08),
            churn_rate: dec!(0.03),
            expansion_rate: dec!(0.02),
            contraction_rate: dec!(0.01),
        }
    }

    #[test]
    fn test_conservative_multipliers() {
        let s = derive_scenario(&rates(), ScenarioKind::Conservative);
        assert_eq!(s.monthly_growth_rate, dec!(0.056));
        assert_eq!(s.churn_rate, dec!(0.039));
        assert_eq!(s.contraction_rate, dec!(0.015));
        assert_eq!(s.expansion_rate, dec!(0.02));
        assert_eq!(s.modifier, Some(dec!(0.7)));
    }

    #[test]
    fn test_optimistic_multipliers() {
        let s = derive_scenario(&rates(), ScenarioKind::Optimistic);
        assert_eq!(s.monthly_growth_rate, dec!(0.112));
        assert_eq!(s.churn_rate, dec!(0.021));
        assert_eq!(s.contraction_rate, dec!(0.005));
    }

    #[test]
    fn test_base_is_identity() {
        let [_, base, _] = derive_scenarios(&rates());
        assert_eq!(base.id, ScenarioKind::Base);
        assert_eq!(base.monthly_growth_rate, dec!(0.08));
        assert_eq!(base.churn_rate, dec!(0.03));
    }

    #[test]
    fn test_overrides_leave_source_untouched() {
        let base = derive_scenario(&rates(), ScenarioKind::Base);
        let custom = base.with_overrides(&ScenarioOverrides {
            churn_rate: Some(dec!(0.01)),
            ..Default::default()
        });
        assert_eq!(custom.id, ScenarioKind::Custom);
        assert_eq!(custom.churn_rate, dec!(0.01));
        assert_eq!(custom.monthly_growth_rate, base.monthly_growth_rate);
        assert_eq!(base.churn_rate, dec!(0.03));
        assert_eq!(custom.label, "Base (custom)");
    }

    #[test]
    fn test_nrr() {
        let base = derive_scenario(&rates(), ScenarioKind::Base);
        assert_eq!(calculate_nrr(&base), dec!(0.98));
    }

    #[test]
    fn test_percent_form_rejected() {
        let mut r = rates();
        r.churn_rate = dec!(3);
        assert!(r.validate().is_err());
    }
}
