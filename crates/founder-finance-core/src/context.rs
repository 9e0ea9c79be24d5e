//! Session state and the collaborator interfaces around the engines.
//!
//! Engines are pure functions and never read [`AppContext`]; callers pass it
//! explicitly and copy values out of it when invoking a calculation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::FounderFinanceError;
use crate::growth::scenarios::BaseRates;
use crate::runway::simulator::{RunwayInput, DEFAULT_HORIZON_MONTHS};
use crate::types::{Money, Rate, Runway};
use crate::FounderFinanceResult;

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Point-in-time financial state produced outside the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub cash_on_hand: Money,
    /// Gross monthly spend.
    pub monthly_burn: Money,
    pub monthly_revenue: Money,
    /// Annual decimal rate.
    #[serde(default)]
    pub revenue_growth: Rate,
    /// Annual decimal rate.
    #[serde(default)]
    pub expense_growth: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl FinancialSnapshot {
    /// Spend minus revenue. Negative when the company is cash-flow positive.
    pub fn net_burn(&self) -> Money {
        self.monthly_burn - self.monthly_revenue
    }

    pub fn runway(&self) -> Runway {
        Runway::from_cash_and_burn(self.cash_on_hand, self.net_burn())
    }

    pub fn to_runway_input(&self) -> RunwayInput {
        RunwayInput::from(self)
    }
}

impl From<&FinancialSnapshot> for RunwayInput {
    fn from(s: &FinancialSnapshot) -> Self {
        RunwayInput {
            cash_on_hand: s.cash_on_hand,
            monthly_expenses: s.monthly_burn,
            monthly_revenue: s.monthly_revenue,
            expense_growth: s.expense_growth,
            revenue_growth: s.revenue_growth,
            preset: None,
            horizon_months: DEFAULT_HORIZON_MONTHS,
        }
    }
}

// ─── AppContext ──────────────────────────────────────────────────────────────

/// Insights from one engine run, kept so the advisor can cite them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub engine: String,
    pub insights: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppContext {
    snapshot: Option<FinancialSnapshot>,
    runway_scenarios: Vec<RunwayInput>,
    growth_rates: Option<BaseRates>,
    /// One record per engine, oldest first.
    analyses: Vec<AnalysisRecord>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&mut self, snapshot: FinancialSnapshot) {
        log::debug!("context: snapshot updated (cash={})", snapshot.cash_on_hand);
        self.snapshot = Some(snapshot);
    }

    pub fn set_runway_scenarios(&mut self, scenarios: Vec<RunwayInput>) {
        self.runway_scenarios = scenarios;
    }

    pub fn set_growth_rates(&mut self, rates: BaseRates) {
        self.growth_rates = Some(rates);
    }

    /// Store the latest insights for `engine`, replacing any earlier record.
    pub fn record_analysis(&mut self, engine: &str, insights: Vec<String>) {
        self.analyses.retain(|a| a.engine != engine);
        self.analyses.push(AnalysisRecord {
            engine: engine.to_string(),
            insights,
            recorded_at: Utc::now(),
        });
    }

    pub fn snapshot(&self) -> Option<&FinancialSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn runway_scenarios(&self) -> &[RunwayInput] {
        &self.runway_scenarios
    }

    pub fn growth_rates(&self) -> Option<&BaseRates> {
        self.growth_rates.as_ref()
    }

    pub fn analyses(&self) -> &[AnalysisRecord] {
        &self.analyses
    }

    /// Most recent record for `engine`, if any.
    pub fn latest_analysis(&self, engine: &str) -> Option<&AnalysisRecord> {
        self.analyses.iter().find(|a| a.engine == engine)
    }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &FinancialSnapshot) -> FounderFinanceResult<()>;
    fn fetch_latest(&self) -> FounderFinanceResult<Option<FinancialSnapshot>>;
}

/// In-process store; the latest snapshot is the last one saved.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<Vec<FinancialSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, snapshot: &FinancialSnapshot) -> FounderFinanceResult<()> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| FounderFinanceError::Persistence(format!("snapshot store poisoned: {e}")))?;
        guard.push(snapshot.clone());
        Ok(())
    }

    fn fetch_latest(&self) -> FounderFinanceResult<Option<FinancialSnapshot>> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| FounderFinanceError::Persistence(format!("snapshot store poisoned: {e}")))?;
        Ok(guard.last().cloned())
    }
}

// ─── Advisor ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The metric subset handed to an advisor alongside a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorContext {
    pub cash_on_hand: Money,
    pub monthly_burn: Money,
    pub monthly_revenue: Money,
    pub net_burn: Money,
    pub runway: Runway,
    pub revenue_growth: Rate,
    pub expense_growth: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_mrr_growth: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub churn_rate: Option<Rate>,
    /// Insights from the latest run of each engine.
    pub insights: Vec<String>,
}

impl AdvisorContext {
    pub fn from_snapshot(snapshot: &FinancialSnapshot) -> Self {
        AdvisorContext {
            cash_on_hand: snapshot.cash_on_hand,
            monthly_burn: snapshot.monthly_burn,
            monthly_revenue: snapshot.monthly_revenue,
            net_burn: snapshot.net_burn(),
            runway: snapshot.runway(),
            revenue_growth: snapshot.revenue_growth,
            expense_growth: snapshot.expense_growth,
            monthly_mrr_growth: None,
            churn_rate: None,
            insights: Vec::new(),
        }
    }

    /// Build from the session, enriching the snapshot with growth rates and
    /// the latest insights per engine.
    pub fn from_app_context(ctx: &AppContext) -> FounderFinanceResult<Self> {
        let snapshot = ctx.snapshot().ok_or_else(|| {
            FounderFinanceError::InsufficientData("No financial snapshot in context".into())
        })?;
        let mut advisor_ctx = Self::from_snapshot(snapshot);
        if let Some(rates) = ctx.growth_rates() {
            advisor_ctx.monthly_mrr_growth = Some(rates.monthly_growth_rate);
            advisor_ctx.churn_rate = Some(rates.churn_rate);
        }

        for record in ctx.analyses().iter().rev() {
            advisor_ctx.insights.extend(record.insights.iter().cloned());
        }
        Ok(advisor_ctx)
    }

    pub fn is_burning(&self) -> bool {
        self.net_burn > Decimal::ZERO
    }
}

/// Conversational advisor backed by an external model.
pub trait Advisor: Send + Sync {
    fn chat(
        &self,
        prompt: &str,
        context: &AdvisorContext,
        history: &[ChatMessage],
    ) -> FounderFinanceResult<String>;
}
