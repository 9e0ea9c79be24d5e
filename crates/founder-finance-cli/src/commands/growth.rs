use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use founder_finance_core::growth::projection::{compare_growth_scenarios, project_growth, GrowthInput};
use founder_finance_core::growth::scenarios::{derive_scenario, BaseRates, ScenarioKind, ScenarioOverrides};

use crate::input;

/// Arguments shared by the growth commands
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct GrowthArgs {
    /// Current monthly recurring revenue
    #[arg(long)]
    pub mrr: Option<Decimal>,

    /// Average revenue per account (monthly)
    #[arg(long)]
    pub arpa: Option<Decimal>,

    /// New customers acquired per month
    #[arg(long, default_value = "0")]
    pub new_customers: Decimal,

    /// Projection horizon in months
    #[arg(long, default_value = "24")]
    pub months: u32,

    /// Growth rate layered on the waterfall (applied as rate / 12 monthly)
    #[arg(long)]
    pub growth_rate: Option<Decimal>,

    /// Monthly churn (e.g. 0.03 for 3%)
    #[arg(long, default_value = "0")]
    pub churn: Decimal,

    /// Monthly expansion
    #[arg(long, default_value = "0")]
    pub expansion: Decimal,

    /// Monthly contraction
    #[arg(long, default_value = "0")]
    pub contraction: Decimal,

    /// ARR milestone to locate
    #[arg(long)]
    pub target_arr: Option<Decimal>,

    /// Scenario to project: conservative, base or optimistic
    #[arg(long, default_value = "base", value_parser = parse_kind)]
    pub scenario: ScenarioKind,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// File/stdin shape: `{ "input": {...}, "rates": {...}, "scenario": "base", "overrides": {...} }`
#[derive(Deserialize)]
struct GrowthRequest {
    input: GrowthInput,
    rates: BaseRates,
    #[serde(default)]
    scenario: Option<ScenarioKind>,
    #[serde(default)]
    overrides: Option<ScenarioOverrides>,
}

fn parse_kind(s: &str) -> Result<ScenarioKind, String> {
    serde_json::from_value(Value::String(s.to_ascii_lowercase()))
        .map_err(|_| format!("unknown scenario '{s}' (expected conservative, base, optimistic)"))
}

fn request_from_flags(args: &GrowthArgs) -> Result<GrowthRequest, Box<dyn std::error::Error>> {
    Ok(GrowthRequest {
        input: GrowthInput {
            current_mrr: args.mrr.ok_or("--mrr is required (or provide --input)")?,
            arpa: args.arpa.ok_or("--arpa is required (or provide --input)")?,
            new_customers_per_month: args.new_customers,
            months: args.months,
            target_arr: args.target_arr,
            start_date: None,
        },
        rates: BaseRates {
            monthly_growth_rate: args
                .growth_rate
                .ok_or("--growth-rate is required (or provide --input)")?,
            churn_rate: args.churn,
            expansion_rate: args.expansion,
            contraction_rate: args.contraction,
        },
        scenario: Some(args.scenario),
        overrides: None,
    })
}

fn load_request(args: &GrowthArgs) -> Result<GrowthRequest, Box<dyn std::error::Error>> {
    match input::load(args.input.as_deref())? {
        Some(request) => Ok(request),
        None => request_from_flags(args),
    }
}

pub fn run_growth(args: GrowthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(&args)?;
    let kind = match request.scenario {
        Some(ScenarioKind::Custom) | None => ScenarioKind::Base,
        Some(kind) => kind,
    };
    let mut scenario = derive_scenario(&request.rates, kind);
    if let Some(overrides) = &request.overrides {
        scenario = scenario.with_overrides(overrides);
    }

    let result = project_growth(&request.input, &scenario)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_growth_compare(args: GrowthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(&args)?;
    let result = compare_growth_scenarios(&request.input, &request.rates)?;
    Ok(serde_json::to_value(result)?)
}
