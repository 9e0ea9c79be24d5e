use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use founder_finance_core::runway::simulator::{
    compare_runway_scenarios, simulate_runway, RunwayInput, RunwayPreset,
};

use crate::input;

/// Arguments for a single runway simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RunwayArgs {
    /// Cash in the bank today
    #[arg(long)]
    pub cash: Option<Decimal>,

    /// Monthly operating expenses
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Monthly revenue
    #[arg(long, default_value = "0")]
    pub revenue: Decimal,

    /// Annual expense growth (e.g. 0.10 for 10%)
    #[arg(long, default_value = "0")]
    pub expense_growth: Decimal,

    /// Annual revenue growth (e.g. 0.50 for 50%)
    #[arg(long, default_value = "0")]
    pub revenue_growth: Decimal,

    /// Scenario preset: baseline, hire, winter or growth_push
    #[arg(long, value_parser = parse_preset)]
    pub preset: Option<RunwayPreset>,

    /// Simulation horizon in months
    #[arg(long, default_value = "60")]
    pub months: u32,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for comparing two runway scenarios
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RunwayCompareArgs {
    #[command(flatten)]
    pub base: RunwayArgs,

    /// Preset applied to the base assumptions to form scenario B
    #[arg(long, value_parser = parse_preset)]
    pub against: Option<RunwayPreset>,
}

#[derive(Deserialize)]
struct CompareRequest {
    a: RunwayInput,
    b: RunwayInput,
}

pub(crate) fn parse_preset(s: &str) -> Result<RunwayPreset, String> {
    serde_json::from_value(Value::String(s.replace('-', "_")))
        .map_err(|_| format!("unknown preset '{s}' (expected baseline, hire, winter, growth_push)"))
}

fn input_from_flags(args: &RunwayArgs) -> Result<RunwayInput, Box<dyn std::error::Error>> {
    Ok(RunwayInput {
        cash_on_hand: args.cash.ok_or("--cash is required (or provide --input)")?,
        monthly_expenses: args
            .expenses
            .ok_or("--expenses is required (or provide --input)")?,
        monthly_revenue: args.revenue,
        expense_growth: args.expense_growth,
        revenue_growth: args.revenue_growth,
        preset: args.preset,
        horizon_months: args.months,
    })
}

pub fn run_runway(args: RunwayArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let runway_input: RunwayInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => input_from_flags(&args)?,
    };

    let result = simulate_runway(&runway_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_runway_compare(args: RunwayCompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CompareRequest = match input::load(args.base.input.as_deref())? {
        Some(request) => request,
        None => {
            let a = input_from_flags(&args.base)?;
            let preset = args
                .against
                .ok_or("--against <preset> is required (or provide --input with `a` and `b`)")?;
            let b = RunwayInput {
                preset: Some(preset),
                ..a.clone()
            };
            CompareRequest { a, b }
        }
    };

    let result = compare_runway_scenarios(&request.a, &request.b)?;
    Ok(serde_json::to_value(result)?)
}
