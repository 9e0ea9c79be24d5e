use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use founder_finance_core::valuation::exit::{project_exit_scenarios, ExitInput};
use founder_finance_core::valuation::multiples::{calculate_valuation, CompanyStage, ValuationInput};

use crate::input;

/// Arguments for an ARR multiple valuation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ValuationArgs {
    /// Monthly recurring revenue
    #[arg(long)]
    pub mrr: Option<Decimal>,

    /// Year-over-year revenue growth (e.g. 0.50 for 50%)
    #[arg(long)]
    pub yoy_growth: Option<Decimal>,

    /// Operating profit margin (negative when burning)
    #[arg(long, default_value = "0")]
    pub profit_margin: Decimal,

    /// Monthly churn
    #[arg(long)]
    pub churn: Option<Decimal>,

    /// Net revenue retention (e.g. 1.10 for 110%)
    #[arg(long)]
    pub nrr: Option<Decimal>,

    /// Gross margin
    #[arg(long)]
    pub gross_margin: Option<Decimal>,

    /// Stage: pre_seed, seed, series_a, series_b or growth
    #[arg(long, default_value = "seed", value_parser = parse_stage)]
    pub stage: CompanyStage,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for exit scenario projection
#[derive(Args)]
pub struct ExitArgs {
    /// Current monthly recurring revenue
    #[arg(long)]
    pub mrr: Option<Decimal>,

    /// Month-over-month MRR growth
    #[arg(long)]
    pub growth_rate: Option<Decimal>,

    /// Current ARR multiple
    #[arg(long)]
    pub multiple: Option<Decimal>,

    /// Comma-separated MRR milestones
    #[arg(long, value_delimiter = ',')]
    pub targets: Vec<Decimal>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn parse_stage(s: &str) -> Result<CompanyStage, String> {
    serde_json::from_value(Value::String(s.replace('-', "_")))
        .map_err(|_| format!("unknown stage '{s}' (expected pre_seed, seed, series_a, series_b, growth)"))
}

pub fn run_valuation(args: ValuationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let valuation_input: ValuationInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => ValuationInput {
            mrr: args.mrr.ok_or("--mrr is required (or provide --input)")?,
            yoy_growth: args
                .yoy_growth
                .ok_or("--yoy-growth is required (or provide --input)")?,
            profit_margin: args.profit_margin,
            monthly_churn: args.churn.ok_or("--churn is required (or provide --input)")?,
            nrr: args.nrr.ok_or("--nrr is required (or provide --input)")?,
            gross_margin: args
                .gross_margin
                .ok_or("--gross-margin is required (or provide --input)")?,
            stage: args.stage,
        },
    };

    let result = calculate_valuation(&valuation_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_exit_scenarios(args: ExitArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let exit_input: ExitInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => ExitInput {
            current_mrr: args.mrr.ok_or("--mrr is required (or provide --input)")?,
            monthly_growth_rate: args
                .growth_rate
                .ok_or("--growth-rate is required (or provide --input)")?,
            current_multiple: args
                .multiple
                .ok_or("--multiple is required (or provide --input)")?,
            target_mrrs: args.targets,
        },
    };

    let result = project_exit_scenarios(&exit_input)?;
    Ok(serde_json::to_value(result)?)
}
