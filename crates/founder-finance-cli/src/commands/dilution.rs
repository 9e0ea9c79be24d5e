use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use founder_finance_core::dilution::cap_table::{CapTable, Stakeholder};
use founder_finance_core::dilution::funding_round::{
    compare_funding_rounds, model_funding_round, FundingRoundInput,
};

use crate::input;

/// Arguments for modelling one funding round
#[derive(Args)]
pub struct FundingRoundArgs {
    /// Path to JSON/YAML file with `stakeholders`, `option_pool_shares` and `round`
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for comparing alternative rounds
#[derive(Args)]
pub struct CompareRoundsArgs {
    /// Path to JSON/YAML file with `stakeholders`, `option_pool_shares` and `rounds`
    #[arg(long)]
    pub input: Option<String>,
}

/// Cap table as holders, so totals and percentages are always derived.
#[derive(Deserialize)]
struct Holdings {
    stakeholders: Vec<Stakeholder>,
    #[serde(default)]
    option_pool_shares: u64,
}

impl Holdings {
    fn into_cap_table(self) -> Result<CapTable, Box<dyn std::error::Error>> {
        Ok(CapTable::from_holdings(self.stakeholders, self.option_pool_shares)?)
    }
}

#[derive(Deserialize)]
struct RoundRequest {
    #[serde(flatten)]
    holdings: Holdings,
    round: FundingRoundInput,
}

#[derive(Deserialize)]
struct CompareRequest {
    #[serde(flatten)]
    holdings: Holdings,
    rounds: Vec<FundingRoundInput>,
}

pub fn run_funding_round(args: FundingRoundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RoundRequest = input::load(args.input.as_deref())?
        .ok_or("--input file (or stdin) is required for funding-round")?;
    let cap_table = request.holdings.into_cap_table()?;

    let result = model_funding_round(&cap_table, &request.round)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_rounds(args: CompareRoundsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CompareRequest = input::load(args.input.as_deref())?
        .ok_or("--input file (or stdin) is required for compare-rounds")?;
    let cap_table = request.holdings.into_cap_table()?;

    let result = compare_funding_rounds(&cap_table, &request.rounds)?;
    Ok(serde_json::to_value(result)?)
}
