use std::str::FromStr;

use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use founder_finance_core::context::{AdvisorContext, FinancialSnapshot};
use founder_finance_core::dilution::cap_table::{CapTable, Stakeholder};
use founder_finance_core::dilution::funding_round::{self, FundingRoundInput};
use founder_finance_core::growth::projection::{self, GrowthInput};
use founder_finance_core::growth::scenarios::{self, BaseRates, GrowthScenario};
use founder_finance_core::runway::simulator::{self, RunwayInput};
use founder_finance_core::tax_credit::qre::{self, TaxCreditInput};
use founder_finance_core::valuation::exit::{self, ExitInput};
use founder_finance_core::valuation::multiples::{self, ValuationInput};
use founder_finance_core::{format, Runway};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(field: &str, value: &str) -> NapiResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| to_napi_error(format!("{field}: {e}")))
}

// ---------------------------------------------------------------------------
// Runway
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RunwayPair {
    a: RunwayInput,
    b: RunwayInput,
}

#[napi]
pub fn simulate_runway(input_json: String) -> NapiResult<String> {
    let input: RunwayInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = simulator::simulate_runway(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_runway_scenarios(input_json: String) -> NapiResult<String> {
    let pair: RunwayPair = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = simulator::compare_runway_scenarios(&pair.a, &pair.b).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn apply_runway_preset(input_json: String) -> NapiResult<String> {
    let input: RunwayInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    serde_json::to_string(&simulator::apply_preset(&input)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GrowthRequest {
    input: GrowthInput,
    scenario: GrowthScenario,
}

#[derive(Deserialize)]
struct GrowthCompareRequest {
    input: GrowthInput,
    rates: BaseRates,
}

#[napi]
pub fn derive_growth_scenarios(rates_json: String) -> NapiResult<String> {
    let rates: BaseRates = serde_json::from_str(&rates_json).map_err(to_napi_error)?;
    rates.validate().map_err(to_napi_error)?;
    serde_json::to_string(&scenarios::derive_scenarios(&rates)).map_err(to_napi_error)
}

#[napi]
pub fn project_growth(input_json: String) -> NapiResult<String> {
    let req: GrowthRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = projection::project_growth(&req.input, &req.scenario).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_growth_scenarios(input_json: String) -> NapiResult<String> {
    let req: GrowthCompareRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        projection::compare_growth_scenarios(&req.input, &req.rates).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_valuation(input_json: String) -> NapiResult<String> {
    let input: ValuationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = multiples::calculate_valuation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_exit_scenarios(input_json: String) -> NapiResult<String> {
    let input: ExitInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = exit::project_exit_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dilution
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Holdings {
    stakeholders: Vec<Stakeholder>,
    #[serde(default)]
    option_pool_shares: u64,
}

#[derive(Deserialize)]
struct RoundRequest {
    cap_table: Holdings,
    round: FundingRoundInput,
}

#[derive(Deserialize)]
struct CompareRoundsRequest {
    cap_table: Holdings,
    rounds: Vec<FundingRoundInput>,
}

fn build_cap_table(holdings: Holdings) -> NapiResult<CapTable> {
    CapTable::from_holdings(holdings.stakeholders, holdings.option_pool_shares).map_err(to_napi_error)
}

#[napi]
pub fn model_funding_round(input_json: String) -> NapiResult<String> {
    let req: RoundRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let cap_table = build_cap_table(req.cap_table)?;
    let output = funding_round::model_funding_round(&cap_table, &req.round).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_funding_rounds(input_json: String) -> NapiResult<String> {
    let req: CompareRoundsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let cap_table = build_cap_table(req.cap_table)?;
    let output =
        funding_round::compare_funding_rounds(&cap_table, &req.rounds).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax credit
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_tax_credit(input_json: String) -> NapiResult<String> {
    let input: TaxCreditInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = qre::calculate_tax_credit(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Snapshot & advisor context
// ---------------------------------------------------------------------------

#[napi]
pub fn snapshot_runway(snapshot_json: String) -> NapiResult<String> {
    let snapshot: FinancialSnapshot = serde_json::from_str(&snapshot_json).map_err(to_napi_error)?;
    serde_json::to_string(&snapshot.runway()).map_err(to_napi_error)
}

#[napi]
pub fn advisor_context(snapshot_json: String) -> NapiResult<String> {
    let snapshot: FinancialSnapshot = serde_json::from_str(&snapshot_json).map_err(to_napi_error)?;
    serde_json::to_string(&AdvisorContext::from_snapshot(&snapshot)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatting (amounts passed as decimal strings)
// ---------------------------------------------------------------------------

#[napi]
pub fn format_currency(amount: String) -> NapiResult<String> {
    Ok(format::format_currency(parse_decimal("amount", &amount)?))
}

#[napi]
pub fn format_currency_compact(amount: String) -> NapiResult<String> {
    Ok(format::format_currency_compact(parse_decimal("amount", &amount)?))
}

#[napi]
pub fn format_percent(rate: String, decimals: u32) -> NapiResult<String> {
    Ok(format::format_percent(parse_decimal("rate", &rate)?, decimals))
}

#[napi]
pub fn format_runway(runway_json: String) -> NapiResult<String> {
    let runway: Runway = serde_json::from_str(&runway_json).map_err(to_napi_error)?;
    Ok(format::format_runway(&runway))
}
