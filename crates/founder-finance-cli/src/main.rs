mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::dilution::{CompareRoundsArgs, FundingRoundArgs};
use commands::growth::GrowthArgs;
use commands::runway::{RunwayArgs, RunwayCompareArgs};
use commands::tax_credit::TaxCreditArgs;
use commands::valuation::{ExitArgs, ValuationArgs};

/// Founder financial calculations
#[derive(Parser)]
#[command(
    name = "ffa",
    version,
    about = "Founder financial calculations",
    long_about = "A CLI for the numbers founders live by, computed with decimal precision: \
                  cash runway, MRR growth scenarios, ARR-multiple valuation, funding-round \
                  dilution and R&D tax credit estimates."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate month-by-month cash runway
    Runway(RunwayArgs),
    /// Compare runway under two scenarios
    RunwayCompare(RunwayCompareArgs),
    /// Project MRR for one growth scenario
    Growth(GrowthArgs),
    /// Project conservative, base and optimistic MRR scenarios
    GrowthCompare(GrowthArgs),
    /// Value the company on an adjusted ARR multiple
    Valuation(ValuationArgs),
    /// Project valuation at future MRR milestones
    ExitScenarios(ExitArgs),
    /// Model dilution and runway for a priced round
    FundingRound(FundingRoundArgs),
    /// Compare alternative rounds by founder dilution
    CompareRounds(CompareRoundsArgs),
    /// Estimate the R&D tax credit
    TaxCredit(TaxCreditArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Runway(args) => commands::runway::run_runway(args),
        Commands::RunwayCompare(args) => commands::runway::run_runway_compare(args),
        Commands::Growth(args) => commands::growth::run_growth(args),
        Commands::GrowthCompare(args) => commands::growth::run_growth_compare(args),
        Commands::Valuation(args) => commands::valuation::run_valuation(args),
        Commands::ExitScenarios(args) => commands::valuation::run_exit_scenarios(args),
        Commands::FundingRound(args) => commands::dilution::run_funding_round(args),
        Commands::CompareRounds(args) => commands::dilution::run_compare_rounds(args),
        Commands::TaxCredit(args) => commands::tax_credit::run_tax_credit(args),
        Commands::Version => {
            println!("ffa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
