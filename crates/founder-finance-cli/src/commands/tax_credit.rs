use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use founder_finance_core::tax_credit::qre::{
    calculate_tax_credit, CloudSpend, CompanyType, Supplies, TaxCreditInput, WageInput,
};

use crate::input;

/// Arguments for a simple-mode R&D credit estimate
#[derive(Args)]
pub struct TaxCreditArgs {
    /// Total engineering wages (employees and contractors)
    #[arg(long)]
    pub wages: Option<Decimal>,

    /// Share of time on qualified research (e.g. 0.80)
    #[arg(long)]
    pub rd_percentage: Option<Decimal>,

    /// Share of engineering spend paid to contractors
    #[arg(long, default_value = "0")]
    pub contractor_percentage: Decimal,

    /// Contractors work outside the US
    #[arg(long)]
    pub offshore_contractors: bool,

    /// Annual cloud spend
    #[arg(long, default_value = "0")]
    pub cloud_spend: Decimal,

    /// Share of cloud spend on dev/staging
    #[arg(long, default_value = "0")]
    pub dev_staging: Decimal,

    /// Research supplies (software, hardware, other) in total
    #[arg(long, default_value = "0")]
    pub supplies: Decimal,

    /// Treat the company as established rather than a startup
    #[arg(long)]
    pub established: bool,

    /// Include the state credit bonus
    #[arg(long)]
    pub state_credit: bool,

    /// Claim against payroll tax (startups; capped)
    #[arg(long)]
    pub payroll_offset: bool,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_tax_credit(args: TaxCreditArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let credit_input: TaxCreditInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => TaxCreditInput {
            wages: WageInput::Simple {
                total_engineering_wages: args.wages.ok_or("--wages is required (or provide --input)")?,
                rd_percentage: args
                    .rd_percentage
                    .ok_or("--rd-percentage is required (or provide --input)")?,
                contractor_percentage: args.contractor_percentage,
                contractors_us_based: !args.offshore_contractors,
            },
            contractors: Vec::new(),
            cloud: CloudSpend {
                total_cloud_spend: args.cloud_spend,
                dev_staging_percentage: args.dev_staging,
            },
            supplies: Supplies {
                software: Decimal::ZERO,
                hardware: Decimal::ZERO,
                other: args.supplies,
            },
            company_type: if args.established {
                CompanyType::Established
            } else {
                CompanyType::Startup
            },
            state_credit: args.state_credit,
            payroll_tax_offset: args.payroll_offset,
        },
    };

    let result = calculate_tax_credit(&credit_input)?;
    Ok(serde_json::to_value(result)?)
}
