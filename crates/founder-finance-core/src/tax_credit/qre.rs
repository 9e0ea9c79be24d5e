use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::format::{format_currency, format_percent};
use crate::types::{
    require_non_negative, require_unit_rate, with_metadata, ComputationOutput, Money, Rate,
};
use crate::FounderFinanceResult;

/// Employees at or above this research share qualify on their full wage.
pub const FULL_QUALIFICATION_THRESHOLD: Rate = dec!(0.80);
/// Share of US contractor cost that counts as a QRE.
pub const CONTRACTOR_QUALIFIED_SHARE: Rate = dec!(0.65);
pub const STARTUP_CREDIT_RATE: Rate = dec!(0.08);
pub const ESTABLISHED_CREDIT_RATE: Rate = dec!(0.066);
pub const STATE_CREDIT_BONUS: Rate = dec!(0.02);
pub const MAX_CREDIT_RATE: Rate = dec!(0.10);
/// Annual ceiling on the payroll-tax offset for qualified small businesses.
pub const PAYROLL_OFFSET_CAP: Money = dec!(500_000);

// ─── Enums ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyType {
    Startup,
    Established,
}

impl CompanyType {
    pub fn base_rate(&self) -> Rate {
        match self {
            CompanyType::Startup => STARTUP_CREDIT_RATE,
            CompanyType::Established => ESTABLISHED_CREDIT_RATE,
        }
    }
}

/// Wage inputs, either aggregate or per employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WageInput {
    /// Total engineering spend split between employees and contractors.
    Simple {
        total_engineering_wages: Money,
        /// Share of time spent on qualified research (0.80 = 80%).
        rd_percentage: Rate,
        /// Share of engineering spend paid to contractors.
        #[serde(default)]
        contractor_percentage: Rate,
        #[serde(default = "default_true")]
        contractors_us_based: bool,
    },
    Detailed { employees: Vec<EmployeeWage> },
}

fn default_true() -> bool {
    true
}

// ─── Structs ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeWage {
    pub name: String,
    pub annual_wage: Money,
    pub rd_percentage: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    pub name: String,
    pub cost: Money,
    pub us_based: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudSpend {
    pub total_cloud_spend: Money,
    /// Share of cloud spend on development and staging environments.
    pub dev_staging_percentage: Rate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Supplies {
    #[serde(default)]
    pub software: Money,
    #[serde(default)]
    pub hardware: Money,
    #[serde(default)]
    pub other: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCreditInput {
    pub wages: WageInput,
    #[serde(default)]
    pub contractors: Vec<Contractor>,
    #[serde(default)]
    pub cloud: CloudSpend,
    #[serde(default)]
    pub supplies: Supplies,
    pub company_type: CompanyType,
    #[serde(default)]
    pub state_credit: bool,
    /// Claiming the credit against payroll tax (startups only).
    #[serde(default)]
    pub payroll_tax_offset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QreBreakdown {
    pub qualified_wages: Money,
    pub qualified_contractors: Money,
    pub qualified_cloud: Money,
    pub qualified_supplies: Money,
    pub total_qre: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeQre {
    pub name: String,
    pub annual_wage: Money,
    pub rd_percentage: Rate,
    pub qualified_wage: Money,
    /// Whether the 80% rule qualified the full wage.
    pub fully_qualified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCreditResult {
    pub qre: QreBreakdown,
    /// Populated in detailed mode.
    pub employees: Vec<EmployeeQre>,
    pub credit_rate: Rate,
    pub calculated_credit: Money,
    pub final_credit: Money,
    pub capped: bool,
    /// The cap that applies, if any.
    pub cap_amount: Option<Money>,
    pub insights: Vec<String>,
}

// ─── Eligibility rules ───────────────────────────────────────────────────────

/// The 80% rule: substantially-all research time qualifies the whole wage.
pub fn qualified_wage(wage: Money, rd_percentage: Rate) -> Money {
    if rd_percentage >= FULL_QUALIFICATION_THRESHOLD {
        wage
    } else {
        wage * rd_percentage
    }
}

/// 65% of contract research cost, and only for US-performed work.
pub fn qualified_contractor_cost(cost: Money, us_based: bool) -> Money {
    if us_based {
        cost * CONTRACTOR_QUALIFIED_SHARE
    } else {
        Decimal::ZERO
    }
}

pub fn qualified_cloud(cloud: &CloudSpend) -> Money {
    cloud.total_cloud_spend * cloud.dev_staging_percentage
}

pub fn qualified_supplies(supplies: &Supplies) -> Money {
    supplies.software + supplies.hardware + supplies.other
}

/// Base rate for the company type plus the state bonus, capped at 10%.
pub fn credit_rate(company_type: CompanyType, state_credit: bool) -> Rate {
    let bonus = if state_credit {
        STATE_CREDIT_BONUS
    } else {
        Decimal::ZERO
    };
    (company_type.base_rate() + bonus).min(MAX_CREDIT_RATE)
}

fn validate(input: &TaxCreditInput) -> FounderFinanceResult<()> {
    match &input.wages {
        WageInput::Simple {
            total_engineering_wages,
            rd_percentage,
            contractor_percentage,
            ..
        } => {
            require_non_negative("total_engineering_wages", *total_engineering_wages)?;
            require_unit_rate("rd_percentage", *rd_percentage)?;
            require_unit_rate("contractor_percentage", *contractor_percentage)?;
        }
        WageInput::Detailed { employees } => {
            for (i, e) in employees.iter().enumerate() {
                require_non_negative(&format!("employees[{i}].annual_wage"), e.annual_wage)?;
                require_unit_rate(&format!("employees[{i}].rd_percentage"), e.rd_percentage)?;
            }
        }
    }
    for (i, c) in input.contractors.iter().enumerate() {
        require_non_negative(&format!("contractors[{i}].cost"), c.cost)?;
    }
    require_non_negative("cloud.total_cloud_spend", input.cloud.total_cloud_spend)?;
    require_unit_rate("cloud.dev_staging_percentage", input.cloud.dev_staging_percentage)?;
    require_non_negative("supplies.software", input.supplies.software)?;
    require_non_negative("supplies.hardware", input.supplies.hardware)?;
    require_non_negative("supplies.other", input.supplies.other)?;
    Ok(())
}

/// Qualified wages and contractor cost from the wage input, plus per-employee
/// lines in detailed mode.
fn wage_qres(input: &TaxCreditInput) -> (Money, Money, Vec<EmployeeQre>) {
    let listed_contractors: Money = input
        .contractors
        .iter()
        .map(|c| qualified_contractor_cost(c.cost, c.us_based))
        .sum();

    match &input.wages {
        WageInput::Simple {
            total_engineering_wages,
            rd_percentage,
            contractor_percentage,
            contractors_us_based,
        } => {
            let contractor_cost = *total_engineering_wages * *contractor_percentage;
            let employee_wages = *total_engineering_wages - contractor_cost;
            (
                qualified_wage(employee_wages, *rd_percentage),
                listed_contractors + qualified_contractor_cost(contractor_cost, *contractors_us_based),
                Vec::new(),
            )
        }
        WageInput::Detailed { employees } => {
            let lines: Vec<EmployeeQre> = employees
                .iter()
                .map(|e| EmployeeQre {
                    name: e.name.clone(),
                    annual_wage: e.annual_wage,
                    rd_percentage: e.rd_percentage,
                    qualified_wage: qualified_wage(e.annual_wage, e.rd_percentage),
                    fully_qualified: e.rd_percentage >= FULL_QUALIFICATION_THRESHOLD,
                })
                .collect();
            let wages = lines.iter().map(|l| l.qualified_wage).sum();
            (wages, listed_contractors, lines)
        }
    }
}

fn credit_insights(input: &TaxCreditInput, result: &TaxCreditResult) -> Vec<String> {
    let mut insights = vec![format!(
        "Estimated R&D credit of {} on {} of qualified research expenses at {}.",
        format_currency(result.final_credit),
        format_currency(result.qre.total_qre),
        format_percent(result.credit_rate, 1)
    )];

    let partial: Vec<&EmployeeQre> = result.employees.iter().filter(|e| !e.fully_qualified).collect();
    if !partial.is_empty() {
        insights.push(format!(
            "{} employee(s) spend under 80% of their time on research; documenting more R&D time could qualify their full wages.",
            partial.len()
        ));
    }

    let offshore: Money = input
        .contractors
        .iter()
        .filter(|c| !c.us_based)
        .map(|c| c.cost)
        .sum();
    if offshore > Decimal::ZERO {
        insights.push(format!(
            "{} of non-US contractor spend does not qualify.",
            format_currency(offshore)
        ));
    }

    if result.capped {
        insights.push(format!(
            "Payroll-tax offset is capped at {}; {} of credit exceeds the cap.",
            format_currency(PAYROLL_OFFSET_CAP),
            format_currency(result.calculated_credit - result.final_credit)
        ));
    }

    if input.company_type == CompanyType::Startup && !input.payroll_tax_offset {
        insights.push(
            "Pre-revenue startups can apply the credit against payroll tax instead of income tax.".to_string(),
        );
    }

    insights
}

// ─── Function 1: calculate_tax_credit ────────────────────────────────────────

/// Estimate the R&D tax credit from wage, contractor, cloud and supply costs.
pub fn calculate_tax_credit(
    input: &TaxCreditInput,
) -> FounderFinanceResult<ComputationOutput<TaxCreditResult>> {
    let start = Instant::now();
    validate(input)?;

    let mut warnings = Vec::new();
    if input.payroll_tax_offset && input.company_type == CompanyType::Established {
        warnings.push("Payroll-tax offset applies to startups only; no cap applied".to_string());
    }

    let (qualified_wages, qualified_contractors, employees) = wage_qres(input);
    let qualified_cloud = qualified_cloud(&input.cloud);
    let qualified_supplies = qualified_supplies(&input.supplies);
    let total_qre = qualified_wages + qualified_contractors + qualified_cloud + qualified_supplies;

    let rate = credit_rate(input.company_type, input.state_credit);
    let calculated_credit = total_qre * rate;

    let cap_amount = match (input.company_type, input.payroll_tax_offset) {
        (CompanyType::Startup, true) => Some(PAYROLL_OFFSET_CAP),
        _ => None,
    };
    let final_credit = match cap_amount {
        Some(cap) => calculated_credit.min(cap),
        None => calculated_credit,
    };
    let capped = final_credit < calculated_credit;
    if capped {
        log::warn!("R&D credit {calculated_credit} capped at {final_credit}");
    }
    log::debug!("tax credit: qre={total_qre} rate={rate} credit={final_credit}");

    let mut result = TaxCreditResult {
        qre: QreBreakdown {
            qualified_wages,
            qualified_contractors,
            qualified_cloud,
            qualified_supplies,
            total_qre,
        },
        employees,
        credit_rate: rate,
        calculated_credit,
        final_credit,
        capped,
        cap_amount,
        insights: Vec::new(),
    };
    result.insights = credit_insights(input, &result);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "R&D credit (80% wage rule, 65% US contractors, dev/staging cloud, supplies)",
        input,
        warnings,
        elapsed,
        result,
    ))
}
