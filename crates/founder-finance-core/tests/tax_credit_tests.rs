use founder_finance_core::tax_credit::qre::{
    calculate_tax_credit, CloudSpend, CompanyType, Contractor, EmployeeWage, Supplies,
    TaxCreditInput, WageInput,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn simple_input(wages: Decimal, rd: Decimal) -> TaxCreditInput {
    TaxCreditInput {
        wages: WageInput::Simple {
            total_engineering_wages: wages,
            rd_percentage: rd,
            contractor_percentage: dec!(0),
            contractors_us_based: true,
        },
        contractors: Vec::new(),
        cloud: CloudSpend::default(),
        supplies: Supplies::default(),
        company_type: CompanyType::Startup,
        state_credit: true,
        payroll_tax_offset: true,
    }
}

#[test]
fn test_startup_reference_credit() {
    let out = calculate_tax_credit(&simple_input(dec!(500_000), dec!(0.80)))
        .unwrap()
        .result;
    assert_eq!(out.qre.qualified_wages, dec!(500_000));
    assert_eq!(out.qre.total_qre, dec!(500_000));
    assert_eq!(out.credit_rate, dec!(0.10));
    assert_eq!(out.final_credit, dec!(50_000));
    assert!(!out.capped);
}

#[test]
fn test_full_research_time_qualifies_all_wages() {
    let input = TaxCreditInput {
        cloud: CloudSpend {
            total_cloud_spend: dec!(60_000),
            dev_staging_percentage: dec!(0.5),
        },
        supplies: Supplies {
            software: dec!(12_000),
            hardware: dec!(8_000),
            other: dec!(0),
        },
        ..simple_input(dec!(750_000), dec!(1))
    };
    let out = calculate_tax_credit(&input).unwrap().result;
    assert_eq!(out.qre.qualified_wages, dec!(750_000));
    assert_eq!(
        out.qre.total_qre,
        dec!(750_000) + out.qre.qualified_cloud + out.qre.qualified_supplies
    );
    assert_eq!(out.qre.total_qre, dec!(800_000));
}

#[test]
fn test_simple_and_detailed_modes_agree() {
    for rd in [dec!(0.35), dec!(0.80), dec!(1)] {
        let simple = calculate_tax_credit(&simple_input(dec!(240_000), rd)).unwrap().result;
        let detailed_input = TaxCreditInput {
            wages: WageInput::Detailed {
                employees: vec![EmployeeWage {
                    name: "Engineering".into(),
                    annual_wage: dec!(240_000),
                    rd_percentage: rd,
                }],
            },
            ..simple_input(dec!(0), dec!(0))
        };
        let detailed = calculate_tax_credit(&detailed_input).unwrap().result;
        assert_eq!(simple.qre, detailed.qre);
        assert_eq!(simple.final_credit, detailed.final_credit);
    }
}

#[test]
fn test_detailed_mode_applies_rule_per_employee() {
    let input = TaxCreditInput {
        wages: WageInput::Detailed {
            employees: vec![
                EmployeeWage {
                    name: "Staff engineer".into(),
                    annual_wage: dec!(200_000),
                    rd_percentage: dec!(0.90),
                },
                EmployeeWage {
                    name: "Eng manager".into(),
                    annual_wage: dec!(180_000),
                    rd_percentage: dec!(0.40),
                },
            ],
        },
        contractors: vec![
            Contractor {
                name: "US agency".into(),
                cost: dec!(100_000),
                us_based: true,
            },
            Contractor {
                name: "Offshore studio".into(),
                cost: dec!(50_000),
                us_based: false,
            },
        ],
        state_credit: false,
        ..simple_input(dec!(0), dec!(0))
    };
    let out = calculate_tax_credit(&input).unwrap().result;
    assert_eq!(out.employees.len(), 2);
    assert!(out.employees[0].fully_qualified);
    assert_eq!(out.employees[0].qualified_wage, dec!(200_000));
    assert_eq!(out.employees[1].qualified_wage, dec!(72_000));
    assert_eq!(out.qre.qualified_wages, dec!(272_000));
    assert_eq!(out.qre.qualified_contractors, dec!(65_000));
    assert_eq!(out.credit_rate, dec!(0.08));
    assert_eq!(out.final_credit, dec!(26_960));
    assert!(out.insights.iter().any(|i| i.contains("non-US")));
}

#[test]
fn test_payroll_offset_cap() {
    let out = calculate_tax_credit(&simple_input(dec!(8_000_000), dec!(0.9)))
        .unwrap()
        .result;
    assert_eq!(out.calculated_credit, dec!(800_000));
    assert_eq!(out.final_credit, dec!(500_000));
    assert!(out.capped);
}

#[test]
fn test_calculation_is_repeatable() {
    let input = simple_input(dec!(320_000), dec!(0.6));
    let a = calculate_tax_credit(&input).unwrap().result;
    let b = calculate_tax_credit(&input).unwrap().result;
    assert_eq!(a, b);
}

#[test]
fn test_negative_wages_rejected() {
    assert!(calculate_tax_credit(&simple_input(dec!(-1), dec!(0.5))).is_err());
}
