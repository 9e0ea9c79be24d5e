pub mod dilution;
pub mod growth;
pub mod runway;
pub mod tax_credit;
pub mod valuation;
