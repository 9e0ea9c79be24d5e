pub mod cap_table;
pub mod funding_round;
