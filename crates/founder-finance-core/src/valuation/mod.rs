pub mod exit;
pub mod multiples;
