pub mod shareholder_tax;
pub mod simulator;
pub mod single_year;
