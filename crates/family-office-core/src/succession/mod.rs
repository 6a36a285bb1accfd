pub mod heirs;
pub mod scenarios;
