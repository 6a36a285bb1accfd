pub mod calculator;
pub mod memo;
pub mod what_if;
