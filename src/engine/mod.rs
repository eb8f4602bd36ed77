pub mod baseline;
pub mod calculator;
pub mod reference;
