pub mod benchmark;
pub mod mep;
pub mod validate;
