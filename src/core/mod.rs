pub mod domain;
pub mod spatial;
pub mod stats;
