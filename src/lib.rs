//! Accuracy benchmarking for machine-learned interatomic potentials.
//!
//! Compares a trained calculator's energies and forces against reference
//! (first-principles) data, and runs k-fold cross-validation of a chosen
//! network topology.

pub mod bench;
pub mod config;
pub mod core;
pub mod data;
pub mod engine;
pub mod error;

pub use bench::benchmark::{benchmark, run_benchmark, BenchmarkSummary};
pub use bench::validate::{validate, validate_energy, validate_forces, Accuracy};
pub use error::AipesError;
