use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bench::mep::Convergence;
use crate::core::domain::Topology;

/// Run settings, loadable from a JSON file. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkParams {
    /// Number of cross-validation folds.
    pub ngroup: usize,
    /// Seed for the fold assignment.
    pub seed: u64,
    pub topology: Topology,
    pub convergence: Convergence,
}

impl Default for BenchmarkParams {
    fn default() -> Self {
        Self {
            ngroup: 5,
            seed: 0,
            topology: Topology::default(),
            convergence: Convergence::default(),
        }
    }
}

impl BenchmarkParams {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open config {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}
