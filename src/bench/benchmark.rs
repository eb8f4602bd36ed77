use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

use crate::bench::validate::{validate, Accuracy};
use crate::data::dataset::GroupedDataset;
use crate::engine::calculator::Trainable;

/// Per-fold accuracies of a k-fold run and their column means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    pub train: Vec<Accuracy>,
    pub validation: Vec<Accuracy>,
    pub train_mean: Accuracy,
    pub validation_mean: Accuracy,
}

impl BenchmarkSummary {
    /// Writes the summary as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}

/// One row of the summary table, newline-terminated.
pub fn format_row(accuracy: &Accuracy) -> String {
    format!("{}\n", accuracy)
}

/// k-fold cross-validation of the model built by `factory` for `topology`.
///
/// Every group of `dataset` serves once as the validation set while a fresh
/// calculator is trained on the rest. The mean train accuracy and mean
/// validation accuracy are printed to stdout as two rows of
/// `E_rmse E_maxresid F_rmse F_maxresid`.
pub fn benchmark<T, C, F, D>(factory: F, topology: &T, dataset: &D) -> Result<()>
where
    T: ?Sized,
    C: Trainable,
    F: FnMut(&T) -> Result<C>,
    D: GroupedDataset + ?Sized,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_benchmark(factory, topology, dataset, &mut out)?;
    Ok(())
}

/// Same as [`benchmark`], writing the table to `out` and returning the per-fold rows.
///
/// Nothing is written unless every fold succeeds.
pub fn run_benchmark<T, C, F, D, W>(
    mut factory: F,
    topology: &T,
    dataset: &D,
    out: &mut W,
) -> Result<BenchmarkSummary>
where
    T: ?Sized,
    C: Trainable,
    F: FnMut(&T) -> Result<C>,
    D: GroupedDataset + ?Sized,
    W: Write,
{
    let ngroup = dataset.ngroup();
    let mut train_rows = Vec::with_capacity(ngroup);
    let mut validation_rows = Vec::with_capacity(ngroup);

    for index in 0..ngroup {
        let start = Instant::now();

        let mut calc = factory(topology).with_context(|| format!("Fold {}: calculator construction failed", index))?;
        info!("Fold {}/{}: training {}", index + 1, ngroup, calc.name());

        let (train_set, validation_set) = dataset.select(index)?;
        calc.train(&train_set, true)
            .with_context(|| format!("Fold {}: training failed", index))?;
        debug!("Fold {}: trained in {:.2?}", index, start.elapsed());

        let train_acc = validate(&calc, &train_set)
            .with_context(|| format!("Fold {}: validation on training set failed", index))?;
        let validation_acc = validate(&calc, &validation_set)
            .with_context(|| format!("Fold {}: validation on held-out set failed", index))?;

        info!("Fold {}: train      {}", index, train_acc);
        info!("Fold {}: validation {}", index, validation_acc);

        train_rows.push(train_acc);
        validation_rows.push(validation_acc);
    }

    let train_mean = Accuracy::mean(&train_rows)?;
    let validation_mean = Accuracy::mean(&validation_rows)?;

    out.write_all(format_row(&train_mean).as_bytes())?;
    out.write_all(format_row(&validation_mean).as_bytes())?;
    out.flush()?;

    Ok(BenchmarkSummary {
        train: train_rows,
        validation: validation_rows,
        train_mean,
        validation_mean,
    })
}
