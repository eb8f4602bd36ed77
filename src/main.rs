use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use aipes::config::BenchmarkParams;
use aipes::core::domain::Topology;
use aipes::data::dataset::{load_images, KFoldDataset};
use aipes::engine::baseline::CompositionModel;
use aipes::run_benchmark;

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(author, version, about = "AIPES: k-fold accuracy benchmark for interatomic potentials", long_about = None)]
struct Args {
    /// JSON file holding the reference images (energies and forces attached)
    data: PathBuf,

    /// JSON run configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of cross-validation groups
    #[arg(short, long)]
    groups: Option<usize>,

    /// Seed for the fold assignment
    #[arg(short, long)]
    seed: Option<u64>,

    /// Hidden layer sizes, comma separated (e.g. 10,10)
    #[arg(short, long, value_delimiter = ',')]
    layers: Option<Vec<usize>>,

    /// Activation function of the hidden layers
    #[arg(short, long)]
    activation: Option<String>,

    /// Also write per-fold accuracies and means as JSON to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// --- Initialization Helpers ---

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn resolve_params(args: &Args) -> Result<BenchmarkParams> {
    let mut params = match &args.config {
        Some(path) => BenchmarkParams::load(path)?,
        None => BenchmarkParams::default(),
    };

    if let Some(ngroup) = args.groups {
        params.ngroup = ngroup;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(layers) = &args.layers {
        params.topology.hidden_layers = layers.clone();
    }
    if let Some(activation) = &args.activation {
        params.topology.activation = activation.clone();
    }
    Ok(params)
}

// --- Main ---

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let params = resolve_params(&args)?;
    let images = load_images(&args.data)?;
    info!("Loaded {} images from {}", images.len(), args.data.display());

    let dataset = KFoldDataset::new(images, params.ngroup, params.seed)
        .context("Failed to partition the reference images")?;

    let factory = |topology: &Topology| -> Result<CompositionModel> { Ok(CompositionModel::new(topology)) };

    let stdout = std::io::stdout();
    let summary = run_benchmark(factory, &params.topology, &dataset, &mut stdout.lock())?;
    if let Some(path) = &args.summary {
        summary.save_json(path)?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}
