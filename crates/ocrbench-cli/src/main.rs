//! ocrbench CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ocrbench::{BenchConfig, Dataset, Scorer, ensure_materialized, materialize, run_benchmark};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ocrbench")]
#[command(version, about = "Benchmark OCR engines on base64-embedded TSV datasets", long_about = None)]
struct Cli {
    /// Configuration file (default: ocrbench.toml in the current or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run inference (memoized) and score the predictions
    Run {
        /// Dataset name from the configuration
        #[arg(short, long)]
        dataset: String,

        /// Model name from the configuration
        #[arg(short, long)]
        model: String,

        /// Only process the first rows of the dataset
        #[arg(long)]
        debug: bool,
    },

    /// Score an existing predictions CSV
    Evaluate {
        /// Predictions CSV with `answer` and `prediction` columns
        #[arg(short, long)]
        predictions: PathBuf,

        /// Dataset name the predictions belong to
        #[arg(short, long)]
        dataset: String,

        /// Model name the predictions belong to
        #[arg(short, long)]
        model: String,

        /// Write into the debug run directory
        #[arg(long)]
        debug: bool,
    },

    /// Decode a dataset's images into the image cache
    Materialize {
        /// Dataset name from the configuration
        #[arg(short, long)]
        dataset: String,

        /// Rebuild the image directory even if it already exists
        #[arg(long)]
        force: bool,
    },

    /// List configured datasets and models
    List,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<BenchConfig> {
    let config = match path {
        Some(path) => BenchConfig::from_toml_file(path)?,
        None => BenchConfig::discover()?.unwrap_or_default(),
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { dataset, model, debug } => {
            let report = run_benchmark(&config, &dataset, &model, debug)
                .await
                .with_context(|| format!("Benchmark of model '{}' on dataset '{}' failed", model, dataset))?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Commands::Evaluate {
            predictions,
            dataset,
            model,
            debug,
        } => {
            let evaluation = Scorer::new(config.layout())
                .evaluate(&predictions, &dataset, Some(&model), debug)
                .with_context(|| format!("Failed to evaluate {}", predictions.display()))?;

            println!("{}", serde_json::to_string_pretty(&evaluation.summary)?);
            Ok(())
        }

        Commands::Materialize { dataset, force } => {
            let dataset_path = config.dataset_path(&dataset)?;
            let loaded = Dataset::from_tsv(dataset_path)?;
            let images_dir = config.layout().images_dir(loaded.name());

            let report = if force {
                if images_dir.exists() {
                    std::fs::remove_dir_all(&images_dir)
                        .with_context(|| format!("Failed to remove {}", images_dir.display()))?;
                }
                Some(materialize(&loaded, &images_dir)?)
            } else {
                ensure_materialized(&loaded, &images_dir)?
            };

            match report {
                Some(report) => println!(
                    "Wrote {} image(s) to {} ({} blank, {} undecodable)",
                    report.written,
                    images_dir.display(),
                    report.skipped_blank,
                    report.failed.len()
                ),
                None => println!("Images already present in {}", images_dir.display()),
            }
            Ok(())
        }

        Commands::List => {
            let layout = config.layout();
            println!("Images root: {}", layout.images_root().display());
            println!("Output root: {}", layout.output_root().display());

            println!("Datasets ({}):", config.datasets.len());
            for (name, path) in &config.datasets {
                println!("  {} - {}", name, path.display());
            }

            let registry = config.engine_registry()?;
            println!("Models ({}):", registry.len());
            for name in registry.names() {
                println!("  {}", name);
            }
            Ok(())
        }
    }
}
