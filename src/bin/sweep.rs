//! `sweep` binary — entry point for the corruption-sweep robustness harness.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sweep -- --config eval.json --checkpoint model.pth
//! cargo run --bin sweep -- --config eval.json --severity 4 --label fog_study
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use corruption_sweep::catalog::ConditionCatalog;
use corruption_sweep::config::EvalConfig;
use corruption_sweep::report::ReportSink;
use corruption_sweep::runner::{build_runner, RunnerRegistry};
use corruption_sweep::sweep::CorruptionSweep;

/// Command-line arguments for the sweep binary.
#[derive(Parser, Debug)]
#[command(
    name = "sweep",
    version,
    about = "Corruption-sweep robustness evaluation",
    long_about = None
)]
struct Args {
    /// Path to the JSON evaluation configuration file.
    ///
    /// If not provided, the default `EvalConfig` is used.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the model checkpoint from the config.
    #[arg(long, value_name = "FILE")]
    checkpoint: Option<PathBuf>,

    /// Override the working directory from the config.
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Severity level (0-indexed) applied uniformly across the sweep.
    #[arg(long, default_value_t = ConditionCatalog::DEFAULT_SEVERITY)]
    severity: u8,

    /// Report file stem; the report is written to `<work_dir>/<label>.txt`.
    #[arg(long, default_value = "log")]
    label: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    // Initialise tracing subscriber.
    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    info!("Corruption-sweep robustness evaluation v{}", corruption_sweep::VERSION);

    // Load or construct the base configuration.
    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            match EvalConfig::from_json(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    error!("Failed to load configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            info!("No configuration file provided — using defaults");
            EvalConfig::default()
        }
    };

    // Apply CLI overrides; the CLI takes precedence over the config file.
    if let Some(checkpoint) = args.checkpoint {
        config.checkpoint = checkpoint;
    }
    if let Some(work_dir) = args.work_dir {
        config.work_dir = work_dir;
    }

    info!("  checkpoint: {}", config.checkpoint.display());
    info!("  evaluator : {}", config.evaluator.display());
    info!("  work dir  : {}", config.work_dir.display());
    info!("  split     : {}", config.dataset.split);
    info!("  severity  : {}", args.severity);
    info!("  label     : {}", args.label);

    let runner = match build_runner(&config, &RunnerRegistry::new()) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Failed to build evaluation runner: {e}");
            std::process::exit(1);
        }
    };

    let sink = ReportSink::new(config.work_dir.clone());
    let catalog = ConditionCatalog::new(args.severity);

    let sweep = match CorruptionSweep::new(config, catalog, runner, sink) {
        Ok(sweep) => sweep,
        Err(e) => {
            error!("Configuration validation failed: {e}");
            std::process::exit(1);
        }
    };

    match sweep.run(&args.label, &mut std::io::stdout()) {
        Ok(report) => {
            info!("Sweep complete: {} headline metrics", report.len());
        }
        Err(e) => {
            error!("Sweep aborted: {e}");
            std::process::exit(1);
        }
    }
}
