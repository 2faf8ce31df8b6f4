//! # Corruption-Sweep Robustness Evaluation
//!
//! This crate re-evaluates a trained perception model under a battery of
//! synthetic input corruptions (noise, blur, weather, compression) and
//! consolidates the per-condition headline metrics into one ordered
//! robustness report.
//!
//! ## Architecture
//!
//! ```text
//! ConditionCatalog ──► CorruptionSweep ──► EvalRunner (external)
//!        │                   │
//!        │             EvalConfig::for_condition
//!        │                   │
//!        │             select_headline
//!        │                   │
//!        └────────► RobustnessReport ──► ReportSink
//! ```
//!
//! The model evaluation itself is an external collaborator reached through
//! the [`runner::EvalRunner`] trait; this crate only decides which
//! conditions to run, how to derive the per-condition configuration, which
//! raw metric keys matter, and how to combine them into a report.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use corruption_sweep::catalog::ConditionCatalog;
//! use corruption_sweep::config::EvalConfig;
//! use corruption_sweep::report::ReportSink;
//! use corruption_sweep::runner::{build_runner, RunnerRegistry};
//! use corruption_sweep::sweep::CorruptionSweep;
//!
//! let config = EvalConfig::default();
//! let runner = build_runner(&config, &RunnerRegistry::new()).unwrap();
//! let sink = ReportSink::new(config.work_dir.clone());
//!
//! let sweep = CorruptionSweep::new(config, ConditionCatalog::default(), runner, sink).unwrap();
//! let report = sweep.run("log", &mut std::io::stdout()).unwrap();
//! println!("{} headline metrics", report.len());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod select;
pub mod sweep;

// Convenient re-exports at the crate root.
pub use catalog::{ConditionCatalog, CorruptionCondition, CORRUPTION_NAMES};
pub use config::EvalConfig;
pub use error::{ConfigError, EvalError, SinkError, SweepError, SweepResult};
pub use report::{ReportSink, RobustnessReport};
pub use runner::{build_runner, CommandRunner, EvalRunner, MetricMap, RunnerRegistry};
pub use select::{select_headline, SelectedMetric, HEADLINE_METRICS};
pub use sweep::CorruptionSweep;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
