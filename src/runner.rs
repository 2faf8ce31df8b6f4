//! The evaluation gateway: delegation to an external evaluation runner.
//!
//! This module is the sole point of contact with the model / dataset /
//! metrics subsystem. A runner consumes one derived [`EvalConfig`] and
//! returns a flat metric-key → score mapping; everything the runner does
//! internally (checkpoint loading, inference, metric computation) is opaque
//! to the sweep.
//!
//! Two construction modes exist, selected once at sweep start by
//! [`build_runner`]:
//!
//! - the default path builds a [`CommandRunner`] from the configuration
//!   alone;
//! - when the configuration declares a `runner_type`, the runner is looked
//!   up in a [`RunnerRegistry`] of named factories instead.
//!
//! Runner failure is fatal for the whole sweep: there is no per-condition
//! retry or skip-on-failure policy.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::debug;

use crate::config::EvalConfig;
use crate::error::EvalError;

// ---------------------------------------------------------------------------
// MetricMap
// ---------------------------------------------------------------------------

/// Flat mapping from fully qualified metric key to score, e.g.
/// `"Kitti metric/pred_instances_3d/KITTI/Car_3D_AP40_moderate_strict" → 71.2`.
///
/// Produced once per condition and read-only thereafter. A `BTreeMap` keeps
/// iteration deterministic, which in turn keeps report ordering
/// reproducible.
pub type MetricMap = BTreeMap<String, f64>;

// ---------------------------------------------------------------------------
// EvalRunner
// ---------------------------------------------------------------------------

/// An external evaluation runner.
///
/// Implementations receive a fully derived configuration, perform one
/// blocking evaluation run, and return the raw metric mapping. The call may
/// internally parallelise inference; the sweep treats it as a single
/// blocking operation.
pub trait EvalRunner: Send + Sync {
    /// Run one evaluation under the given derived configuration.
    ///
    /// # Errors
    ///
    /// Any [`EvalError`] aborts the remaining sweep.
    fn run(&self, config: &EvalConfig) -> Result<MetricMap, EvalError>;

    /// Human-readable runner name for logging.
    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn EvalRunner + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalRunner").field("name", &self.name()).finish()
    }
}

// ---------------------------------------------------------------------------
// CommandRunner — the default path
// ---------------------------------------------------------------------------

/// Default runner: delegates to the external evaluator executable named by
/// the configuration.
///
/// The derived configuration is staged as a JSON file under the working
/// directory, the evaluator is invoked with that file as its only argument,
/// and its standard output is parsed as a flat string → number JSON object.
pub struct CommandRunner {
    program: std::path::PathBuf,
}

impl CommandRunner {
    /// Name of the staged per-condition config file under `work_dir`.
    const STAGED_CONFIG: &'static str = "derived_eval.json";

    /// Build the default runner from the configuration alone.
    pub fn from_config(config: &EvalConfig) -> Self {
        CommandRunner { program: config.evaluator.clone() }
    }
}

impl EvalRunner for CommandRunner {
    fn run(&self, config: &EvalConfig) -> Result<MetricMap, EvalError> {
        // Stage the derived config where the evaluator can read it. The
        // sweep is single-threaded, so one scratch file is sufficient.
        let staged = config.work_dir.join(Self::STAGED_CONFIG);
        if let Some(parent) = staged.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| EvalError::StagingFailed { path: parent.to_path_buf(), source })?;
        }
        let json = serde_json::to_string_pretty(config).map_err(|e| EvalError::StagingFailed {
            path: staged.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        std::fs::write(&staged, json)
            .map_err(|source| EvalError::StagingFailed { path: staged.clone(), source })?;

        debug!(program = %self.program.display(), config = %staged.display(), "invoking evaluator");

        let output = Command::new(&self.program)
            .arg(&staged)
            .output()
            .map_err(|source| EvalError::spawn(&self.program, source))?;

        if !output.status.success() {
            return Err(EvalError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        serde_json::from_slice::<MetricMap>(&output.stdout)
            .map_err(|source| EvalError::MalformedOutput { source })
    }

    fn name(&self) -> &str {
        "command"
    }
}

// ---------------------------------------------------------------------------
// RunnerRegistry — the registry path
// ---------------------------------------------------------------------------

/// Factory producing a runner from a configuration.
pub type RunnerFactory = fn(&EvalConfig) -> Box<dyn EvalRunner>;

/// Registry of named runner factories for configurations that declare a
/// `runner_type`.
#[derive(Default)]
pub struct RunnerRegistry {
    factories: BTreeMap<String, RunnerFactory>,
}

impl RunnerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        RunnerRegistry { factories: BTreeMap::new() }
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: RunnerFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Names currently registered, in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Build the runner registered under `runner_type`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownRunnerType`] when no factory is
    /// registered under that name.
    pub fn build(
        &self,
        runner_type: &str,
        config: &EvalConfig,
    ) -> Result<Box<dyn EvalRunner>, EvalError> {
        match self.factories.get(runner_type) {
            Some(factory) => Ok(factory(config)),
            None => Err(EvalError::UnknownRunnerType {
                runner_type: runner_type.to_string(),
                registered: self.names(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Runner selection
// ---------------------------------------------------------------------------

/// Select and build the runner for a sweep, once, at sweep start.
///
/// A configuration without a `runner_type` gets the default
/// [`CommandRunner`]; one with a `runner_type` gets the registered factory
/// of that name.
///
/// # Errors
///
/// Returns [`EvalError::UnknownRunnerType`] when the declared type is not
/// registered.
pub fn build_runner(
    config: &EvalConfig,
    registry: &RunnerRegistry,
) -> Result<Box<dyn EvalRunner>, EvalError> {
    match config.runner_type.as_deref() {
        None => Ok(Box::new(CommandRunner::from_config(config))),
        Some(runner_type) => registry.build(runner_type, config),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
