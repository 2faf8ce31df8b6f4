//! Error types for the corruption-sweep harness.
//!
//! This module is the single source of truth for all error types in the
//! crate. Every module that produces an error imports its error type from
//! here rather than defining it inline, keeping the error hierarchy
//! centralised and consistent.
//!
//! ## Hierarchy
//!
//! ```text
//! SweepError (top-level)
//! ├── ConfigError   (config loading / validation / per-condition derivation)
//! ├── EvalError     (external evaluation runner failures)
//! └── SinkError     (report rendering / persistence)
//! ```
//!
//! Every failure in the sweep is fatal: there is no retry or skip-on-failure
//! policy anywhere in this crate. Reruns of an offline batch sweep are cheap,
//! and a silent partial result would be misleading as a robustness benchmark.

use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SweepResult
// ---------------------------------------------------------------------------

/// Convenient `Result` alias used by orchestration-level functions.
pub type SweepResult<T> = Result<T, SweepError>;

// ---------------------------------------------------------------------------
// SweepError — top-level aggregator
// ---------------------------------------------------------------------------

/// Top-level error type for the corruption sweep.
///
/// Orchestration-level functions (e.g. [`crate::sweep::CorruptionSweep`]
/// methods) return `SweepResult<T>`. Lower-level functions in
/// [`crate::config`], [`crate::runner`] and [`crate::report`] return their
/// own module-specific error types which are automatically coerced into
/// `SweepError` via [`From`].
#[derive(Debug, Error)]
pub enum SweepError {
    /// A configuration loading, validation or derivation error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The external evaluation runner failed.
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// The report could not be rendered or persisted.
    #[error("Report sink error: {0}")]
    Sink(#[from] SinkError),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors produced when loading, validating or deriving an [`EvalConfig`].
///
/// [`EvalConfig`]: crate::config::EvalConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// A required field is absent from the configuration document.
    #[error("Missing required field `{field}`")]
    MissingField {
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// A configuration file could not be read or written.
    #[error("Cannot access config file `{path}`: {source}")]
    FileAccess {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file contains malformed JSON.
    #[error("Cannot parse config file `{path}`: {source}")]
    ParseError {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Construct a [`ConfigError::InvalidValue`].
    pub fn invalid_value<S: Into<String>>(field: &'static str, reason: S) -> Self {
        ConfigError::InvalidValue { field, reason: reason.into() }
    }

    /// Construct a [`ConfigError::MissingField`].
    pub fn missing_field(field: &'static str) -> Self {
        ConfigError::MissingField { field }
    }
}

// ---------------------------------------------------------------------------
// EvalError
// ---------------------------------------------------------------------------

/// Errors produced by an evaluation runner.
///
/// Any of these aborts the remaining sweep: a condition that cannot be
/// evaluated (bad checkpoint, missing corrupted-data directory) makes the
/// whole report untrustworthy, so no partial report is written.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The evaluator process could not be spawned.
    #[error("Cannot spawn evaluator `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The evaluator exited with a non-zero status.
    #[error("Evaluator `{program}` failed with {status}: {stderr}")]
    Failed {
        /// Program that failed.
        program: PathBuf,
        /// Exit status description.
        status: String,
        /// Captured standard error (may be empty).
        stderr: String,
    },

    /// The evaluator's output was not a flat string-to-number JSON object.
    #[error("Cannot parse evaluator output: {source}")]
    MalformedOutput {
        /// Underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },

    /// `runner_type` named a runner that is not registered.
    #[error("Unknown runner type `{runner_type}` (registered: {registered:?})")]
    UnknownRunnerType {
        /// The unrecognised discriminator value.
        runner_type: String,
        /// Names that are registered.
        registered: Vec<String>,
    },

    /// A scratch file for the derived config could not be written.
    #[error("Cannot stage derived config at `{path}`: {source}")]
    StagingFailed {
        /// Path of the scratch file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl EvalError {
    /// Construct an [`EvalError::Spawn`].
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvalError::Spawn { program: program.into(), source }
    }

    /// Construct an [`EvalError::Failed`].
    pub fn failed<S: Into<String>>(program: impl Into<PathBuf>, status: S, stderr: S) -> Self {
        EvalError::Failed {
            program: program.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SinkError
// ---------------------------------------------------------------------------

/// Errors produced while rendering or persisting the final report.
///
/// Sink failure surfaces after the full sweep has computed in memory; there
/// is no fallback destination, so the in-memory report is lost with it.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The report file or its parent directory could not be written.
    #[error("Cannot write report to `{path}`: {source}")]
    WriteFailed {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The live status stream rejected a write.
    #[error("Cannot write to status stream: {0}")]
    StatusStream(#[from] std::io::Error),
}

impl SinkError {
    /// Construct a [`SinkError::WriteFailed`].
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SinkError::WriteFailed { path: path.into(), source }
    }
}
