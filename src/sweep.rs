//! The corruption-sweep orchestrator.
//!
//! Drives the whole pipeline: for every condition in the catalog, derive a
//! per-condition configuration, run the external evaluator, select the
//! headline metrics, and fold them into the running report; then flush the
//! sink exactly once at sweep end.
//!
//! The sweep is strictly single-threaded and sequential, with no overlap
//! between conditions and no cancellation mid-sweep: it runs to completion
//! or aborts entirely on the first failure. No shared mutable state exists
//! across iterations except the report, which only this orchestrator
//! appends to. The sink is never invoked when any condition fails, so no
//! partial report is ever written.

use std::io::Write;

use tracing::{debug, info};

use crate::catalog::ConditionCatalog;
use crate::config::EvalConfig;
use crate::error::SweepResult;
use crate::report::{ReportSink, RobustnessReport};
use crate::runner::EvalRunner;
use crate::select::select_headline;

// ---------------------------------------------------------------------------
// CorruptionSweep
// ---------------------------------------------------------------------------

/// One full ordered pass over all conditions, producing one consolidated
/// report.
///
/// All collaborators are explicit constructor parameters; the sweep carries
/// no ambient process state.
pub struct CorruptionSweep {
    base: EvalConfig,
    catalog: ConditionCatalog,
    runner: Box<dyn EvalRunner>,
    sink: ReportSink,
}

impl CorruptionSweep {
    /// Assemble a sweep from its collaborators.
    ///
    /// The base configuration is validated here, so a malformed
    /// configuration fails before any evaluation runs.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Config`] for a malformed base configuration.
    ///
    /// [`SweepError::Config`]: crate::error::SweepError::Config
    pub fn new(
        base: EvalConfig,
        catalog: ConditionCatalog,
        runner: Box<dyn EvalRunner>,
        sink: ReportSink,
    ) -> SweepResult<Self> {
        base.validate()?;
        Ok(CorruptionSweep { base, catalog, runner, sink })
    }

    /// The catalog this sweep iterates.
    pub fn catalog(&self) -> &ConditionCatalog {
        &self.catalog
    }

    /// Run the full sweep and persist the report under `label`.
    ///
    /// Conditions are processed one at a time in catalog order; each
    /// evaluator call is a full blocking operation. The report is rendered
    /// to `status` and persisted only after every condition has evaluated.
    ///
    /// # Errors
    ///
    /// The first [`SweepError`] aborts the remaining sweep; the sink is not
    /// invoked and no file is written or overwritten.
    ///
    /// [`SweepError`]: crate::error::SweepError
    pub fn run<W: Write>(&self, label: &str, status: &mut W) -> SweepResult<RobustnessReport> {
        info!(
            runner = self.runner.name(),
            severity = self.catalog.severity(),
            conditions = self.catalog.len(),
            "starting corruption sweep"
        );

        let mut report = RobustnessReport::new();
        for condition in self.catalog.conditions() {
            info!(corruption = condition.name, severity = condition.severity, "evaluating condition");

            let derived = self.base.for_condition(&condition)?;
            let raw = self.runner.run(&derived)?;
            debug!(
                corruption = condition.name,
                raw_metrics = raw.len(),
                "evaluation finished"
            );

            let selected = select_headline(&raw, &condition);
            info!(
                corruption = condition.name,
                selected = selected.len(),
                "headline metrics selected"
            );
            report.merge(selected);
        }

        self.sink.flush(&report, label, status)?;
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, EvalError, SweepError};
    use crate::runner::MetricMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingRunner {
        calls: AtomicUsize,
    }

    impl EvalRunner for std::sync::Arc<CountingRunner> {
        fn run(&self, _config: &EvalConfig) -> Result<MetricMap, EvalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MetricMap::new())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting_runner() -> std::sync::Arc<CountingRunner> {
        std::sync::Arc::new(CountingRunner { calls: AtomicUsize::new(0) })
    }

    #[test]
    fn malformed_base_config_fails_before_any_evaluation() {
        let mut base = EvalConfig::default();
        base.dataset.data_prefix = None;

        let tmp = tempdir().unwrap();
        let result = CorruptionSweep::new(
            base,
            ConditionCatalog::default(),
            Box::new(counting_runner()),
            ReportSink::new(tmp.path()),
        );
        assert!(matches!(
            result.err(),
            Some(SweepError::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[test]
    fn sweep_calls_runner_once_per_condition() {
        let tmp = tempdir().unwrap();
        let runner = counting_runner();
        let sweep = CorruptionSweep::new(
            EvalConfig::default(),
            ConditionCatalog::default(),
            Box::new(runner.clone()),
            ReportSink::new(tmp.path()),
        )
        .unwrap();

        let report = sweep.run("log", &mut Vec::new()).unwrap();

        assert_eq!(runner.calls.load(Ordering::SeqCst), 15);
        // No metric matched, so the report is empty but still flushed once.
        assert!(report.is_empty());
        assert_eq!(std::fs::read_to_string(tmp.path().join("log.txt")).unwrap(), "");
    }
}
