//! Report accumulation and persistence.
//!
//! [`RobustnessReport`] accumulates the selected headline metrics across the
//! whole sweep in insertion order, so that the persisted file is stable and
//! diff-friendly across reruns: conditions appear in catalog order, metrics
//! within a condition in raw-map iteration order.
//!
//! [`ReportSink`] renders the finished report once, at sweep end — each
//! entry as a `"<key>: <value>"` line, streamed to a live status writer for
//! interactive visibility and written verbatim to
//! `<work_dir>/<label>.txt`, overwriting any previous run's file.

use std::io::Write;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::info;

use crate::error::SinkError;
use crate::select::SelectedMetric;

// ---------------------------------------------------------------------------
// RobustnessReport
// ---------------------------------------------------------------------------

/// The consolidated, insertion-ordered robustness report.
///
/// Created empty at sweep start and grown monotonically across iterations.
/// Report keys embed the condition name, so distinct conditions never
/// collide; if the same key is nonetheless produced twice, the later value
/// overwrites the earlier one (last-write-wins) without changing the key's
/// position. That overwrite is intentional and raised to no warning —
/// downstream consumers rely on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobustnessReport {
    entries: IndexMap<String, f64>,
}

impl RobustnessReport {
    /// Create an empty report.
    pub fn new() -> Self {
        RobustnessReport { entries: IndexMap::new() }
    }

    /// Insert or overwrite `metrics` into the report, in the order given.
    pub fn merge(&mut self, metrics: impl IntoIterator<Item = SelectedMetric>) {
        for metric in metrics {
            self.entries.insert(metric.report_key, metric.value);
        }
    }

    /// Number of distinct report keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no metric was selected for any condition.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a score by report key.
    pub fn get(&self, report_key: &str) -> Option<f64> {
        self.entries.get(report_key).copied()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Render entries as `"<key>: <value>"` lines, in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.iter().map(|(key, value)| format!("{key}: {value}"))
    }
}

// ---------------------------------------------------------------------------
// ReportSink
// ---------------------------------------------------------------------------

/// Renders the finished report to a status stream and persists it under a
/// working directory.
#[derive(Debug, Clone)]
pub struct ReportSink {
    work_dir: PathBuf,
}

impl ReportSink {
    /// Create a sink rooted at `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        ReportSink { work_dir: work_dir.into() }
    }

    /// The destination file for a given report label.
    pub fn destination(&self, label: &str) -> PathBuf {
        self.work_dir.join(format!("{label}.txt"))
    }

    /// Render `report` line by line to `status` and persist the same
    /// content to [`destination`](ReportSink::destination), overwriting any
    /// existing file. Returns the path written.
    ///
    /// The status stream is a side channel for interactive visibility
    /// during a long sweep; the file is the authoritative output.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when either the status stream or the report
    /// file cannot be written. There is no fallback destination.
    pub fn flush<W: Write>(
        &self,
        report: &RobustnessReport,
        label: &str,
        status: &mut W,
    ) -> Result<PathBuf, SinkError> {
        let mut contents = String::new();
        for line in report.lines() {
            writeln!(status, "{line}")?;
            contents.push_str(&line);
            contents.push('\n');
        }

        std::fs::create_dir_all(&self.work_dir)
            .map_err(|source| SinkError::write_failed(&self.work_dir, source))?;

        let destination = self.destination(label);
        std::fs::write(&destination, contents)
            .map_err(|source| SinkError::write_failed(&destination, source))?;

        info!(
            entries = report.len(),
            path = %destination.display(),
            "robustness report persisted"
        );
        Ok(destination)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(key: &str, value: f64) -> SelectedMetric {
        SelectedMetric { report_key: key.to_string(), value }
    }

    #[test]
    fn merge_preserves_insertion_order() {
        let mut report = RobustnessReport::new();
        report.merge(vec![entry("fog/Car", 71.2), entry("fog/Pedestrian", 55.0)]);
        report.merge(vec![entry("snow/Car", 60.1)]);

        let keys: Vec<_> = report.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["fog/Car", "fog/Pedestrian", "snow/Car"]);
    }

    #[test]
    fn duplicate_key_is_last_write_wins_without_growth() {
        let mut report = RobustnessReport::new();
        report.merge(vec![entry("fog/Car", 71.2)]);
        report.merge(vec![entry("fog/Car", 12.5)]);

        assert_eq!(report.len(), 1);
        assert_eq!(report.get("fog/Car"), Some(12.5));
    }

    #[test]
    fn lines_render_key_colon_value() {
        let mut report = RobustnessReport::new();
        report.merge(vec![entry("fog/Car", 71.2)]);
        assert_eq!(report.lines().collect::<Vec<_>>(), vec!["fog/Car: 71.2".to_string()]);
    }

    #[test]
    fn flush_writes_file_and_status_stream() {
        let tmp = tempdir().unwrap();
        let sink = ReportSink::new(tmp.path().join("work"));

        let mut report = RobustnessReport::new();
        report.merge(vec![entry("fog/Car", 71.2), entry("snow/Car", 60.1)]);

        let mut status = Vec::new();
        let path = sink.flush(&report, "log", &mut status).unwrap();

        let expected = "fog/Car: 71.2\nsnow/Car: 60.1\n";
        assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
        assert_eq!(String::from_utf8(status).unwrap(), expected);
        assert_eq!(path, tmp.path().join("work").join("log.txt"));
    }

    #[test]
    fn flush_overwrites_previous_report() {
        let tmp = tempdir().unwrap();
        let sink = ReportSink::new(tmp.path());

        let mut first = RobustnessReport::new();
        first.merge(vec![entry("fog/Car", 71.2)]);
        sink.flush(&first, "log", &mut Vec::new()).unwrap();

        let mut second = RobustnessReport::new();
        second.merge(vec![entry("snow/Car", 60.1)]);
        let path = sink.flush(&second, "log", &mut Vec::new()).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "snow/Car: 60.1\n");
    }

    #[test]
    fn flush_of_empty_report_writes_empty_file() {
        let tmp = tempdir().unwrap();
        let sink = ReportSink::new(tmp.path());

        let path = sink.flush(&RobustnessReport::new(), "empty", &mut Vec::new()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "");
    }

    #[test]
    fn unwritable_destination_is_fatal() {
        let tmp = tempdir().unwrap();
        // A regular file where the work dir should be makes the write fail.
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, b"").unwrap();
        let sink = ReportSink::new(&blocker);

        let mut report = RobustnessReport::new();
        report.merge(vec![entry("fog/Car", 71.2)]);

        let err = sink.flush(&report, "log", &mut Vec::new()).unwrap_err();
        assert!(matches!(err, SinkError::WriteFailed { .. }));
    }
}
