//! Headline-metric selection.
//!
//! One evaluation run returns a large raw metric mapping covering every
//! class, overlap threshold and difficulty tier the evaluator computes. The
//! robustness report only tracks a small fixed set of headline scores: the
//! moderate-difficulty AP40 for each object class, in both 3D and 2D, at
//! the class's customary overlap regime (strict for cars, loose for
//! pedestrians and cyclists).
//!
//! Selection is table-driven: every raw key is tested for substring
//! containment against each entry of [`HEADLINE_METRICS`] uniformly. The
//! target substrings are mutually exclusive by construction, so a raw key
//! matches at most one target in practice; a key that matched several would
//! emit one entry per match. Keys matching no target are silently dropped —
//! intentional down-selection, not an error.

use crate::catalog::CorruptionCondition;
use crate::runner::MetricMap;

// ---------------------------------------------------------------------------
// Headline-metric table
// ---------------------------------------------------------------------------

/// One headline metric of interest: a raw-key substring to match and the
/// semantic label it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlineMetric {
    /// Substring a raw metric key must contain to be selected.
    pub pattern: &'static str,
    /// Semantic (class × dimensionality × difficulty) label.
    pub label: &'static str,
}

/// The fixed set of headline metrics, one per (object class ×
/// dimensionality × difficulty tier) combination of interest.
pub const HEADLINE_METRICS: [HeadlineMetric; 6] = [
    HeadlineMetric { pattern: "Car_3D_AP40_moderate_strict", label: "car-3d-strict-moderate" },
    HeadlineMetric {
        pattern: "Pedestrian_3D_AP40_moderate_loose",
        label: "pedestrian-3d-loose-moderate",
    },
    HeadlineMetric {
        pattern: "Cyclist_3D_AP40_moderate_loose",
        label: "cyclist-3d-loose-moderate",
    },
    HeadlineMetric { pattern: "Car_2D_AP40_moderate_strict", label: "car-2d-strict-moderate" },
    HeadlineMetric {
        pattern: "Pedestrian_2D_AP40_moderate_loose",
        label: "pedestrian-2d-loose-moderate",
    },
    HeadlineMetric {
        pattern: "Cyclist_2D_AP40_moderate_loose",
        label: "cyclist-2d-loose-moderate",
    },
];

// ---------------------------------------------------------------------------
// SelectedMetric
// ---------------------------------------------------------------------------

/// One headline score selected out of a raw metric mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedMetric {
    /// Report key of the form `"<condition-name>/<short-metric-name>"`,
    /// where the short name is the last `/`-delimited segment of the raw
    /// key.
    pub report_key: String,
    /// The score.
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Select the headline metrics for one condition out of a raw metric map.
///
/// Output order follows the raw map's iteration order, not the order of
/// [`HEADLINE_METRICS`]. A raw map with no matching key yields an empty
/// vector; that condition simply contributes nothing to the report.
pub fn select_headline(raw: &MetricMap, condition: &CorruptionCondition) -> Vec<SelectedMetric> {
    let mut selected = Vec::new();
    for (key, &value) in raw {
        for target in &HEADLINE_METRICS {
            if key.contains(target.pattern) {
                let short = key.rsplit('/').next().unwrap_or(key);
                selected.push(SelectedMetric {
                    report_key: format!("{}/{short}", condition.name),
                    value,
                });
            }
        }
    }
    selected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fog() -> CorruptionCondition {
        CorruptionCondition { name: "fog", severity: 2 }
    }

    #[test]
    fn selects_one_entry_per_target() {
        let mut raw = MetricMap::new();
        for (i, target) in HEADLINE_METRICS.iter().enumerate() {
            raw.insert(
                format!("Kitti metric/pred_instances_3d/KITTI/{}", target.pattern),
                i as f64,
            );
        }

        let selected = select_headline(&raw, &fog());
        assert_eq!(selected.len(), HEADLINE_METRICS.len());
        for entry in &selected {
            assert!(entry.report_key.starts_with("fog/"), "bad key {}", entry.report_key);
        }
    }

    #[test]
    fn short_name_is_last_path_segment() {
        let mut raw = MetricMap::new();
        raw.insert(
            "Kitti metric/pred_instances_3d/KITTI/Car_3D_AP40_moderate_strict".to_string(),
            71.2,
        );

        let selected = select_headline(&raw, &fog());
        assert_eq!(
            selected,
            vec![SelectedMetric {
                report_key: "fog/Car_3D_AP40_moderate_strict".to_string(),
                value: 71.2
            }]
        );
    }

    #[test]
    fn non_matching_keys_are_dropped() {
        let mut raw = MetricMap::new();
        raw.insert("Kitti metric/Car_3D_AP40_easy_strict".to_string(), 80.0);
        raw.insert("Kitti metric/Car_BEV_AP40_moderate_strict".to_string(), 75.0);
        raw.insert("loss/total".to_string(), 0.3);

        assert!(select_headline(&raw, &fog()).is_empty());
    }

    #[test]
    fn empty_raw_map_selects_nothing() {
        assert!(select_headline(&MetricMap::new(), &fog()).is_empty());
    }

    #[test]
    fn output_follows_raw_map_iteration_order() {
        // BTreeMap iterates sorted; 2D sorts before 3D regardless of target
        // table order.
        let mut raw = MetricMap::new();
        raw.insert("k/Pedestrian_3D_AP40_moderate_loose".to_string(), 1.0);
        raw.insert("k/Car_2D_AP40_moderate_strict".to_string(), 2.0);

        let keys: Vec<_> =
            select_headline(&raw, &fog()).into_iter().map(|e| e.report_key).collect();
        assert_eq!(
            keys,
            vec![
                "fog/Car_2D_AP40_moderate_strict".to_string(),
                "fog/Pedestrian_3D_AP40_moderate_loose".to_string(),
            ]
        );
    }

    #[test]
    fn keys_without_separator_use_whole_key_as_short_name() {
        let mut raw = MetricMap::new();
        raw.insert("Cyclist_3D_AP40_moderate_loose".to_string(), 42.0);

        let selected = select_headline(&raw, &fog());
        assert_eq!(selected[0].report_key, "fog/Cyclist_3D_AP40_moderate_loose");
    }

    #[test]
    fn target_patterns_are_mutually_exclusive() {
        for (i, a) in HEADLINE_METRICS.iter().enumerate() {
            for (j, b) in HEADLINE_METRICS.iter().enumerate() {
                if i != j {
                    assert!(!a.pattern.contains(b.pattern), "{} contains {}", a.label, b.label);
                }
            }
        }
    }
}
