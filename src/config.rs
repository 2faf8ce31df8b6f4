//! Evaluation configuration and per-condition derivation.
//!
//! [`EvalConfig`] is the single source of truth for one evaluation run: the
//! checkpoint under test, the external evaluator to delegate to, the report
//! working directory, and the dataset section whose path prefixes the sweep
//! rewrites per condition. It is serializable via [`serde`] so it can be
//! loaded from / staged to JSON files.
//!
//! Per-condition derivation never mutates the base configuration: every
//! condition receives an independently derived clone, so edits cannot leak
//! from one sweep iteration into the next.
//!
//! # Example
//!
//! ```rust
//! use corruption_sweep::catalog::CorruptionCondition;
//! use corruption_sweep::config::EvalConfig;
//!
//! let base = EvalConfig::default();
//! let fog = CorruptionCondition { name: "fog", severity: 2 };
//!
//! let derived = base.for_condition(&fog).expect("default config derives");
//! let prefix = derived.dataset.data_prefix.as_ref().unwrap();
//! assert_eq!(prefix.img, "val_c/fog/3");
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::CorruptionCondition;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// DataPrefix
// ---------------------------------------------------------------------------

/// Dataset path prefixes, relative to the dataset root.
///
/// `img` is mandatory for any sweepable configuration; `pts` is optional
/// because image-only models carry no point-cloud branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPrefix {
    /// Image-data prefix, e.g. `training/image_2`.
    pub img: String,

    /// Point-cloud-data prefix, e.g. `training/velodyne`. Absent for
    /// camera-only models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pts: Option<String>,
}

// ---------------------------------------------------------------------------
// DatasetSection
// ---------------------------------------------------------------------------

/// The dataset portion of an [`EvalConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSection {
    /// Dataset root directory.
    pub data_root: PathBuf,

    /// Split under evaluation; the corrupted variant lives under
    /// `<split>_c/`. Default: **`val`**.
    pub split: String,

    /// Sensor directory name used by the point-cloud variant path.
    /// Default: **`velodyne`**.
    pub sensor_dir: String,

    /// Mutable path prefixes the sweep rewrites per condition. A
    /// configuration without this section cannot be swept.
    #[serde(default)]
    pub data_prefix: Option<DataPrefix>,
}

impl Default for DatasetSection {
    fn default() -> Self {
        DatasetSection {
            data_root: PathBuf::from("data/kitti"),
            split: "val".to_string(),
            sensor_dir: "velodyne".to_string(),
            data_prefix: Some(DataPrefix {
                img: "training/image_2".to_string(),
                pts: Some("training/velodyne".to_string()),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// EvalConfig
// ---------------------------------------------------------------------------

/// Complete configuration for one external evaluation run.
///
/// Use [`EvalConfig::default()`] as a starting point, override fields as
/// needed, then call [`EvalConfig::validate`] before sweeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Model checkpoint under evaluation.
    pub checkpoint: PathBuf,

    /// External evaluator executable the gateway delegates to.
    pub evaluator: PathBuf,

    /// Working directory where the report file and staged per-condition
    /// configs are written.
    pub work_dir: PathBuf,

    /// Optional runner-type discriminator. When present, the runner is
    /// looked up in the [`RunnerRegistry`] instead of built from the
    /// configuration alone.
    ///
    /// [`RunnerRegistry`]: crate::runner::RunnerRegistry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_type: Option<String>,

    /// Dataset section rewritten per condition.
    pub dataset: DatasetSection,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            checkpoint: PathBuf::from("checkpoints/latest.pth"),
            evaluator: PathBuf::from("evaluate"),
            work_dir: PathBuf::from("work_dirs"),
            runner_type: None,
            dataset: DatasetSection::default(),
        }
    }
}

impl EvalConfig {
    /// Load an [`EvalConfig`] from a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileAccess`] if the file cannot be read and
    /// [`ConfigError::ParseError`] if the JSON is malformed.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: EvalConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(cfg)
    }

    /// Serialize this configuration to pretty-printed JSON and write it to
    /// `path`, creating parent directories if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileAccess`] if the directory cannot be
    /// created or the file cannot be written.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::FileAccess {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("(serialization)", e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Validate all fields and return an error describing the first problem
    /// found, or `Ok(())` if the configuration is coherent.
    ///
    /// # Validated invariants
    ///
    /// - `checkpoint`, `evaluator` and `work_dir` must be non-empty paths.
    /// - `dataset.split` and `dataset.sensor_dir` must be non-empty.
    /// - `dataset.data_prefix` must be present (a sweep rewrites it).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("checkpoint", "must be non-empty"));
        }
        if self.evaluator.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("evaluator", "must be non-empty"));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("work_dir", "must be non-empty"));
        }
        if self.dataset.split.is_empty() {
            return Err(ConfigError::invalid_value("dataset.split", "must be non-empty"));
        }
        if self.dataset.sensor_dir.is_empty() {
            return Err(ConfigError::invalid_value(
                "dataset.sensor_dir",
                "must be non-empty",
            ));
        }
        if self.dataset.data_prefix.is_none() {
            return Err(ConfigError::missing_field("dataset.data_prefix"));
        }
        Ok(())
    }

    /// Derive the configuration for one corruption condition.
    ///
    /// Returns an independently derived clone of `self`; the base
    /// configuration is never touched. The image prefix is pointed at the
    /// corrupted variant `"<split>_c/<name>/<severity + 1>"` (severities are
    /// 0-indexed internally, 1-indexed on disk). For the weather and
    /// motion-blur conditions, and only when the base carries a point-cloud
    /// prefix, the point-cloud prefix is additionally pointed at
    /// `"<split>_c/<name>/moderate/<sensor_dir>"`. A base without a
    /// point-cloud prefix keeps only the image override; that is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `dataset.data_prefix` is
    /// absent entirely — a structurally malformed base configuration, fatal
    /// for the whole sweep.
    pub fn for_condition(&self, condition: &CorruptionCondition) -> Result<EvalConfig, ConfigError> {
        let mut derived = self.clone();
        let prefix = derived
            .dataset
            .data_prefix
            .as_mut()
            .ok_or_else(|| ConfigError::missing_field("dataset.data_prefix"))?;

        let split = &self.dataset.split;
        prefix.img = format!("{split}_c/{}/{}", condition.name, condition.severity + 1);

        if condition.has_point_cloud_variant() && prefix.pts.is_some() {
            prefix.pts = Some(format!(
                "{split}_c/{}/moderate/{}",
                condition.name, self.dataset.sensor_dir
            ));
        }

        Ok(derived)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn condition(name: &'static str, severity: u8) -> CorruptionCondition {
        CorruptionCondition { name, severity }
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = EvalConfig::default();
        cfg.validate().expect("default config should be valid");
    }

    #[test]
    fn json_round_trip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("eval.json");

        let original = EvalConfig::default();
        original.to_json(&path).expect("serialization should succeed");

        let loaded = EvalConfig::from_json(&path).expect("deserialization should succeed");
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_data_prefix_fails_validation() {
        let mut cfg = EvalConfig::default();
        cfg.dataset.data_prefix = None;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingField { field: "dataset.data_prefix" })
        ));
    }

    #[test]
    fn empty_checkpoint_is_invalid() {
        let mut cfg = EvalConfig::default();
        cfg.checkpoint = PathBuf::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn derivation_rewrites_image_prefix_one_indexed() {
        let base = EvalConfig::default();
        let derived = base.for_condition(&condition("pixelate", 2)).unwrap();
        assert_eq!(derived.dataset.data_prefix.unwrap().img, "val_c/pixelate/3");
    }

    #[test]
    fn derivation_does_not_mutate_base() {
        let base = EvalConfig::default();
        let snapshot = base.clone();
        base.for_condition(&condition("fog", 2)).unwrap();
        assert_eq!(base, snapshot);
    }

    #[test]
    fn weather_condition_rewrites_point_cloud_prefix() {
        let base = EvalConfig::default();
        let derived = base.for_condition(&condition("fog", 2)).unwrap();
        let prefix = derived.dataset.data_prefix.unwrap();
        assert_eq!(prefix.img, "val_c/fog/3");
        assert_eq!(prefix.pts.as_deref(), Some("val_c/fog/moderate/velodyne"));
    }

    #[test]
    fn non_weather_condition_keeps_point_cloud_prefix() {
        let base = EvalConfig::default();
        let derived = base.for_condition(&condition("gaussian_noise", 2)).unwrap();
        let prefix = derived.dataset.data_prefix.unwrap();
        assert_eq!(prefix.img, "val_c/gaussian_noise/3");
        assert_eq!(prefix.pts.as_deref(), Some("training/velodyne"));
    }

    #[test]
    fn weather_condition_without_point_cloud_prefix_is_image_only() {
        let mut base = EvalConfig::default();
        base.dataset.data_prefix = Some(DataPrefix {
            img: "training/image_2".to_string(),
            pts: None,
        });
        let derived = base.for_condition(&condition("snow", 2)).unwrap();
        let prefix = derived.dataset.data_prefix.unwrap();
        assert_eq!(prefix.img, "val_c/snow/3");
        assert_eq!(prefix.pts, None);
    }

    #[test]
    fn derivation_fails_without_data_prefix() {
        let mut base = EvalConfig::default();
        base.dataset.data_prefix = None;
        assert!(matches!(
            base.for_condition(&condition("fog", 2)),
            Err(ConfigError::MissingField { field: "dataset.data_prefix" })
        ));
    }

    #[test]
    fn derivation_honours_custom_split_and_sensor_dir() {
        let mut base = EvalConfig::default();
        base.dataset.split = "test".to_string();
        base.dataset.sensor_dir = "lidar".to_string();
        let derived = base.for_condition(&condition("motion_blur", 0)).unwrap();
        let prefix = derived.dataset.data_prefix.unwrap();
        assert_eq!(prefix.img, "test_c/motion_blur/1");
        assert_eq!(prefix.pts.as_deref(), Some("test_c/motion_blur/moderate/lidar"));
    }

    #[test]
    fn config_without_prefix_field_parses_to_none() {
        let json = r#"{
            "checkpoint": "ckpt.pth",
            "evaluator": "evaluate",
            "work_dir": "work_dirs",
            "dataset": {
                "data_root": "data/kitti",
                "split": "val",
                "sensor_dir": "velodyne"
            }
        }"#;
        let cfg: EvalConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.dataset.data_prefix, None);
        assert!(cfg.validate().is_err());
    }
}
