//! The corruption-condition catalog.
//!
//! A sweep evaluates the model once per corruption type, all at the same
//! severity level. The vocabulary of corruption types is closed: fifteen
//! identifiers spanning the noise, blur, weather and digital/compression
//! families of the common-corruptions benchmark, in a fixed order that also
//! fixes the order of the final report.
//!
//! The catalog is pure static data and has no failure modes.

// ---------------------------------------------------------------------------
// Corruption vocabulary
// ---------------------------------------------------------------------------

/// The closed, ordered vocabulary of corruption types.
///
/// Report ordering is derived from this ordering, so it must remain stable.
pub const CORRUPTION_NAMES: [&str; 15] = [
    "gaussian_noise",
    "shot_noise",
    "impulse_noise",
    "defocus_blur",
    "glass_blur",
    "motion_blur",
    "zoom_blur",
    "snow",
    "frost",
    "fog",
    "brightness",
    "contrast",
    "elastic_transform",
    "pixelate",
    "jpeg_compression",
];

/// Corruption types that come with a paired point-cloud variant.
///
/// Weather and motion-blur corruptions affect the LiDAR return as well as
/// the camera image, so the corrupted dataset ships a `moderate` point-cloud
/// rendition for exactly these three types. This list is a documented
/// special case, not a general rule.
pub const POINT_CLOUD_CORRUPTIONS: [&str; 3] = ["fog", "snow", "motion_blur"];

// ---------------------------------------------------------------------------
// CorruptionCondition
// ---------------------------------------------------------------------------

/// A single (corruption-type, severity) pair under evaluation.
///
/// Conditions are created by [`ConditionCatalog::conditions`] and never
/// mutated afterwards. `severity` is 0-indexed internally; the corrupted
/// dataset directories on disk are 1-indexed (see
/// [`EvalConfig::for_condition`]).
///
/// [`EvalConfig::for_condition`]: crate::config::EvalConfig::for_condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorruptionCondition {
    /// Corruption-type identifier from [`CORRUPTION_NAMES`].
    pub name: &'static str,
    /// 0-indexed severity level, uniform across the sweep.
    pub severity: u8,
}

impl CorruptionCondition {
    /// Returns `true` when this corruption type has a paired point-cloud
    /// variant (see [`POINT_CLOUD_CORRUPTIONS`]).
    pub fn has_point_cloud_variant(&self) -> bool {
        POINT_CLOUD_CORRUPTIONS.contains(&self.name)
    }
}

// ---------------------------------------------------------------------------
// ConditionCatalog
// ---------------------------------------------------------------------------

/// The full battery of conditions for one sweep.
///
/// Yields one [`CorruptionCondition`] per entry in [`CORRUPTION_NAMES`], all
/// sharing the catalog's severity. The sequence is lazy, finite and
/// restartable: each call to [`conditions`](ConditionCatalog::conditions)
/// starts a fresh pass in vocabulary order.
#[derive(Debug, Clone, Copy)]
pub struct ConditionCatalog {
    severity: u8,
}

impl ConditionCatalog {
    /// Default severity level evaluated by the benchmark.
    pub const DEFAULT_SEVERITY: u8 = 2;

    /// Create a catalog sweeping every corruption type at `severity`.
    pub fn new(severity: u8) -> Self {
        ConditionCatalog { severity }
    }

    /// The severity applied uniformly across the sweep.
    pub fn severity(&self) -> u8 {
        self.severity
    }

    /// Number of conditions in one pass.
    pub fn len(&self) -> usize {
        CORRUPTION_NAMES.len()
    }

    /// Always `false`; the vocabulary is non-empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the catalog in vocabulary order.
    pub fn conditions(&self) -> impl Iterator<Item = CorruptionCondition> {
        let severity = self.severity;
        CORRUPTION_NAMES
            .iter()
            .map(move |&name| CorruptionCondition { name, severity })
    }
}

impl Default for ConditionCatalog {
    fn default() -> Self {
        ConditionCatalog::new(Self::DEFAULT_SEVERITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_yields_one_condition_per_corruption() {
        let catalog = ConditionCatalog::new(2);
        let conditions: Vec<_> = catalog.conditions().collect();
        assert_eq!(conditions.len(), 15);
        assert_eq!(conditions.len(), catalog.len());
    }

    #[test]
    fn catalog_preserves_vocabulary_order() {
        let catalog = ConditionCatalog::new(2);
        let names: Vec<_> = catalog.conditions().map(|c| c.name).collect();
        assert_eq!(names, CORRUPTION_NAMES.to_vec());
    }

    #[test]
    fn catalog_applies_uniform_severity() {
        let catalog = ConditionCatalog::new(4);
        assert!(catalog.conditions().all(|c| c.severity == 4));
    }

    #[test]
    fn catalog_is_restartable() {
        let catalog = ConditionCatalog::new(2);
        let first: Vec<_> = catalog.conditions().collect();
        let second: Vec<_> = catalog.conditions().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn point_cloud_variant_only_for_weather_and_motion_blur() {
        let catalog = ConditionCatalog::new(2);
        let with_pts: Vec<_> = catalog
            .conditions()
            .filter(|c| c.has_point_cloud_variant())
            .map(|c| c.name)
            .collect();
        assert_eq!(with_pts, vec!["motion_blur", "snow", "fog"]);
    }

    #[test]
    fn default_catalog_uses_benchmark_severity() {
        assert_eq!(ConditionCatalog::default().severity(), 2);
    }
}
