use crate::units::UnitSystem;

/// These are the parameters that control parsing and the enrichment of
/// a point series. Loading them from disk is the job of the caller; the
/// command line front end fills them in from its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Pace is measured over this many points rather than between
    /// consecutive points, to damp GPS jitter. Must be at least 1.
    pub pace_interval: usize,

    /// Pace values whose z-score is at least this far from zero are
    /// treated as outliers and smoothed.
    pub outlier_z_threshold: f64,

    /// Preferred units for reporting splits.
    pub unit_system: UnitSystem,

    /// Maximum number of device samples held while waiting for a GPS fix.
    pub backfill_limit: usize,

    /// Drop points whose timestamp repeats the previous point's.
    pub drop_duplicate_times: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pace_interval: 5,
            outlier_z_threshold: 1.0,
            unit_system: UnitSystem::Metric,
            backfill_limit: 10_000,
            drop_duplicate_times: true,
        }
    }
}
