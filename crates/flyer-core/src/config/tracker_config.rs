use serde::{Deserialize, Serialize};

use super::defaults;

/// Accuracy-tracker knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Per-store event history cap; oldest entries are dropped.
    pub history_cap: usize,
    /// Default trend window in days.
    pub trend_window_days: i64,
    /// Window used for target-date projection.
    pub projection_window_days: i64,
    /// Stores with fewer samples than this need more data.
    pub attention_min_samples: u64,
    /// Stores below this accuracy need more corrections.
    pub attention_min_accuracy: f64,
    pub default_target_accuracy: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_cap: defaults::HISTORY_CAP,
            trend_window_days: defaults::TREND_WINDOW_DAYS,
            projection_window_days: defaults::PROJECTION_WINDOW_DAYS,
            attention_min_samples: defaults::ATTENTION_MIN_SAMPLES,
            attention_min_accuracy: defaults::ATTENTION_MIN_ACCURACY,
            default_target_accuracy: defaults::DEFAULT_TARGET_ACCURACY,
        }
    }
}
