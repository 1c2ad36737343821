use serde::{Deserialize, Serialize};

use super::defaults;

/// Guards for the phase state machine and the retraining loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Regex → Template: total ads processed OR total corrections.
    pub min_ads_for_template: u64,
    pub min_corrections_for_template: u64,
    /// Template → Ml: (ads OR corrections) AND tracked Phase-2 accuracy.
    pub min_ads_for_ml: u64,
    pub min_corrections_for_ml: u64,
    pub min_accuracy_for_ml: f64,
    /// Retrain the classifier after this many unconsumed corrections.
    pub retrain_threshold: u64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            min_ads_for_template: defaults::MIN_ADS_FOR_TEMPLATE,
            min_corrections_for_template: defaults::MIN_CORRECTIONS_FOR_TEMPLATE,
            min_ads_for_ml: defaults::MIN_ADS_FOR_ML,
            min_corrections_for_ml: defaults::MIN_CORRECTIONS_FOR_ML,
            min_accuracy_for_ml: defaults::MIN_ACCURACY_FOR_ML,
            retrain_threshold: defaults::RETRAIN_THRESHOLD,
        }
    }
}
