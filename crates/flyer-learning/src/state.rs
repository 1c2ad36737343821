use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flyer_core::phase::LearningPhase;

/// Durable learner counters. Everything else (templates, model, accuracy,
/// training buffer) lives in its own artifact; this file only has to
/// answer "what phase are we in and how far along are we".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerState {
    pub phase: LearningPhase,
    /// Ads processed per normalized store key.
    pub ads_by_store: BTreeMap<String, u64>,
    pub total_corrections: u64,
    /// Corrections received since the last successful retrain.
    pub pending_retrain: u64,
}

impl LearnerState {
    pub fn total_ads(&self) -> u64 {
        self.ads_by_store.values().sum()
    }

    pub fn record_ad(&mut self, store: &str) -> u64 {
        let count = self.ads_by_store.entry(store.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}
