use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::accuracy::{GlobalAccuracy, PhaseAccuracy};
use crate::phase::LearningPhase;

/// How close the learner is to its next phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReadiness {
    pub current_phase: LearningPhase,
    pub next_phase: Option<LearningPhase>,
    pub ads_needed: u64,
    pub corrections_needed: u64,
    /// Tracked accuracy for the current phase, when the guard uses one.
    pub current_accuracy: Option<f64>,
    pub accuracy_needed: Option<f64>,
    pub ready: bool,
}

/// Read-only learner snapshot for dashboards and APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerStats {
    pub phase: LearningPhase,
    pub total_ads: u64,
    pub ads_by_store: BTreeMap<String, u64>,
    pub total_corrections: u64,
    pub pending_retrain: u64,
    pub training_examples: usize,
    pub model_trained: bool,
    pub catalog_size: usize,
    pub templates_loaded: usize,
    pub readiness: PhaseReadiness,
    pub global_accuracy: GlobalAccuracy,
    pub phase_accuracy: Vec<PhaseAccuracy>,
}
