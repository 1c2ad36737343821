use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::matching::ProductMatch;
use super::training::TrainingReport;
use crate::deal::ExtractedDeal;
use crate::phase::LearningPhase;

/// One user correction, immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub store: String,
    pub original_deal: ExtractedDeal,
    pub corrected_deal: ExtractedDeal,
    pub original_match: Option<ProductMatch>,
    pub corrected_match: Option<ProductMatch>,
    pub phase_at_correction: LearningPhase,
    /// Ad text surrounding the deal, kept for pattern probing.
    pub raw_text: String,
}

/// What ingesting a correction actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionAction {
    TemplateUpdated,
    TrainingExamplesAdded,
    ModelRetrained,
    PhaseAdvanced,
}

/// Retraining reports failure, it never raises.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrainStatus {
    Trained(TrainingReport),
    Skipped { reason: String },
}

/// Returned to the caller after `learn_from_correction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    pub correction_id: String,
    pub total_corrections: u64,
    pub phase: LearningPhase,
    pub actions: Vec<CorrectionAction>,
    pub retrain: Option<RetrainStatus>,
    /// Set when the correction tipped a phase guard.
    pub new_phase: Option<LearningPhase>,
}
