use serde::{Deserialize, Serialize};

use super::matching::ProductMatch;
use crate::deal::{Confidence, ExtractedDeal};
use crate::phase::LearningPhase;

/// Outcome of processing one ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub deals: Vec<ExtractedDeal>,
    pub matches: Vec<ProductMatch>,
    /// The most advanced phase that actually contributed.
    pub phase_used: LearningPhase,
    /// Blend of deal confidence, match scores, and phase weight.
    pub confidence: Confidence,
    pub store: Option<String>,
    pub processing_time_ms: f64,
    pub summary: ProcessingSummary,
}

/// Cheap counters dashboards read without walking the deal list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub regex_deals: usize,
    pub total_deals: usize,
    pub matches_found: usize,
    /// Ads seen so far for this store, including this one.
    pub ads_processed_for_store: u64,
}
