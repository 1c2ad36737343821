use serde::{Deserialize, Serialize};

use super::defaults;

/// Similarity-matcher and classifier-training knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Max catalog candidates considered per deal.
    pub candidate_limit: usize,
    /// Backfill by category when substring search returns fewer than this.
    pub category_backfill_threshold: usize,
    /// Matches returned per deal.
    pub top_k: usize,
    /// Training refuses to run below this many labeled examples.
    pub min_training_examples: usize,
    /// Fraction of examples held out for validation.
    pub validation_split: f64,
    pub training_epochs: usize,
    pub learning_rate: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: defaults::CANDIDATE_LIMIT,
            category_backfill_threshold: defaults::CATEGORY_BACKFILL_THRESHOLD,
            top_k: defaults::TOP_K_MATCHES,
            min_training_examples: defaults::MIN_TRAINING_EXAMPLES,
            validation_split: defaults::VALIDATION_SPLIT,
            training_epochs: defaults::TRAINING_EPOCHS,
            learning_rate: defaults::LEARNING_RATE,
        }
    }
}
