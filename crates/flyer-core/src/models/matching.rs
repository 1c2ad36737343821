use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::deal::ExtractedDeal;

/// A scored pairing of an extracted deal with a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    pub deal: ExtractedDeal,
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    /// Classifier probability or heuristic weighted sum, in [0, 1].
    pub match_score: f64,
    /// Per-feature contributions, keyed by feature name.
    pub match_features: HashMap<String, f64>,
    /// True only when a user confirmed the pairing.
    pub is_verified: bool,
}

impl ProductMatch {
    /// A user-verified match carrying full score and no feature trace.
    pub fn verified(deal: ExtractedDeal, id: &str, name: &str, category: &str) -> Self {
        Self {
            deal,
            product_id: id.to_string(),
            product_name: name.to_string(),
            category: category.to_string(),
            match_score: 1.0,
            match_features: HashMap::new(),
            is_verified: true,
        }
    }
}
