use serde::{Deserialize, Serialize};

use crate::catalog::CatalogProduct;
use crate::deal::ExtractedDeal;

/// One labeled (deal, product) pair buffered for classifier training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub deal: ExtractedDeal,
    pub product: CatalogProduct,
    pub is_match: bool,
}

/// Metrics from one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_accuracy: f64,
    pub validation_accuracy: f64,
    pub samples_trained: usize,
    pub samples_validated: usize,
    /// (feature name, normalized importance), in feature order.
    pub feature_importance: Vec<(String, f64)>,
}
