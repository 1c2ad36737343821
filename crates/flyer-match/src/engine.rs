//! Deal-to-product matching engine.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use flyer_core::config::MatchConfig;
use flyer_core::errors::MatchError;
use flyer_core::models::{ProductMatch, TrainingExample, TrainingReport};
use flyer_core::persist;
use flyer_core::traits::MatchModel;
use flyer_core::{CatalogProduct, ExtractedDeal, ProductCatalog};

use crate::classifier::{self, LogisticModel};
use crate::features;

/// Ranks deals against the catalog. Uses the trained classifier when one
/// is loaded, otherwise the fixed heuristic weights.
pub struct SimilarityMatcher {
    catalog: Arc<ProductCatalog>,
    model: Option<LogisticModel>,
    model_path: Option<PathBuf>,
    config: MatchConfig,
}

impl SimilarityMatcher {
    /// In-memory matcher with no persisted model.
    pub fn new(catalog: Arc<ProductCatalog>, config: MatchConfig) -> Self {
        Self {
            catalog,
            model: None,
            model_path: None,
            config,
        }
    }

    /// Matcher backed by a model artifact. A missing or corrupt artifact
    /// leaves the matcher in heuristic mode.
    pub fn open(path: impl Into<PathBuf>, catalog: Arc<ProductCatalog>, config: MatchConfig) -> Self {
        let path = path.into();
        let model: Option<LogisticModel> = match persist::load_json(&path) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "model artifact unreadable");
                None
            }
        };
        debug!(
            path = %path.display(),
            trained = model.is_some(),
            "similarity matcher opened"
        );
        Self {
            catalog,
            model,
            model_path: Some(path),
            config,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Top-k catalog matches for each deal. Deals without a product name
    /// cannot be matched and contribute nothing.
    pub fn match_deals(&self, deals: &[ExtractedDeal]) -> Vec<ProductMatch> {
        deals
            .iter()
            .flat_map(|deal| self.match_single(deal))
            .collect()
    }

    fn match_single(&self, deal: &ExtractedDeal) -> Vec<ProductMatch> {
        let Some(name) = deal.product_name.as_deref() else {
            return Vec::new();
        };

        let candidates = self.candidates(name, deal.category_hint.as_deref());
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&CatalogProduct, Vec<f64>, f64)> = candidates
            .into_iter()
            .map(|product| {
                let fv = features::feature_vector(deal, product);
                let score = match &self.model {
                    Some(model) => model.predict(&fv),
                    None => features::heuristic_score(&fv),
                };
                (product, fv, score)
            })
            .collect();

        // Highest score first; product id as a deterministic tiebreak.
        scored.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        scored
            .into_iter()
            .take(self.config.top_k)
            .map(|(product, fv, score)| ProductMatch {
                deal: deal.clone(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                category: product.category.clone(),
                match_score: score,
                match_features: features::FEATURE_NAMES
                    .iter()
                    .map(|n| n.to_string())
                    .zip(fv)
                    .collect(),
                is_verified: false,
            })
            .collect()
    }

    /// Name search first; when it comes back thin and the deal carries a
    /// category hint, backfill from that category.
    fn candidates(&self, name: &str, category_hint: Option<&str>) -> Vec<&CatalogProduct> {
        let mut candidates = self.catalog.search(name, self.config.candidate_limit);

        if candidates.len() < self.config.category_backfill_threshold {
            if let Some(category) = category_hint {
                for product in self.catalog.by_category(category) {
                    if !candidates.iter().any(|c| c.id == product.id) {
                        candidates.push(product);
                    }
                }
            }
        }

        candidates.truncate(self.config.candidate_limit);
        candidates
    }

    /// Train a fresh classifier. The live model is replaced only on
    /// success, and the new model is persisted when a path is configured.
    pub fn train(&mut self, examples: &[TrainingExample]) -> Result<TrainingReport, MatchError> {
        let (model, report) = classifier::train(examples, &self.config)?;

        if let Some(path) = &self.model_path {
            if let Err(err) = persist::save_json(path, &model) {
                tracing::warn!(path = %path.display(), error = %err, "failed to persist model");
            }
        }
        self.model = Some(model);

        info!(
            validation_accuracy = report.validation_accuracy,
            samples = report.samples_trained + report.samples_validated,
            "match model replaced"
        );
        Ok(report)
    }

    /// Turn a user correction into labeled examples: the rejected pairing
    /// (the deal as extracted, with the product the user turned down) as
    /// a negative, the confirmed pairing (the corrected deal with the
    /// right product) as a positive.
    pub fn learn_from_correction(
        &self,
        original: &ExtractedDeal,
        rejected: Option<&CatalogProduct>,
        corrected: &ExtractedDeal,
        confirmed: &CatalogProduct,
    ) -> Vec<TrainingExample> {
        let mut examples = Vec::with_capacity(2);
        if let Some(product) = rejected {
            examples.push(TrainingExample {
                deal: original.clone(),
                product: product.clone(),
                is_match: false,
            });
        }
        examples.push(TrainingExample {
            deal: corrected.clone(),
            product: confirmed.clone(),
            is_match: true,
        });
        examples
    }

    /// Swap in a new catalog; the trained model is unaffected.
    pub fn set_catalog(&mut self, catalog: Arc<ProductCatalog>) {
        self.catalog = catalog;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyer_core::{DealDetails, DealSource};

    fn product(id: &str, name: &str, category: &str, typical: f64) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            typical_price: typical,
            unit: None,
            brand: None,
            purchase_frequency: 0.0,
        }
    }

    fn catalog() -> Arc<ProductCatalog> {
        Arc::new(ProductCatalog::new(vec![
            product("milk-1", "Whole Milk Gallon", "dairy", 4.0),
            product("milk-2", "Skim Milk Half Gallon", "dairy", 2.5),
            product("apple-1", "Organic Gala Apples", "produce", 3.0),
            product("soap-1", "Dish Soap", "household", 3.5),
        ]))
    }

    fn deal(name: &str) -> ExtractedDeal {
        let mut d = ExtractedDeal::new(
            name,
            DealDetails::plain_price(),
            DealSource::generic("price"),
        );
        d.product_name = Some(name.to_string());
        d
    }

    #[test]
    fn unnamed_deals_produce_no_matches() {
        let matcher = SimilarityMatcher::new(catalog(), MatchConfig::default());
        let mut d = deal("x");
        d.product_name = None;
        assert!(matcher.match_deals(&[d]).is_empty());
    }

    #[test]
    fn best_match_ranks_first() {
        let matcher = SimilarityMatcher::new(catalog(), MatchConfig::default());
        let matches = matcher.match_deals(&[deal("Whole Milk")]);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].product_id, "milk-1");
        assert!(matches.len() <= MatchConfig::default().top_k);
        assert!(!matches[0].is_verified);
        assert_eq!(matches[0].match_features.len(), 10);
    }

    #[test]
    fn category_hint_backfills_candidates() {
        let matcher = SimilarityMatcher::new(catalog(), MatchConfig::default());
        let mut d = deal("Zlorbo");
        d.category_hint = Some("produce".to_string());
        let matches = matcher.match_deals(&[d]);
        assert!(matches.iter().any(|m| m.product_id == "apple-1"));
    }

    #[test]
    fn no_candidates_means_no_matches() {
        let matcher = SimilarityMatcher::new(catalog(), MatchConfig::default());
        let matches = matcher.match_deals(&[deal("Zlorbo")]);
        assert!(matches.is_empty());
    }

    #[test]
    fn correction_yields_negative_and_positive_examples() {
        let matcher = SimilarityMatcher::new(catalog(), MatchConfig::default());
        let cat = catalog();
        let wrong = cat.get("soap-1").unwrap();
        let right = cat.get("milk-1").unwrap();
        let examples =
            matcher.learn_from_correction(&deal("Whole Mlik"), Some(wrong), &deal("Whole Milk"), right);
        assert_eq!(examples.len(), 2);
        assert!(!examples[0].is_match);
        assert_eq!(examples[0].product.id, "soap-1");
        assert!(examples[1].is_match);
        assert_eq!(examples[1].product.id, "milk-1");

        let only_positive =
            matcher.learn_from_correction(&deal("Whole Milk"), None, &deal("Whole Milk"), right);
        assert_eq!(only_positive.len(), 1);
        assert!(only_positive[0].is_match);
    }

    #[test]
    fn failed_training_keeps_the_old_model() {
        let mut matcher = SimilarityMatcher::new(catalog(), MatchConfig::default());
        let err = matcher.train(&[]).unwrap_err();
        assert!(matches!(err, MatchError::InsufficientTrainingData { .. }));
        assert!(!matcher.is_trained());
    }

    #[test]
    fn trained_model_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match_model.json");
        let cat = catalog();

        let mut matcher =
            SimilarityMatcher::open(&path, Arc::clone(&cat), MatchConfig::default());
        assert!(!matcher.is_trained());

        let right = cat.get("milk-1").unwrap();
        let wrong = cat.get("soap-1").unwrap();
        let mut examples = Vec::new();
        for name in [
            "Whole Milk",
            "Skim Milk",
            "Organic Apples",
            "Dish Soap",
            "Milk Gallon",
        ] {
            examples.extend(matcher.learn_from_correction(&deal(name), Some(wrong), &deal(name), right));
        }
        assert!(examples.len() >= 10);
        matcher.train(&examples).unwrap();
        assert!(matcher.is_trained());

        let reopened = SimilarityMatcher::open(&path, cat, MatchConfig::default());
        assert!(reopened.is_trained());
    }
}
