//! The progressive learner. Owns one instance of every pipeline stage
//! and the phase state machine that decides which stages run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use flyer_accuracy::AccuracyTracker;
use flyer_core::catalog::{CatalogProduct, ProductCatalog};
use flyer_core::config::FlyerConfig;
use flyer_core::constants::{
    ACCURACY_FILE, CORRECTIONS_FILE, LEARNER_STATE_FILE, MODEL_FILE, PRICE_EPSILON,
    TEMPLATES_FILE, TRAINING_BUFFER_FILE, UNKNOWN_STORE,
};
use flyer_core::deal::{Confidence, ExtractedDeal};
use flyer_core::errors::{FlyerResult, PersistError};
use flyer_core::models::{
    CorrectionAction, CorrectionOutcome, CorrectionRecord, LearnerStats, PhaseReadiness,
    ProcessingResult, ProcessingSummary, ProductMatch, RetrainStatus, TrainingExample,
};
use flyer_core::persist;
use flyer_core::phase::LearningPhase;
use flyer_core::traits::StoreResolver;
use flyer_extract::{OcrFragment, RegexExtractor, SubstringStoreResolver, TemplateExtractor};
use flyer_match::SimilarityMatcher;

use crate::correction::CorrectionRequest;
use crate::state::LearnerState;

/// Facade over the whole extraction/matching pipeline.
///
/// Starts in [`LearningPhase::Regex`] and advances on volume and accuracy
/// guards; every user correction feeds the template registry, the
/// training buffer, and the accuracy tracker at once.
pub struct ProgressiveLearner {
    config: FlyerConfig,
    catalog: Arc<ProductCatalog>,
    regex: RegexExtractor,
    templates: TemplateExtractor,
    matcher: SimilarityMatcher,
    tracker: AccuracyTracker,
    resolver: SubstringStoreResolver,
    state: LearnerState,
    training_buffer: Vec<TrainingExample>,
    /// Append-only correction log, persisted as its own artifact.
    corrections: Vec<CorrectionRecord>,
    state_path: Option<PathBuf>,
    buffer_path: Option<PathBuf>,
    corrections_path: Option<PathBuf>,
}

impl ProgressiveLearner {
    /// An in-memory learner that persists nothing. Used in tests and by
    /// callers that snapshot state themselves.
    pub fn new(config: FlyerConfig, catalog: Arc<ProductCatalog>) -> Self {
        ProgressiveLearner {
            regex: RegexExtractor::new(config.extract.clone()),
            templates: TemplateExtractor::new(config.extract.clone()),
            matcher: SimilarityMatcher::new(Arc::clone(&catalog), config.matching.clone()),
            tracker: AccuracyTracker::new(config.tracker.clone()),
            resolver: SubstringStoreResolver::new(),
            state: LearnerState::default(),
            training_buffer: Vec::new(),
            corrections: Vec::new(),
            state_path: None,
            buffer_path: None,
            corrections_path: None,
            config,
            catalog,
        }
    }

    /// Open a learner rooted at `data_dir`, loading every artifact that
    /// exists there and falling back to defaults for the rest.
    pub fn open(data_dir: impl AsRef<Path>, config: FlyerConfig, catalog: Arc<ProductCatalog>) -> Self {
        let dir = data_dir.as_ref();
        let state_path = dir.join(LEARNER_STATE_FILE);
        let buffer_path = dir.join(TRAINING_BUFFER_FILE);
        let corrections_path = dir.join(CORRECTIONS_FILE);
        let state: LearnerState = persist::load_json_or_default(&state_path);
        let training_buffer: Vec<TrainingExample> = persist::load_json_or_default(&buffer_path);
        let corrections: Vec<CorrectionRecord> = persist::load_json_or_default(&corrections_path);
        info!(
            phase = %state.phase,
            total_ads = state.total_ads(),
            buffered = training_buffer.len(),
            corrections = corrections.len(),
            "learner opened"
        );
        ProgressiveLearner {
            regex: RegexExtractor::new(config.extract.clone()),
            templates: TemplateExtractor::open(dir.join(TEMPLATES_FILE), config.extract.clone()),
            matcher: SimilarityMatcher::open(
                dir.join(MODEL_FILE),
                Arc::clone(&catalog),
                config.matching.clone(),
            ),
            tracker: AccuracyTracker::open(dir.join(ACCURACY_FILE), config.tracker.clone()),
            resolver: SubstringStoreResolver::new(),
            state,
            training_buffer,
            corrections,
            state_path: Some(state_path),
            buffer_path: Some(buffer_path),
            corrections_path: Some(corrections_path),
            config,
            catalog,
        }
    }

    pub fn phase(&self) -> LearningPhase {
        self.state.phase
    }

    pub fn tracker(&self) -> &AccuracyTracker {
        &self.tracker
    }

    /// Every correction ingested so far, newest last. Reloaded from disk
    /// alongside the rest of the state when the learner is opened.
    pub fn corrections(&self) -> &[CorrectionRecord] {
        &self.corrections
    }

    /// Swap in a new product catalog for matching.
    pub fn set_catalog(&mut self, catalog: Arc<ProductCatalog>) {
        self.matcher.set_catalog(Arc::clone(&catalog));
        self.catalog = catalog;
    }

    /// Process one ad through every phase the learner has reached.
    ///
    /// The regex pass always runs. From [`LearningPhase::Template`] on,
    /// template extraction runs too and wins duplicates. From
    /// [`LearningPhase::Ml`] on, deals are matched against the catalog
    /// when a trained model and a non-empty catalog are available.
    pub fn process_ad(
        &mut self,
        text: &str,
        store: Option<&str>,
        fragments: Option<&[OcrFragment]>,
    ) -> FlyerResult<ProcessingResult> {
        let started = Instant::now();
        let store_key = store.and_then(|s| self.store_key(s));
        let counted_key = store_key.as_deref().unwrap_or(UNKNOWN_STORE);
        let ads_for_store = self.state.record_ad(counted_key);

        let regex_deals = self.regex.extract(text, store);
        let regex_count = regex_deals.len();

        let mut phase_used = LearningPhase::Regex;
        let mut deals = regex_deals;

        if self.state.phase >= LearningPhase::Template {
            let template_deals = self.templates.extract(text, store, fragments);
            if !template_deals.is_empty() {
                deals = merge_by_similarity(template_deals, deals);
                phase_used = LearningPhase::Template;
            }
        }

        let mut matches = Vec::new();
        if self.state.phase >= LearningPhase::Ml
            && self.matcher.is_trained()
            && !self.catalog.is_empty()
        {
            matches = self.matcher.match_deals(&deals);
            phase_used = LearningPhase::Ml;
        }

        let confidence = combined_confidence(&deals, &matches, phase_used);
        self.check_phase_advancement()?;
        self.save_state()?;

        let summary = ProcessingSummary {
            regex_deals: regex_count,
            total_deals: deals.len(),
            matches_found: matches.len(),
            ads_processed_for_store: ads_for_store,
        };
        debug!(
            store = counted_key,
            deals = summary.total_deals,
            matches = summary.matches_found,
            phase = %phase_used,
            "ad processed"
        );
        Ok(ProcessingResult {
            deals,
            matches,
            phase_used,
            confidence,
            store: store_key,
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            summary,
        })
    }

    /// Ingest one user correction. This is the learning signal that
    /// drives all three phases: the store template always learns from it,
    /// the training buffer grows when the correction names a catalog
    /// product, the accuracy tracker records it, and the phase guards are
    /// re-checked afterwards.
    pub fn learn_from_correction(
        &mut self,
        request: CorrectionRequest,
    ) -> FlyerResult<CorrectionOutcome> {
        let correction_id = Uuid::new_v4().to_string();
        let phase_at_correction = self.state.phase;
        let corrected_deal = request.patch.apply_to(&request.original_deal);
        let store_key = self
            .store_key(&request.store)
            .unwrap_or_else(|| UNKNOWN_STORE.to_string());
        let mut actions = Vec::new();

        self.state.total_corrections += 1;
        self.state.pending_retrain += 1;

        self.templates.learn_from_correction(
            &store_key,
            &request.original_deal,
            &corrected_deal,
            &request.raw_text,
        )?;
        actions.push(CorrectionAction::TemplateUpdated);

        let mut corrected_match = None;
        if let (Some(rejected), Some(product_id)) =
            (&request.original_match, &request.corrected_product_id)
        {
            if let Some(confirmed) = self.catalog.get(product_id).cloned() {
                let rejected_product = self.rejected_product(rejected);
                let examples = self.matcher.learn_from_correction(
                    &request.original_deal,
                    Some(&rejected_product),
                    &corrected_deal,
                    &confirmed,
                );
                self.training_buffer.extend(examples);
                self.save_buffer()?;
                actions.push(CorrectionAction::TrainingExamplesAdded);
                corrected_match = Some(ProductMatch::verified(
                    corrected_deal.clone(),
                    &confirmed.id,
                    &confirmed.name,
                    &confirmed.category,
                ));
            } else {
                warn!(product_id = %product_id, "corrected product not in catalog, no examples added");
            }
        }

        self.tracker.record_correction(
            &store_key,
            phase_at_correction,
            request.original_deal.deal_type(),
        )?;

        let mut retrain = None;
        if self.state.phase == LearningPhase::Ml
            && self.state.pending_retrain >= self.config.phase.retrain_threshold
        {
            let status = self.retrain_inner();
            if matches!(status, RetrainStatus::Trained(_)) {
                actions.push(CorrectionAction::ModelRetrained);
            }
            retrain = Some(status);
        }

        let new_phase = self.check_phase_advancement()?;
        if new_phase.is_some() {
            actions.push(CorrectionAction::PhaseAdvanced);
        }

        self.corrections.push(CorrectionRecord {
            id: correction_id.clone(),
            timestamp: Utc::now(),
            store: store_key,
            original_deal: request.original_deal,
            corrected_deal,
            original_match: request.original_match,
            corrected_match,
            phase_at_correction,
            raw_text: request.raw_text,
        });
        self.save_corrections()?;
        self.save_state()?;

        Ok(CorrectionOutcome {
            correction_id,
            total_corrections: self.state.total_corrections,
            phase: self.state.phase,
            actions,
            retrain,
            new_phase,
        })
    }

    /// Record whether a surfaced deal/match turned out to be right. Feeds
    /// the accuracy tracker and, past phase 1, the store's template
    /// accuracy.
    pub fn record_result(
        &mut self,
        store: &str,
        deal: &ExtractedDeal,
        is_correct: bool,
    ) -> FlyerResult<()> {
        let store_key = self
            .store_key(store)
            .unwrap_or_else(|| UNKNOWN_STORE.to_string());
        self.tracker.record_result(
            &store_key,
            is_correct,
            self.state.phase,
            deal.deal_type(),
            None,
        )?;
        if self.state.phase >= LearningPhase::Template {
            let report = self.tracker.store_report(&store_key);
            self.templates.update_accuracy(&store_key, report.accuracy)?;
        }
        Ok(())
    }

    /// Retrain the classifier from the buffered examples. Never raises;
    /// a failed or undersized run reports [`RetrainStatus::Skipped`] and
    /// the previous model stays in place.
    pub fn retrain(&mut self) -> FlyerResult<RetrainStatus> {
        let status = self.retrain_inner();
        self.save_state()?;
        Ok(status)
    }

    fn retrain_inner(&mut self) -> RetrainStatus {
        let min = self.config.matching.min_training_examples;
        if self.training_buffer.len() < min {
            return RetrainStatus::Skipped {
                reason: format!(
                    "{} buffered examples, need at least {min}",
                    self.training_buffer.len()
                ),
            };
        }
        match self.matcher.train(&self.training_buffer) {
            Ok(report) => {
                self.state.pending_retrain = 0;
                RetrainStatus::Trained(report)
            }
            Err(err) => RetrainStatus::Skipped {
                reason: err.to_string(),
            },
        }
    }

    /// Jump the state machine to an externally numbered phase (1..=3),
    /// bypassing the guards. Operator escape hatch.
    pub fn force_phase(&mut self, phase: u8) -> FlyerResult<()> {
        let target = LearningPhase::try_from(phase)?;
        info!(from = %self.state.phase, to = %target, "phase forced");
        self.state.phase = target;
        self.save_state()?;
        Ok(())
    }

    /// How far the learner is from its next transition.
    pub fn phase_readiness(&self) -> PhaseReadiness {
        let cfg = &self.config.phase;
        let total_ads = self.state.total_ads();
        let corrections = self.state.total_corrections;
        match self.state.phase {
            LearningPhase::Regex => {
                let ads_needed = cfg.min_ads_for_template.saturating_sub(total_ads);
                let corrections_needed =
                    cfg.min_corrections_for_template.saturating_sub(corrections);
                PhaseReadiness {
                    current_phase: LearningPhase::Regex,
                    next_phase: Some(LearningPhase::Template),
                    ads_needed,
                    corrections_needed,
                    current_accuracy: None,
                    accuracy_needed: None,
                    ready: ads_needed == 0 || corrections_needed == 0,
                }
            }
            LearningPhase::Template => {
                let ads_needed = cfg.min_ads_for_ml.saturating_sub(total_ads);
                let corrections_needed = cfg.min_corrections_for_ml.saturating_sub(corrections);
                let accuracy = self.tracker.phase_accuracy(LearningPhase::Template).accuracy;
                PhaseReadiness {
                    current_phase: LearningPhase::Template,
                    next_phase: Some(LearningPhase::Ml),
                    ads_needed,
                    corrections_needed,
                    current_accuracy: Some(accuracy),
                    accuracy_needed: Some(cfg.min_accuracy_for_ml),
                    ready: (ads_needed == 0 || corrections_needed == 0)
                        && accuracy >= cfg.min_accuracy_for_ml,
                }
            }
            LearningPhase::Ml => PhaseReadiness {
                current_phase: LearningPhase::Ml,
                next_phase: None,
                ads_needed: 0,
                corrections_needed: 0,
                current_accuracy: Some(self.tracker.phase_accuracy(LearningPhase::Ml).accuracy),
                accuracy_needed: None,
                ready: false,
            },
        }
    }

    /// Snapshot of everything a dashboard wants to show.
    pub fn stats(&self) -> LearnerStats {
        LearnerStats {
            phase: self.state.phase,
            total_ads: self.state.total_ads(),
            ads_by_store: self.state.ads_by_store.clone(),
            total_corrections: self.state.total_corrections,
            pending_retrain: self.state.pending_retrain,
            training_examples: self.training_buffer.len(),
            model_trained: self.matcher.is_trained(),
            catalog_size: self.catalog.len(),
            templates_loaded: self.templates.template_count(),
            readiness: self.phase_readiness(),
            global_accuracy: self.tracker.global_accuracy(),
            phase_accuracy: [
                LearningPhase::Regex,
                LearningPhase::Template,
                LearningPhase::Ml,
            ]
            .iter()
            .map(|p| self.tracker.phase_accuracy(*p))
            .collect(),
        }
    }

    /// Advance one phase when the current phase's guard is satisfied.
    /// Regex → Template needs ad or correction volume; Template → Ml
    /// additionally needs the tracked phase-2 accuracy to reach its
    /// threshold, and trains an initial model from the buffer when one
    /// fits.
    fn check_phase_advancement(&mut self) -> FlyerResult<Option<LearningPhase>> {
        let cfg = &self.config.phase;
        let total_ads = self.state.total_ads();
        let corrections = self.state.total_corrections;

        let next = match self.state.phase {
            LearningPhase::Regex
                if total_ads >= cfg.min_ads_for_template
                    || corrections >= cfg.min_corrections_for_template =>
            {
                Some(LearningPhase::Template)
            }
            LearningPhase::Template
                if total_ads >= cfg.min_ads_for_ml || corrections >= cfg.min_corrections_for_ml =>
            {
                let accuracy = self.tracker.phase_accuracy(LearningPhase::Template).accuracy;
                (accuracy >= cfg.min_accuracy_for_ml).then_some(LearningPhase::Ml)
            }
            _ => None,
        };
        let Some(next) = next else {
            return Ok(None);
        };

        if next == LearningPhase::Ml && !self.matcher.is_trained() {
            match self.retrain_inner() {
                RetrainStatus::Trained(report) => {
                    info!(
                        validation_accuracy = report.validation_accuracy,
                        "initial model trained for phase 3"
                    );
                }
                RetrainStatus::Skipped { reason } => {
                    warn!(%reason, "entering phase 3 without a trained model");
                }
            }
        }

        info!(from = %self.state.phase, to = %next, total_ads, corrections, "phase advanced");
        self.state.phase = next;
        self.save_state()?;
        Ok(Some(next))
    }

    /// The product a match pointed at, reconstructed from the match
    /// itself when it has since left the catalog.
    fn rejected_product(&self, rejected: &ProductMatch) -> CatalogProduct {
        self.catalog
            .get(&rejected.product_id)
            .cloned()
            .unwrap_or_else(|| CatalogProduct {
                id: rejected.product_id.clone(),
                name: rejected.product_name.clone(),
                category: rejected.category.clone(),
                typical_price: 0.0,
                unit: None,
                brand: None,
                purchase_frequency: 0.0,
            })
    }

    /// One canonical key per store, shared by the ad counters, template
    /// registry, accuracy tracker, and correction log.
    fn store_key(&self, store: &str) -> Option<String> {
        let key = self.resolver.normalize(store);
        (!key.is_empty()).then_some(key)
    }

    fn save_state(&self) -> Result<(), PersistError> {
        match &self.state_path {
            Some(path) => persist::save_json(path, &self.state),
            None => Ok(()),
        }
    }

    fn save_buffer(&self) -> Result<(), PersistError> {
        match &self.buffer_path {
            Some(path) => persist::save_json(path, &self.training_buffer),
            None => Ok(()),
        }
    }

    fn save_corrections(&self) -> Result<(), PersistError> {
        match &self.corrections_path {
            Some(path) => persist::save_json(path, &self.corrections),
            None => Ok(()),
        }
    }
}

/// Keep every primary deal, then add each secondary deal that is not a
/// duplicate of one already kept. Primary deals come from the more
/// trusted source and always survive.
fn merge_by_similarity(
    primary: Vec<ExtractedDeal>,
    secondary: Vec<ExtractedDeal>,
) -> Vec<ExtractedDeal> {
    let mut merged = primary;
    for deal in secondary {
        if !merged.iter().any(|kept| deals_similar(kept, &deal)) {
            merged.push(deal);
        }
    }
    merged
}

/// Two deals describe the same promotion when their prices agree within
/// [`PRICE_EPSILON`] or one's raw text contains the other's.
fn deals_similar(a: &ExtractedDeal, b: &ExtractedDeal) -> bool {
    if let (Some(pa), Some(pb)) = (a.price, b.price) {
        if (pa - pb).abs() < PRICE_EPSILON {
            return true;
        }
    }
    let ra = a.raw_text.trim().to_lowercase();
    let rb = b.raw_text.trim().to_lowercase();
    !ra.is_empty() && !rb.is_empty() && (ra.contains(&rb) || rb.contains(&ra))
}

/// Blend per-deal confidence, match scores, and the phase's own weight
/// into one number for the whole ad.
fn combined_confidence(
    deals: &[ExtractedDeal],
    matches: &[ProductMatch],
    phase: LearningPhase,
) -> Confidence {
    if deals.is_empty() {
        return Confidence::new(0.0);
    }
    let deal_conf =
        deals.iter().map(|d| d.confidence.value()).sum::<f64>() / deals.len() as f64;
    let weight = phase.confidence_weight();
    let value = if matches.is_empty() {
        0.6 * deal_conf + 0.4 * weight
    } else {
        let match_conf =
            matches.iter().map(|m| m.match_score).sum::<f64>() / matches.len() as f64;
        0.4 * deal_conf + 0.4 * match_conf + 0.2 * weight
    };
    Confidence::new(value)
}
